//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FIXTURES: &str = "../../fixtures";

/// An `evalscan` command isolated from any user-level configuration.
fn evalscan(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("evalscan").unwrap();
    cmd.env("HOME", home).env_remove("EVALSCAN_PARALLELISM");
    cmd
}

/// Fixture input flags, with some flags pointed elsewhere.
fn fixture_inputs(overrides: &[(&str, &str)]) -> Vec<String> {
    let defaults = [
        ("--evaluations", "sample_evals.txt"),
        ("--questions", "questions.csv"),
        ("--course-questions", "course_questions.csv"),
        ("--instructor-questions", "instructor_questions.csv"),
        ("--agree-questions", "agree_disagree_questions.csv"),
    ];
    let mut args = Vec::new();
    for (flag, file) in defaults {
        args.push(flag.to_string());
        match overrides.iter().find(|(f, _)| *f == flag) {
            Some((_, path)) => args.push(path.to_string()),
            None => args.push(format!("{FIXTURES}/{file}")),
        }
    }
    args
}

fn extract_to(home: &Path, output: &Path) {
    evalscan(home)
        .arg("extract")
        .args(fixture_inputs(&[]))
        .arg("--output")
        .arg(output)
        .assert()
        .success();
}

#[test]
fn validate_fixtures() {
    let home = TempDir::new().unwrap();
    evalscan(home.path())
        .arg("validate")
        .args(fixture_inputs(&[]))
        .assert()
        .success()
        .stdout(predicate::str::contains("Evaluations: 3"))
        .stdout(predicate::str::contains("6 questions, 1 course, 1 instructor"))
        .stdout(predicate::str::contains("[evaluation 2] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found."));
}

#[test]
fn validate_missing_corpus_names_the_file() {
    let home = TempDir::new().unwrap();
    evalscan(home.path())
        .arg("validate")
        .args(fixture_inputs(&[("--evaluations", "no_such_evals.txt")]))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: evaluation corpus not found"))
        .stderr(predicate::str::contains("no_such_evals.txt"));
}

#[test]
fn extract_missing_vocabulary_fails() {
    let home = TempDir::new().unwrap();
    evalscan(home.path())
        .arg("extract")
        .args(fixture_inputs(&[("--course-questions", "missing.csv")]))
        .arg("--output")
        .arg(home.path().join("evals.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("course question list not found"));
}

#[test]
fn extract_writes_record_document() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out").join("evals.json");

    evalscan(dir.path())
        .arg("extract")
        .args(fixture_inputs(&[]))
        .arg("--output")
        .arg(&output)
        .arg("--parallelism")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 3 record(s)"))
        .stdout(predicate::str::contains("2 with a course header"));

    let content = std::fs::read_to_string(&output).unwrap();
    let records: serde_json::Value = serde_json::from_str(&content).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0]["unique_id"], 0);
    assert_eq!(records[0]["dept"], "MATH");
    assert_eq!(records[0]["instructors"][1], "John Smith");
    assert_eq!(records[0]["recommend"], serde_json::json!([12, 3]));
    assert_eq!(records[0]["avg_time"], "6");

    assert_eq!(records[1]["course"], "Principles of Economics");
    assert_eq!(records[1]["good_instructor"], serde_json::json!([9, 1]));
    assert_eq!(
        records[1]["course_responses"],
        serde_json::json!(["Good examples.", "Interesting topics."])
    );

    assert_eq!(records[2], serde_json::json!({ "unique_id": 2 }));
}

#[test]
fn extract_rejects_zero_parallelism() {
    let dir = TempDir::new().unwrap();
    evalscan(dir.path())
        .arg("extract")
        .args(fixture_inputs(&[]))
        .arg("--output")
        .arg(dir.path().join("evals.json"))
        .arg("--parallelism")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parallelism must be at least 1"));
}

#[test]
fn score_writes_json_and_html() {
    let dir = TempDir::new().unwrap();
    let records = dir.path().join("evals.json");
    extract_to(dir.path(), &records);

    let reports = dir.path().join("reports");
    evalscan(dir.path())
        .arg("score")
        .arg("--records")
        .arg(&records)
        .arg("--output")
        .arg(&reports)
        .arg("--format")
        .arg("all")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Scored 3 evaluation(s) across 2 course(s)",
        ))
        .stderr(predicate::str::contains("MATH 10101"))
        .stderr(predicate::str::contains("85.0"));

    let files: Vec<_> = std::fs::read_dir(&reports)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    let json = files
        .iter()
        .find(|p| p.extension().is_some_and(|e| e == "json"))
        .expect("json report written");
    assert!(files
        .iter()
        .any(|p| p.extension().is_some_and(|e| e == "html")));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(report["evaluation_count"], 3);
    assert_eq!(report["scores"][0]["overall_score"], 85.0);
    assert_eq!(report["scores"][0]["instructor_score"], 96.8);
    assert_eq!(report["scores"][1]["overall_score"], 84.0);
    assert_eq!(
        report["aggregate"]["per_instructor"]["John Smith"]["evaluations"],
        2
    );
}

#[test]
fn score_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let records = dir.path().join("evals.json");
    extract_to(dir.path(), &records);

    evalscan(dir.path())
        .arg("score")
        .arg("--records")
        .arg(&records)
        .arg("--output")
        .arg(dir.path().join("reports"))
        .arg("--format")
        .arg("sarif")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn score_nonexistent_records() {
    let dir = TempDir::new().unwrap();
    evalscan(dir.path())
        .arg("score")
        .arg("--records")
        .arg("no_such_file.json")
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    evalscan(dir.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created evalscan.toml"));

    assert!(dir.path().join("evalscan.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    evalscan(dir.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    evalscan(dir.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    evalscan(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Course-evaluation extraction and Likert scoring",
        ));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    evalscan(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("evalscan"));
}
