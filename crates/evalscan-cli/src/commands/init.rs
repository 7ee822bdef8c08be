//! The `evalscan init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("evalscan.toml").exists() {
        println!("evalscan.toml already exists, skipping.");
        return Ok(());
    }

    std::fs::write("evalscan.toml", SAMPLE_CONFIG)?;
    println!("Created evalscan.toml");

    println!("\nNext steps:");
    println!("  1. Point [inputs] at your evaluation export and question lists");
    println!("  2. Run: evalscan validate");
    println!("  3. Run: evalscan extract && evalscan score --records evals.json --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# evalscan configuration

# Input decoding: "latin1" or "utf8"
encoding = "latin1"

# Max concurrent scanning workers (EVALSCAN_PARALLELISM overrides)
parallelism = 4

# Record document written by `evalscan extract`
output = "evals.json"

# Directory for `evalscan score` reports
report_dir = "./evalscan-results"

[inputs]
evaluations = "unique_evals.csv"
questions = "manually_cleaned_eval_questions.csv"
course_questions = "course_quality_questions.csv"
instructor_questions = "instructor_quality_questions.csv"
agree_disagree_questions = "agree-disagree_questions.csv"
"#;
