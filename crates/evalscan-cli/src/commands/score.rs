//! The `evalscan score` command.

use std::path::PathBuf;

use anyhow::Result;

use evalscan_core::config::load_config_from;
use evalscan_core::report::{RecordSet, ScoreReport};
use evalscan_core::score::ScoreField;
use evalscan_report::html::write_html_report;

pub fn execute(
    records_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    for fmt in &formats {
        anyhow::ensure!(
            matches!(*fmt, "json" | "html"),
            "unknown format: '{fmt}' (expected json, html or all)"
        );
    }

    let output = match output {
        Some(dir) => dir,
        None => load_config_from(config_path.as_deref())?.report_dir,
    };

    let records = RecordSet::load_json(&records_path)?;
    let report = ScoreReport::from_records(records_path.display().to_string(), &records);

    print_summary(&report);

    std::fs::create_dir_all(&output)?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Scores saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            other => anyhow::bail!("unknown format: '{other}'"),
        }
    }

    println!(
        "Scored {} evaluation(s) across {} course(s)",
        report.evaluation_count,
        report.aggregate.per_course.len()
    );

    Ok(())
}

fn print_summary(report: &ScoreReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Course",
        "Evals",
        "Instructor",
        "Assignments",
        "Tests",
        "Overall",
        "Readings",
    ]);

    for (course, stats) in &report.aggregate.per_course {
        let mut row = vec![Cell::new(course), Cell::new(stats.evaluations)];
        for field in ScoreField::ALL {
            row.push(Cell::new(
                stats
                    .mean(field)
                    .map(|v| format!("{v:.1}"))
                    .unwrap_or_else(|| "-".to_string()),
            ));
        }
        table.add_row(row);
    }

    eprintln!("\n{table}");
}
