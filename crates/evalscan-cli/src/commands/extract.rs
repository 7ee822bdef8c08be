//! The `evalscan extract` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use evalscan_core::engine::{BatchEngine, BatchEngineConfig, ProgressReporter};
use evalscan_core::loader::{load_evaluations, load_vocabulary};

use super::InputArgs;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_chunk_complete(&self, scanned: usize, total: usize) {
        eprintln!("  Scanned {scanned}/{total}");
    }

    fn on_batch_complete(&self, total: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {total} evaluation(s) ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    inputs: InputArgs,
    output: Option<PathBuf>,
    parallelism: Option<usize>,
) -> Result<()> {
    let config = inputs.resolve()?;
    tracing::debug!("resolved config: {config:?}");
    let output = output.unwrap_or(config.output);
    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let vocabulary = load_vocabulary(&config.inputs, config.encoding)?;
    let evaluations = load_evaluations(&config.inputs.evaluations, config.encoding)?;

    eprintln!(
        "evalscan v{}: scanning {} evaluation(s) from {}",
        env!("CARGO_PKG_VERSION"),
        evaluations.len(),
        config.inputs.evaluations.display()
    );

    let engine = BatchEngine::new(
        Arc::new(vocabulary),
        BatchEngineConfig {
            parallelism,
            ..Default::default()
        },
    );
    let records = engine.run(evaluations, &ConsoleReporter).await?;
    records.save_json(&output)?;

    let with_header = records
        .records
        .iter()
        .filter(|r| r.course_label().is_some())
        .count();
    println!(
        "Extracted {} record(s) ({with_header} with a course header) to {}",
        records.len(),
        output.display()
    );

    Ok(())
}
