//! Record documents and score reports, with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::EvaluationRecord;
use crate::score::{score_record, EvaluationScores};
use crate::statistics::{compute_aggregate_stats, AggregateStats};

/// The output of an extraction run: one record per evaluation, in id order.
///
/// Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    pub records: Vec<EvaluationRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<EvaluationRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize records")
    }

    /// Save the record document to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write records to {}", path.display()))?;
        Ok(())
    }

    /// Load a record document from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read records from {}", path.display()))?;
        let records: RecordSet =
            serde_json::from_str(&content).context("failed to parse records JSON")?;
        Ok(records)
    }
}

/// Scores for every record of a document, plus per-course and
/// per-instructor aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The record document the scores were computed from.
    pub source: String,
    pub evaluation_count: usize,
    pub scores: Vec<EvaluationScores>,
    pub aggregate: AggregateStats,
}

impl ScoreReport {
    /// Score every record and aggregate the results.
    pub fn from_records(source: impl Into<String>, records: &RecordSet) -> Self {
        let scores: Vec<EvaluationScores> = records.records.iter().map(score_record).collect();
        let aggregate = compute_aggregate_stats(&scores);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: source.into(),
            evaluation_count: records.len(),
            scores,
            aggregate,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }
}
