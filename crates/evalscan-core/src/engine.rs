//! Batch extraction engine.
//!
//! Assigns sequential ids to the evaluations, scans them in chunks on the
//! blocking pool with bounded parallelism, and returns the records in id
//! order regardless of completion order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::Instrument;
use uuid::Uuid;

use crate::model::EvaluationRecord;
use crate::report::RecordSet;
use crate::scanner::Scanner;
use crate::vocabulary::Vocabulary;

/// Configuration for the batch engine.
#[derive(Debug, Clone)]
pub struct BatchEngineConfig {
    /// Maximum chunks scanned at once.
    pub parallelism: usize,
    /// Evaluations per chunk.
    pub chunk_size: usize,
}

impl Default for BatchEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            chunk_size: 64,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_chunk_complete(&self, scanned: usize, total: usize);
    fn on_batch_complete(&self, total: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_chunk_complete(&self, _: usize, _: usize) {}
    fn on_batch_complete(&self, _: usize, _: Duration) {}
}

/// The batch engine.
pub struct BatchEngine {
    vocabulary: Arc<Vocabulary>,
    config: BatchEngineConfig,
}

impl BatchEngine {
    pub fn new(vocabulary: Arc<Vocabulary>, config: BatchEngineConfig) -> Self {
        Self { vocabulary, config }
    }

    /// Scan every evaluation. The i-th evaluation gets `unique_id` i.
    pub async fn run(
        &self,
        evaluations: Vec<String>,
        progress: &dyn ProgressReporter,
    ) -> Result<RecordSet> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("batch", %run_id);
        self.run_inner(evaluations, progress).instrument(span).await
    }

    async fn run_inner(
        &self,
        evaluations: Vec<String>,
        progress: &dyn ProgressReporter,
    ) -> Result<RecordSet> {
        let start = Instant::now();
        let total = evaluations.len();
        let parallelism = self.config.parallelism.max(1);
        let chunk_size = self.config.chunk_size.max(1);
        tracing::info!(
            "scanning {total} evaluation(s) with parallelism {parallelism}, chunk size {chunk_size}"
        );

        let semaphore = Arc::new(Semaphore::new(parallelism));
        let mut futures = FuturesUnordered::new();

        let mut numbered = evaluations.into_iter().enumerate().peekable();
        while numbered.peek().is_some() {
            let chunk: Vec<(u64, String)> = numbered
                .by_ref()
                .take(chunk_size)
                .map(|(i, text)| (i as u64, text))
                .collect();
            let vocabulary = Arc::clone(&self.vocabulary);
            let semaphore = Arc::clone(&semaphore);

            futures.push(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                let records = tokio::task::spawn_blocking(move || {
                    let scanner = Scanner::new(&vocabulary);
                    chunk
                        .iter()
                        .map(|(id, text)| scanner.scan(*id, text))
                        .collect::<Vec<EvaluationRecord>>()
                })
                .await
                .map_err(|e| anyhow::anyhow!("scan worker failed: {e}"))?;

                Ok::<_, anyhow::Error>(records)
            });
        }

        let mut records = Vec::with_capacity(total);
        while let Some(result) = futures.next().await {
            records.extend(result?);
            progress.on_chunk_complete(records.len(), total);
        }

        records.sort_by_key(|r| r.unique_id);

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, elapsed);
        tracing::info!("scanned {total} evaluation(s) in {}ms", elapsed.as_millis());

        Ok(RecordSet::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::scanner::scan_evaluation;
    use crate::vocabulary::PhraseList;

    fn vocab() -> Arc<Vocabulary> {
        Arc::new(Vocabulary::new(
            PhraseList::new([
                "What are the strengths of this course?",
                "What could the instructor do to improve?",
            ]),
            PhraseList::new(["strengths of this course"]),
            PhraseList::new(["What could the instructor do to improve?"]),
            PhraseList::empty(),
        ))
    }

    fn corpus(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| {
                format!(
                    "MATH {:05}: Course {i}\nWhat are the strengths of this course?\nAnswer number {i}.\nThe Instructor\n1 2 3 4 5\nClear. 0% 0% {}% 50% {}%",
                    10000 + i,
                    i % 50,
                    50 - i % 50
                )
            })
            .collect()
    }

    #[derive(Default)]
    struct CountingReporter {
        chunks: AtomicUsize,
        finished: AtomicUsize,
    }

    impl ProgressReporter for CountingReporter {
        fn on_chunk_complete(&self, _: usize, _: usize) {
            self.chunks.fetch_add(1, Ordering::SeqCst);
        }
        fn on_batch_complete(&self, total: usize, _: Duration) {
            self.finished.store(total, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn records_come_back_in_id_order() {
        let engine = BatchEngine::new(
            vocab(),
            BatchEngineConfig {
                parallelism: 3,
                chunk_size: 7,
            },
        );
        let reporter = CountingReporter::default();
        let set = engine.run(corpus(50), &reporter).await.unwrap();

        assert_eq!(set.len(), 50);
        for (i, record) in set.records.iter().enumerate() {
            assert_eq!(record.unique_id, i as u64);
            assert_eq!(record.course.as_deref(), Some(format!("Course {i}").as_str()));
        }
        assert_eq!(reporter.chunks.load(Ordering::SeqCst), 8);
        assert_eq!(reporter.finished.load(Ordering::SeqCst), 50);
    }

    #[tokio::test]
    async fn output_does_not_depend_on_parallelism() {
        let texts = corpus(40);
        let mut outputs = Vec::new();
        for (parallelism, chunk_size) in [(1, 1), (2, 5), (8, 3), (4, 64)] {
            let engine = BatchEngine::new(
                vocab(),
                BatchEngineConfig {
                    parallelism,
                    chunk_size,
                },
            );
            let set = engine.run(texts.clone(), &NoopReporter).await.unwrap();
            outputs.push(set.to_json().unwrap());
        }
        assert!(outputs.windows(2).all(|w| w[0] == w[1]));

        let v = vocab();
        let sequential: Vec<EvaluationRecord> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| scan_evaluation(i as u64, t, &v))
            .collect();
        assert_eq!(outputs[0], RecordSet::new(sequential).to_json().unwrap());
    }

    #[tokio::test]
    async fn empty_batch() {
        let engine = BatchEngine::new(vocab(), BatchEngineConfig::default());
        let reporter = CountingReporter::default();
        let set = engine.run(Vec::new(), &reporter).await.unwrap();
        assert!(set.is_empty());
        assert_eq!(reporter.chunks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_parallelism_still_runs() {
        let engine = BatchEngine::new(
            vocab(),
            BatchEngineConfig {
                parallelism: 0,
                chunk_size: 0,
            },
        );
        let set = engine.run(corpus(3), &NoopReporter).await.unwrap();
        assert_eq!(set.len(), 3);
    }
}
