//! Batch analysis: drive the orchestrator over the candidate list, track
//! progress, and rank-and-select the winners.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Orchestrator, RegistrySnapshot, ScoreCache};
use crate::domain::{AggregateScore, Percentage, Photo};
use crate::ports::{NullProgressSink, ProgressEvent, ProgressSink};

/// Tuning knobs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Photos scored simultaneously.
    pub photo_concurrency: usize,
    /// Global cap on in-flight assessor invocations, shared across photos.
    pub assessor_concurrency: usize,
    /// Fraction of the ranked list to keep.
    pub percentage: Percentage,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            photo_concurrency: 4,
            assessor_concurrency: 8,
            percentage: Percentage::default(),
        }
    }
}

/// Monotone `(completed, total)` counter, pollable from any thread.
///
/// `total` is set once when a run starts; `completed` only ever advances
/// during a run. Consumers poll; the analyzer never waits for them.
#[derive(Default)]
pub struct BatchProgress {
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl BatchProgress {
    /// Returns the current `(completed, total)` pair.
    #[must_use]
    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.completed.load(Ordering::Acquire),
            self.total.load(Ordering::Acquire),
        )
    }

    fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Release);
        self.total.store(total, Ordering::Release);
    }

    fn advance(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Top-K aggregate scores, descending by total, candidate order on ties.
    pub picks: Vec<AggregateScore>,
    /// Photos scored to completion.
    pub completed: usize,
    /// Candidate count at batch start.
    pub total: usize,
    /// Whether the run was cut short by cancellation.
    pub cancelled: bool,
    /// Failed capability invocations per assessor name, for observability.
    pub failure_counts: BTreeMap<String, u64>,
}

/// Drives the orchestrator across a candidate list with bounded concurrency.
pub struct BatchAnalyzer {
    cache: Arc<ScoreCache>,
    options: BatchOptions,
    progress: Arc<BatchProgress>,
    sink: Arc<dyn ProgressSink>,
}

impl BatchAnalyzer {
    /// Creates an analyzer over a shared score cache.
    #[must_use]
    pub fn new(cache: Arc<ScoreCache>, options: BatchOptions) -> Self {
        Self {
            cache,
            options,
            progress: Arc::new(BatchProgress::default()),
            sink: Arc::new(NullProgressSink),
        }
    }

    /// Attaches a progress sink receiving per-photo events.
    #[must_use]
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the pollable progress counter for the current/next run.
    #[must_use]
    pub fn progress(&self) -> Arc<BatchProgress> {
        Arc::clone(&self.progress)
    }

    /// Scores every candidate under one registry snapshot and returns the
    /// ranked top slice.
    ///
    /// Photos are scored up to `photo_concurrency` at a time; total in-flight
    /// assessor invocations are additionally bounded by the shared
    /// `assessor_concurrency` semaphore. Cancellation is cooperative: no new
    /// photo or assessor work starts after the token fires, in-flight
    /// invocations finish and still populate the cache, and the report comes
    /// back flagged `cancelled` with whatever completed.
    pub async fn run(
        &self,
        candidates: Vec<Photo>,
        snapshot: RegistrySnapshot,
        cancel: CancellationToken,
    ) -> BatchReport {
        let total = candidates.len();
        self.progress.reset(total);
        info!(
            candidates = total,
            assessors = snapshot.enabled_len(),
            photo_concurrency = self.options.photo_concurrency,
            assessor_concurrency = self.options.assessor_concurrency,
            "Starting batch run"
        );

        let orchestrator = Orchestrator::new(
            Arc::clone(&self.cache),
            Arc::new(Semaphore::new(self.options.assessor_concurrency.max(1))),
        );

        let mut results: Vec<Option<AggregateScore>> = Vec::new();
        results.resize_with(total, || None);
        let mut completed = 0usize;
        let mut failure_counts: BTreeMap<String, u64> = BTreeMap::new();

        let score_one = |index: usize, photo: Photo| {
            let orchestrator = &orchestrator;
            let snapshot = &snapshot;
            let cancel = &cancel;
            async move {
                let outcome = orchestrator.score_photo(&photo, snapshot, cancel).await;
                (index, photo, outcome)
            }
        };

        let mut pending = candidates.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();

        // Seed the initial window, then refill one-for-one as photos finish.
        for _ in 0..self.options.photo_concurrency.max(1) {
            if let Some((index, photo)) = pending.next() {
                self.sink.on_event(ProgressEvent::Started {
                    id: photo.id.clone(),
                    index,
                    total,
                });
                in_flight.push(score_one(index, photo));
            }
        }

        while let Some((index, photo, outcome)) = in_flight.next().await {
            match outcome {
                Some(score) => {
                    completed += 1;
                    self.progress.advance();
                    for name in &score.failures {
                        *failure_counts.entry(name.clone()).or_insert(0) += 1;
                    }
                    self.sink.on_event(ProgressEvent::Completed {
                        score: score.clone(),
                    });
                    results[index] = Some(score);
                }
                None => {
                    debug!(photo = %photo.id, "Photo skipped by cancellation");
                    self.sink.on_event(ProgressEvent::Skipped {
                        id: photo.id,
                        reason: "batch cancelled".to_owned(),
                    });
                }
            }

            if !cancel.is_cancelled() {
                if let Some((index, photo)) = pending.next() {
                    self.sink.on_event(ProgressEvent::Started {
                        id: photo.id.clone(),
                        index,
                        total,
                    });
                    in_flight.push(score_one(index, photo));
                }
            }
        }

        let cancelled = cancel.is_cancelled();
        self.sink.on_event(ProgressEvent::Finished {
            completed,
            cancelled,
        });

        let picks = rank_and_select(results, self.options.percentage);
        info!(
            completed,
            total,
            cancelled,
            picks = picks.len(),
            "Batch run finished"
        );

        BatchReport {
            picks,
            completed,
            total,
            cancelled,
            failure_counts,
        }
    }
}

/// Stable rank-and-select over completed scores.
///
/// Input is index-addressed (candidate order); the stable sort keeps that
/// order for equal totals, so the ranking is deterministic regardless of
/// completion order. The top-count base is the number of completed photos.
fn rank_and_select(
    results: Vec<Option<AggregateScore>>,
    percentage: Percentage,
) -> Vec<AggregateScore> {
    let mut ranked: Vec<AggregateScore> = results.into_iter().flatten().collect();
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    ranked.truncate(percentage.top_count(ranked.len()));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PhotoId, ScoreRecord};

    fn score(id: &str, total: f64) -> Option<AggregateScore> {
        Some(AggregateScore {
            id: PhotoId::new(id),
            total,
            per_assessor: ScoreRecord::new(),
            failures: Vec::new(),
        })
    }

    #[test]
    fn test_rank_orders_descending() {
        let picks = rank_and_select(
            vec![score("a", 0.2), score("b", 0.9), score("c", 0.5)],
            Percentage::new(100.0).unwrap(),
        );
        let ids: Vec<_> = picks.iter().map(|p| p.id.as_str().to_owned()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_ties_keep_candidate_order() {
        let picks = rank_and_select(
            vec![score("a", 0.5), score("b", 0.5), score("c", 0.5)],
            Percentage::new(100.0).unwrap(),
        );
        let ids: Vec<_> = picks.iter().map(|p| p.id.as_str().to_owned()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rank_skips_incomplete_photos() {
        let picks = rank_and_select(
            vec![score("a", 0.1), None, score("c", 0.8)],
            Percentage::new(100.0).unwrap(),
        );
        let ids: Vec<_> = picks.iter().map(|p| p.id.as_str().to_owned()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_select_top_slice() {
        let picks = rank_and_select(
            (0..10)
                .map(|i| score(&format!("p{i}"), f64::from(i) / 10.0))
                .collect(),
            Percentage::new(20.0).unwrap(),
        );
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].id.as_str(), "p9");
        assert_eq!(picks[1].id.as_str(), "p8");
    }
}
