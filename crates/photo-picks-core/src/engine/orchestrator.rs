//! Per-photo scoring: fan out to missing assessors, merge with cache,
//! aggregate under the run's registry snapshot.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{cache::ScoreCache, registry::RegistrySnapshot};
use crate::domain::{AggregateScore, Assessor, Photo, ScoreRecord};

enum Invocation {
    Scored(String, f64),
    Failed(String),
    NotLaunched,
}

/// Produces one [`AggregateScore`] per photo, invoking only the assessors
/// whose results are not already cached.
pub struct Orchestrator {
    cache: Arc<ScoreCache>,
    limiter: Arc<Semaphore>,
}

impl Orchestrator {
    /// Creates an orchestrator over a shared cache and a shared invocation
    /// limiter.
    ///
    /// The limiter bounds in-flight capability calls globally: it is shared
    /// across every photo the batch analyzer has in flight, not per photo.
    #[must_use]
    pub fn new(cache: Arc<ScoreCache>, limiter: Arc<Semaphore>) -> Self {
        Self { cache, limiter }
    }

    /// Scores one photo under a fixed registry snapshot.
    ///
    /// Missing assessors run concurrently; each successful score is written
    /// to the cache as soon as it lands, so retries and later runs benefit
    /// even before this photo's aggregate is finalized. A failing assessor
    /// contributes 0.0 and is never cached. Cached scores for since-disabled
    /// assessors are kept in the returned record but excluded from the total.
    ///
    /// Returns `None` if cancellation prevented launching every required
    /// assessor — a partial aggregate would not be comparable to complete
    /// ones. Results of invocations that did run are still cached.
    pub async fn score_photo(
        &self,
        photo: &Photo,
        snapshot: &RegistrySnapshot,
        cancel: &CancellationToken,
    ) -> Option<AggregateScore> {
        let enabled: Vec<&str> = snapshot.enabled_names().collect();
        let mut record: ScoreRecord = self.cache.get(&photo.id).unwrap_or_default();
        let missing = self
            .cache
            .missing(&photo.id, enabled.iter().copied());

        debug!(
            photo = %photo.id,
            enabled = enabled.len(),
            cached = enabled.len() - missing.len(),
            missing = missing.len(),
            "Scoring photo"
        );

        let mut failures = Vec::new();
        if !missing.is_empty() {
            let mut calls: FuturesUnordered<_> = snapshot
                .enabled()
                .filter(|(name, _, _)| missing.iter().any(|m| m.as_str() == *name))
                .map(|(name, _, capability)| self.invoke(name, capability, photo, cancel))
                .collect();

            let mut incomplete = false;
            while let Some(outcome) = calls.next().await {
                match outcome {
                    Invocation::Scored(name, score) => {
                        self.cache.put(&photo.id, &name, score);
                        record.insert(name, score);
                    }
                    Invocation::Failed(name) => {
                        record.insert(name.clone(), 0.0);
                        failures.push(name);
                    }
                    Invocation::NotLaunched => incomplete = true,
                }
            }
            if incomplete {
                return None;
            }
        }

        failures.sort_unstable();
        Some(aggregate(photo, snapshot, record, failures))
    }

    /// Runs one capability call under the global limiter.
    ///
    /// The cancellation check sits after permit acquisition: a call that has
    /// not yet acquired a permit by the time cancellation is requested counts
    /// as "not launched" and is abandoned.
    async fn invoke(
        &self,
        name: &str,
        capability: &Arc<dyn Assessor>,
        photo: &Photo,
        cancel: &CancellationToken,
    ) -> Invocation {
        let Ok(_permit) = self.limiter.acquire().await else {
            // Semaphore closed; treated the same as cancellation.
            return Invocation::NotLaunched;
        };
        if cancel.is_cancelled() {
            return Invocation::NotLaunched;
        }

        match capability.assess(photo).await {
            Ok(score) => {
                if !(0.0..=1.0).contains(&score) {
                    debug!(assessor = name, score, "Clamping out-of-range score");
                }
                Invocation::Scored(name.to_owned(), score.clamp(0.0, 1.0))
            }
            Err(error) => {
                warn!(assessor = name, photo = %photo.id, %error, "Assessor failed");
                Invocation::Failed(name.to_owned())
            }
        }
    }
}

/// Weighted mean over the snapshot's enabled set.
///
/// Iterates in snapshot (name) order so floating-point accumulation is
/// reproducible across runs and concurrency levels. An enabled assessor is
/// always present in `record` by the time this is called; `total` is 0.0
/// when nothing is enabled.
fn aggregate(
    photo: &Photo,
    snapshot: &RegistrySnapshot,
    record: ScoreRecord,
    failures: Vec<String>,
) -> AggregateScore {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for (name, weight, _) in snapshot.enabled() {
        let score = record.get(name).copied().unwrap_or(0.0);
        weighted_sum += score * weight;
        weight_sum += weight;
    }
    let total = if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        0.0
    };

    AggregateScore {
        id: photo.id.clone(),
        total,
        per_assessor: record,
        failures,
    }
}
