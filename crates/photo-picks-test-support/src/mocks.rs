//! Mock implementations of core port traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use photo_picks_core::domain::{Assessor, Photo, PhotoId};
use photo_picks_core::ports::{ProgressEvent, ProgressSink};
use tokio_util::sync::CancellationToken;

enum Behavior {
    Fixed(f64),
    Scripted(HashMap<PhotoId, f64>),
    Failing,
}

/// Mock implementation of `Assessor` for testing.
///
/// Records every call for assertions and supports scripted scores, fixed
/// scores, unconditional failure, per-call delay, and cancelling a token on
/// first invocation (for cancellation tests).
pub struct MockAssessor {
    name: &'static str,
    weight: f64,
    behavior: Behavior,
    delay: Option<Duration>,
    cancel_on_call: Option<CancellationToken>,
    calls: Arc<Mutex<Vec<PhotoId>>>,
}

impl MockAssessor {
    /// Creates a mock that returns the same score for every photo.
    #[must_use]
    pub fn returning(name: &'static str, score: f64) -> Self {
        Self::with_behavior(name, Behavior::Fixed(score))
    }

    /// Creates a mock with per-photo scripted scores.
    ///
    /// Unscripted photos score 0.0.
    #[must_use]
    pub fn scripted(name: &'static str, scores: HashMap<PhotoId, f64>) -> Self {
        Self::with_behavior(name, Behavior::Scripted(scores))
    }

    /// Creates a mock whose every invocation fails.
    #[must_use]
    pub fn failing(name: &'static str) -> Self {
        Self::with_behavior(name, Behavior::Failing)
    }

    fn with_behavior(name: &'static str, behavior: Behavior) -> Self {
        Self {
            name,
            weight: 1.0,
            behavior,
            delay: None,
            cancel_on_call: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sets the default weight reported at registration.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Adds a delay before each invocation returns.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Cancels the given token as a side effect of every invocation.
    #[must_use]
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_call = Some(token);
        self
    }

    /// Returns the number of invocations so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the photo ids of all invocations, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<PhotoId> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Assessor for MockAssessor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn default_weight(&self) -> f64 {
        self.weight
    }

    async fn assess(&self, photo: &Photo) -> anyhow::Result<f64> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(photo.id.clone());

        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Fixed(score) => Ok(*score),
            Behavior::Scripted(scores) => Ok(scores.get(&photo.id).copied().unwrap_or(0.0)),
            Behavior::Failing => anyhow::bail!("mock assessor `{}` always fails", self.name),
        }
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
#[derive(Default)]
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns `(completed, cancelled)` from the `Finished` event, if any.
    #[must_use]
    pub fn finished(&self) -> Option<(usize, bool)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                completed,
                cancelled,
            } => Some((*completed, *cancelled)),
            _ => None,
        })
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntheticImageBuilder;

    #[tokio::test]
    async fn test_mock_assessor_records_calls() {
        let assessor = MockAssessor::returning("stub", 0.7);
        let photo = SyntheticImageBuilder::uniform_gray(8, 8, 100);

        let score = assessor.assess(&photo).await.unwrap();
        assert_eq!(score, 0.7);
        assert_eq!(assessor.call_count(), 1);
        assert_eq!(assessor.calls(), vec![photo.id.clone()]);
    }

    #[tokio::test]
    async fn test_mock_assessor_failing() {
        let assessor = MockAssessor::failing("broken");
        let photo = SyntheticImageBuilder::uniform_gray(8, 8, 100);
        assert!(assessor.assess(&photo).await.is_err());
        assert_eq!(assessor.call_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink_counts() {
        let sink = MockProgressSink::new();
        sink.on_event(ProgressEvent::Started {
            id: PhotoId::new("p"),
            index: 0,
            total: 1,
        });
        sink.on_event(ProgressEvent::Finished {
            completed: 1,
            cancelled: false,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.finished(), Some((1, false)));
    }
}
