//! Progress reporting port for UI integration.

use crate::domain::{AggregateScore, PhotoId};

/// Events emitted during a batch run for progress tracking.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Scoring started for a photo.
    Started {
        /// Photo identity.
        id: PhotoId,
        /// Index in the candidate list (0-based).
        index: usize,
        /// Total candidates in the batch.
        total: usize,
    },
    /// Scoring completed for a photo.
    Completed {
        /// The aggregate score.
        score: AggregateScore,
    },
    /// A photo was skipped (scoring cut short by cancellation).
    Skipped {
        /// Photo identity.
        id: PhotoId,
        /// Reason for skipping.
        reason: String,
    },
    /// The batch finished (normally or via cancellation).
    Finished {
        /// Photos scored to completion.
        completed: usize,
        /// Whether the run was cancelled.
        cancelled: bool,
    },
}

/// Port for receiving progress events.
///
/// The analyzer calls sinks inline and never waits on a consumer, so
/// implementations must be fast and non-blocking.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

/// No-op sink for callers that do not track progress.
pub(crate) struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}
