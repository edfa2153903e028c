//! Assessor trait for pluggable quality scoring.

use async_trait::async_trait;

use super::Photo;

/// Trait for implementing photo quality assessors.
///
/// Each assessor scores one quality dimension of a photo on a `[0, 1]` scale.
/// Implementations must be safely callable concurrently: for different photos,
/// and for the same photo alongside other assessors.
#[async_trait]
pub trait Assessor: Send + Sync {
    /// Returns the unique name of this assessor.
    fn name(&self) -> &'static str;

    /// Returns the default aggregation weight used at registration.
    fn default_weight(&self) -> f64 {
        1.0
    }

    /// Scores a photo.
    ///
    /// # Returns
    ///
    /// A score in `[0.0, 1.0]`; higher is better. Values outside the range
    /// are clamped by the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the photo could not be assessed. The engine folds
    /// the failure to a 0.0 contribution and never caches it.
    async fn assess(&self, photo: &Photo) -> anyhow::Result<f64>;
}
