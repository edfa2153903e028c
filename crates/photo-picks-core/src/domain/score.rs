//! Score record, aggregate score, and selection percentage types.

use std::collections::BTreeMap;

use serde::Serialize;

use super::PhotoId;
use crate::error::InvalidPercentage;

/// Per-photo mapping from assessor name to score in `[0, 1]`.
///
/// Ordered so that folding scores into a weighted mean always visits entries
/// in the same sequence regardless of the order assessors finished in.
pub type ScoreRecord = BTreeMap<String, f64>;

/// The weighted aggregate for one photo, recomputed on every run.
///
/// Never cached: weights change independently of the raw per-assessor scores.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateScore {
    /// Photo identity.
    pub id: PhotoId,
    /// Weighted mean of enabled assessors' scores.
    pub total: f64,
    /// Full per-assessor record (cached + freshly computed), kept for display.
    pub per_assessor: ScoreRecord,
    /// Assessors whose invocation failed for this photo (folded to 0.0).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

/// Validated selection percentage in `(0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentage(f64);

impl Percentage {
    /// Creates a percentage, rejecting values outside `(0, 100]`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPercentage`] if `value` is not in `(0, 100]` or is
    /// not finite.
    pub fn new(value: f64) -> Result<Self, InvalidPercentage> {
        if value.is_finite() && value > 0.0 && value <= 100.0 {
            Ok(Self(value))
        } else {
            Err(InvalidPercentage(value))
        }
    }

    /// Returns the raw percentage value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Number of entries to keep from a ranked list of `n` photos.
    ///
    /// Floor-then-max-1: any non-empty list yields at least one pick; an
    /// empty list yields none.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
    #[must_use]
    pub fn top_count(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        // Floor is safe: n * pct / 100 is non-negative and bounded by n.
        let floored = (n as f64 * self.0 / 100.0).floor() as usize;
        floored.max(1)
    }
}

impl Default for Percentage {
    /// Keep the top 20% by default.
    fn default() -> Self {
        Self(20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_bounds() {
        assert!(Percentage::new(0.0).is_err());
        assert!(Percentage::new(-5.0).is_err());
        assert!(Percentage::new(100.1).is_err());
        assert!(Percentage::new(f64::NAN).is_err());
        assert!(Percentage::new(0.5).is_ok());
        assert!(Percentage::new(100.0).is_ok());
    }

    #[test]
    fn test_top_count_floor_then_max_one() {
        let pct = Percentage::new(20.0).unwrap();
        assert_eq!(pct.top_count(10), 2);
        assert_eq!(pct.top_count(9), 1);

        let one = Percentage::new(1.0).unwrap();
        assert_eq!(one.top_count(1), 1);
        assert_eq!(one.top_count(50), 1);
    }

    #[test]
    fn test_top_count_empty_input() {
        let pct = Percentage::new(50.0).unwrap();
        assert_eq!(pct.top_count(0), 0);
    }

    #[test]
    fn test_top_count_full_percentage() {
        let pct = Percentage::new(100.0).unwrap();
        assert_eq!(pct.top_count(7), 7);
    }

    #[test]
    fn test_aggregate_serializes_without_empty_failures() {
        let score = AggregateScore {
            id: "p1".into(),
            total: 0.5,
            per_assessor: [("a".to_owned(), 0.5)].into_iter().collect(),
            failures: Vec::new(),
        };
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["per_assessor"]["a"], 0.5);
        assert!(json.get("failures").is_none());

        let score = AggregateScore {
            failures: vec!["a".to_owned()],
            ..score
        };
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["failures"][0], "a");
    }
}
