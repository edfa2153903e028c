//! Test support utilities for photo-picks.
//!
//! Provides instrumented mock assessors, a mock progress sink, and synthetic
//! image builders for testing the scoring engine and the CLI pipeline.
//!
//! # Example
//!
//! ```
//! use photo_picks_test_support::{MockAssessor, SyntheticImageBuilder};
//!
//! // A scripted assessor that records every call
//! let assessor = MockAssessor::returning("stub", 0.8);
//!
//! // Synthetic photos
//! let sharp = SyntheticImageBuilder::checkerboard(128, 128);
//! let flat = SyntheticImageBuilder::uniform_gray(128, 128, 128);
//! ```

mod builders;
mod mocks;

pub use builders::SyntheticImageBuilder;
pub use mocks::{MockAssessor, MockProgressSink};
