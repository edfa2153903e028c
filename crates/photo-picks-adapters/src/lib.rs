//! Photo Picks Adapters - Candidate sources for the scoring engine
//!
//! Currently one adapter: the filesystem candidate source with date-range
//! filtering and the cheap pre-filter (resolution, screenshots).

mod fs;

pub use fs::{FsCandidateSource, QuickFilter};
