//! The scoring orchestration and caching engine.
//!
//! Four narrowly-scoped components: the [`AssessorRegistry`] (mutable
//! configuration, snapshotted per run), the [`ScoreCache`] (shared
//! per-photo/per-assessor results), the [`Orchestrator`] (per-photo fan-out
//! to missing assessors), and the [`BatchAnalyzer`] (bounded-concurrency
//! drive over the candidate list plus rank-and-select).

mod analyzer;
mod cache;
mod orchestrator;
mod registry;

pub use analyzer::{BatchAnalyzer, BatchOptions, BatchProgress, BatchReport};
pub use cache::ScoreCache;
pub use orchestrator::Orchestrator;
pub use registry::{AssessorRegistry, RegistrySnapshot};
