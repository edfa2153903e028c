//! Photo Picks Core - Scoring engine and built-in assessors
//!
//! This crate contains the domain types, the `Assessor` trait, the scoring
//! orchestration/caching engine (registry, cache, orchestrator, batch
//! analyzer), and the built-in pixel-statistics assessors.

pub mod assessors;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;

pub use domain::{AggregateScore, Assessor, Percentage, Photo, PhotoId, ScoreRecord};
pub use engine::{
    AssessorRegistry, BatchAnalyzer, BatchOptions, BatchProgress, BatchReport, RegistrySnapshot,
    ScoreCache,
};
pub use error::{InvalidPercentage, RegistryError};
pub use ports::{CandidateSource, ProgressEvent, ProgressSink, ResultOutput};
