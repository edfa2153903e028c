//! Core domain types for photo scoring.

mod assessor;
mod photo;
mod score;

pub use assessor::Assessor;
pub use photo::{Photo, PhotoId};
pub use score::{AggregateScore, Percentage, ScoreRecord};
