//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the scoring engine and external
//! adapters (photo sources, progress consumers, result writers).

mod candidate_source;
mod progress;
mod result_output;

pub use candidate_source::CandidateSource;
pub(crate) use progress::NullProgressSink;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
