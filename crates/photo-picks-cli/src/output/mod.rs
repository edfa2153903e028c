//! Output adapters: JSON result writers and the terminal progress bar.

mod json;
mod progress;

pub use json::{JsonOutput, JsonStyle};
pub use progress::ProgressBar;
