//! CLI command definitions and handlers.

pub mod assessors;
pub mod pick;

use clap::{Parser, Subcommand};

/// Photo Picks - Select the best photos from a collection
#[derive(Parser)]
#[command(name = "photo-picks")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared pick arguments (paths, weights, selection settings).
    #[command(flatten)]
    pub pick: pick::PickArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Score photos and select the best
    Pick(pick::PickArgs),
    /// List registered assessors with weights
    Assessors(assessors::AssessorsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Run completed.
    Success,
    /// Run was cancelled before completing.
    Cancelled,
    /// Configuration or I/O error.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::from(0),
            ExitCode::Cancelled => Self::from(130),
            ExitCode::Error => Self::from(2),
        }
    }
}
