//! Assessors command - list registered assessors.

use anyhow::Result;
use clap::Args;
use photo_picks_core::assessors::default_registry;
use serde::Serialize;

/// Arguments for the assessors command.
#[derive(Args)]
pub struct AssessorsArgs {
    /// Emit the list as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct AssessorInfo {
    name: String,
    weight: f64,
    enabled: bool,
}

/// Run the assessors command.
pub fn run(args: &AssessorsArgs) -> Result<()> {
    let registry = default_registry();
    let entries: Vec<AssessorInfo> = registry
        .entries()
        .into_iter()
        .map(|(name, weight, enabled)| AssessorInfo {
            name,
            weight,
            enabled,
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("{:<16} {:>8} {:>9}", "NAME", "WEIGHT", "ENABLED");
        for info in &entries {
            println!(
                "{:<16} {:>8.2} {:>9}",
                info.name, info.weight, info.enabled
            );
        }
    }

    Ok(())
}
