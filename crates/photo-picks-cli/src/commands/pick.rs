//! Pick command - score photos and select the best.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, ValueEnum};
use photo_picks_adapters::{FsCandidateSource, QuickFilter};
use photo_picks_core::assessors::default_registry;
use photo_picks_core::{
    BatchAnalyzer, BatchOptions, CandidateSource, Percentage, Photo, ResultOutput,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, JsonStyle, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object with ranked picks
    #[default]
    Json,
    /// JSON Lines (one pick per line)
    Jsonl,
}

/// Hardcoded default values.
mod defaults {
    pub const PERCENTAGE: f64 = 20.0;
    pub const CONCURRENCY: usize = 4;
    pub const ASSESSOR_CONCURRENCY: usize = 8;
    pub const MIN_WIDTH: u32 = 256;
    pub const MIN_HEIGHT: u32 = 256;
}

/// Parse and validate a selection percentage in (0, 100].
fn parse_percentage(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    Percentage::new(value).map_err(|e| e.to_string())?;
    Ok(value)
}

/// Parse a `NAME=WEIGHT` override.
fn parse_weight(s: &str) -> Result<(String, f64), String> {
    let (name, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("'{s}' is not of the form NAME=WEIGHT"))?;
    let weight: f64 = weight
        .parse()
        .map_err(|_| format!("'{weight}' is not a valid number"))?;
    if !(weight.is_finite() && weight > 0.0) {
        return Err(format!("weight {weight} is not > 0"));
    }
    Ok((name.to_owned(), weight))
}

/// Parse a `YYYY-MM-DD` date into a UTC midnight timestamp.
fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("'{s}' is not a valid YYYY-MM-DD date"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("'{s}' has no midnight"))?;
    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

/// Shared arguments for photo selection.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct PickArgs {
    /// Files or directories to scan for candidates
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Only consider photos modified on or after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub since: Option<DateTime<Utc>>,

    /// Only consider photos modified on or before this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub until: Option<DateTime<Utc>>,

    /// Percentage of ranked photos to keep, in (0, 100]
    #[arg(short, long, value_parser = parse_percentage)]
    pub percentage: Option<f64>,

    /// Photos scored simultaneously
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Global cap on in-flight assessor invocations
    #[arg(long)]
    pub assessor_concurrency: Option<usize>,

    /// Disable an assessor by name (repeatable)
    #[arg(long = "disable", value_name = "NAME")]
    pub disabled: Vec<String>,

    /// Override an assessor weight as NAME=WEIGHT (repeatable)
    #[arg(long = "weight", value_name = "NAME=WEIGHT", value_parser = parse_weight)]
    pub weights: Vec<(String, f64)>,

    /// Minimum candidate width in pixels
    #[arg(long)]
    pub min_width: Option<u32>,

    /// Minimum candidate height in pixels
    #[arg(long)]
    pub min_height: Option<u32>,

    /// Keep files whose name looks like a screenshot
    #[arg(long)]
    pub include_screenshots: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl PickArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        // Recursive: config applies only if CLI --recursive not passed
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        // Numeric options: CLI > config (accessors provide hardcoded fallback)
        args.percentage = args.percentage.or(config.selection.percentage);
        args.concurrency = args.concurrency.or(config.general.concurrency);
        args.assessor_concurrency = args
            .assessor_concurrency
            .or(config.general.assessor_concurrency);
        args.min_width = args.min_width.or(config.filter.min_width);
        args.min_height = args.min_height.or(config.filter.min_height);

        if !args.include_screenshots {
            args.include_screenshots = config.filter.include_screenshots.unwrap_or(false);
        }

        // Output format: CLI > config
        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        // Boolean output options: CLI flag wins, then config
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        // Store config for assessor overrides
        args.config = Some(config.clone());

        args
    }

    fn percentage(&self) -> Result<Percentage> {
        Percentage::new(self.percentage.unwrap_or(defaults::PERCENTAGE)).map_err(Into::into)
    }

    fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(defaults::CONCURRENCY).max(1)
    }

    fn assessor_concurrency(&self) -> usize {
        self.assessor_concurrency
            .unwrap_or(defaults::ASSESSOR_CONCURRENCY)
            .max(1)
    }

    fn quick_filter(&self) -> QuickFilter {
        QuickFilter {
            min_width: self.min_width.unwrap_or(defaults::MIN_WIDTH),
            min_height: self.min_height.unwrap_or(defaults::MIN_HEIGHT),
            exclude_screenshots: !self.include_screenshots,
        }
    }

    fn json_style(&self) -> JsonStyle {
        match self.format.unwrap_or_default() {
            OutputFormat::Json if self.pretty => JsonStyle::Pretty,
            OutputFormat::Json => JsonStyle::Compact,
            OutputFormat::Jsonl => JsonStyle::Lines,
        }
    }
}

/// Result of running the pick command.
pub struct PickResult {
    /// Number of photos scored to completion.
    pub completed: usize,
    /// Number of candidates that failed to load.
    pub skipped: usize,
    /// Number of selected picks.
    pub picks: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the pick command.
pub async fn run(args: &PickArgs) -> Result<PickResult> {
    let config = AppConfig::load();
    let args = PickArgs::with_config(args.clone(), &config);

    info!("Running pick command on {} paths", args.paths.len());
    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    // Build the registry: built-in assessors, config overrides, CLI overrides.
    let registry = default_registry();
    if let Some(config) = &args.config {
        for (name, overrides) in &config.assessors {
            if let Some(weight) = overrides.weight {
                registry
                    .set_weight(name, weight)
                    .with_context(|| format!("config override for `{name}`"))?;
            }
            if let Some(enabled) = overrides.enabled {
                registry
                    .set_enabled(name, enabled)
                    .with_context(|| format!("config override for `{name}`"))?;
            }
        }
    }
    for (name, weight) in &args.weights {
        registry.set_weight(name, *weight)?;
    }
    for name in &args.disabled {
        registry.set_enabled(name, false)?;
    }

    // Collect candidates up front; load failures are skipped with a warning.
    let source = FsCandidateSource::new(args.paths.clone(), args.recursive)
        .with_date_range(args.since, args.until)
        .with_filter(args.quick_filter());

    let mut candidates: Vec<Photo> = Vec::new();
    let mut skipped = 0usize;
    for item in source.candidates() {
        match item {
            Ok(photo) => candidates.push(photo),
            Err(e) => {
                warn!("Skipping candidate: {e:#}");
                skipped += 1;
            }
        }
    }
    debug!(
        candidates = candidates.len(),
        skipped, "Candidate collection done"
    );

    let options = BatchOptions {
        photo_concurrency: args.concurrency(),
        assessor_concurrency: args.assessor_concurrency(),
        percentage: args.percentage()?,
    };

    let show_progress = !args.quiet && args.progress;
    let progress_bar = Arc::new(ProgressBar::new(
        Some(candidates.len() as u64),
        args.quiet,
        show_progress,
    ));

    let analyzer = BatchAnalyzer::new(Arc::new(photo_picks_core::ScoreCache::new()), options)
        .with_progress_sink(progress_bar);

    // Ctrl-C requests cooperative cancellation; in-flight work finishes.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Cancellation requested");
            signal_cancel.cancel();
        }
    });

    let report = analyzer.run(candidates, registry.snapshot(), cancel).await;

    let output = JsonOutput::stdout(args.json_style());
    output.write(&report)?;
    output.flush()?;

    for (name, count) in &report.failure_counts {
        warn!(assessor = %name, failures = count, "Assessor failures during run");
    }

    Ok(PickResult {
        completed: report.completed,
        skipped,
        picks: report.picks.len(),
        exit_code: if report.cancelled {
            ExitCode::Cancelled
        } else {
            ExitCode::Success
        },
    })
}
