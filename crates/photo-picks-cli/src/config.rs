//! Configuration file support for photo-picks.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/photo-picks/config.toml` (lowest priority)
//! - Project-local: `.photo-picks.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Selection settings.
    pub selection: SelectionConfig,
    /// Candidate pre-filter settings.
    pub filter: FilterConfig,
    /// Per-assessor overrides, keyed by assessor name.
    pub assessors: HashMap<String, AssessorOverride>,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
    /// Photos scored simultaneously.
    pub concurrency: Option<usize>,
    /// Global cap on in-flight assessor invocations.
    pub assessor_concurrency: Option<usize>,
}

/// Selection configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Percentage of ranked photos to keep, in (0, 100].
    pub percentage: Option<f64>,
}

/// Candidate pre-filter configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum width in pixels.
    pub min_width: Option<u32>,
    /// Minimum height in pixels.
    pub min_height: Option<u32>,
    /// Include files that look like screenshots.
    pub include_screenshots: Option<bool>,
}

/// Per-assessor configuration override.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AssessorOverride {
    /// Enable/disable the assessor.
    pub enabled: Option<bool>,
    /// Aggregation weight (> 0).
    pub weight: Option<f64>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/photo-picks/config.toml`
    /// 2. Project-local: `.photo-picks.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored; unreadable files are logged.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                if let Some(loaded) = load_file(&xdg_path) {
                    info!("Loaded config from {}", xdg_path.display());
                    config = loaded;
                }
            }
        }

        if let Some(local_path) = find_project_config() {
            if let Some(loaded) = load_file(&local_path) {
                info!("Loaded config from {}", local_path.display());
                config.merge_from(loaded);
            }
        }

        config
    }

    /// Overlays `other` onto `self`, with `other` winning where set.
    fn merge_from(&mut self, other: Self) {
        merge_opt(&mut self.general.recursive, other.general.recursive);
        merge_opt(&mut self.general.concurrency, other.general.concurrency);
        merge_opt(
            &mut self.general.assessor_concurrency,
            other.general.assessor_concurrency,
        );
        merge_opt(&mut self.selection.percentage, other.selection.percentage);
        merge_opt(&mut self.filter.min_width, other.filter.min_width);
        merge_opt(&mut self.filter.min_height, other.filter.min_height);
        merge_opt(
            &mut self.filter.include_screenshots,
            other.filter.include_screenshots,
        );
        merge_opt(&mut self.output.format, other.output.format);
        merge_opt(&mut self.output.pretty, other.output.pretty);
        merge_opt(&mut self.output.progress, other.output.progress);

        for (name, incoming) in other.assessors {
            let entry = self.assessors.entry(name).or_default();
            merge_opt(&mut entry.enabled, incoming.enabled);
            merge_opt(&mut entry.weight, incoming.weight);
        }
    }
}

fn merge_opt<T>(target: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *target = incoming;
    }
}

fn load_file(path: &Path) -> Option<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!("Invalid config {}: {e}", path.display());
                eprintln!("warning: ignoring invalid config {}: {e}", path.display());
                None
            }
        },
        Err(e) => {
            debug!("Unreadable config {}: {e}", path.display());
            None
        }
    }
}

fn xdg_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("photo-picks").join("config.toml"))
}

/// Searches for `.photo-picks.toml` from the current directory upwards.
fn find_project_config() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(".photo-picks.toml");
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [general]
            recursive = true
            concurrency = 8

            [selection]
            percentage = 10.0

            [filter]
            min_width = 512

            [assessors.sharpness]
            weight = 2.0

            [assessors.brightness]
            enabled = false

            [output]
            format = "json"
            pretty = true
            "#,
        )
        .unwrap();

        assert_eq!(config.general.recursive, Some(true));
        assert_eq!(config.general.concurrency, Some(8));
        assert_eq!(config.selection.percentage, Some(10.0));
        assert_eq!(config.filter.min_width, Some(512));
        assert_eq!(config.assessors["sharpness"].weight, Some(2.0));
        assert_eq!(config.assessors["brightness"].enabled, Some(false));
        assert_eq!(config.output.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.general.recursive.is_none());
        assert!(config.selection.percentage.is_none());
        assert!(config.assessors.is_empty());
    }

    #[test]
    fn test_merge_prefers_incoming() {
        let mut base: AppConfig = toml::from_str(
            r#"
            [selection]
            percentage = 10.0
            [assessors.sharpness]
            weight = 1.0
            "#,
        )
        .unwrap();
        let local: AppConfig = toml::from_str(
            r#"
            [selection]
            percentage = 25.0
            [assessors.sharpness]
            enabled = false
            "#,
        )
        .unwrap();

        base.merge_from(local);
        assert_eq!(base.selection.percentage, Some(25.0));
        assert_eq!(base.assessors["sharpness"].weight, Some(1.0));
        assert_eq!(base.assessors["sharpness"].enabled, Some(false));
    }
}
