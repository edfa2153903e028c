//! Filesystem adapter for supplying candidate photos.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use image::GenericImageView;
use photo_picks_core::{CandidateSource, Photo};
use tracing::{debug, warn};

/// Supported image extensions.
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Cheap pre-filter applied before a file becomes a candidate.
///
/// Mirrors the quick-filter heuristics of the photo library: thumbnails and
/// screenshots are rarely worth ranking, so they are excluded before any
/// expensive scoring happens.
#[derive(Debug, Clone)]
pub struct QuickFilter {
    /// Minimum width in pixels.
    pub min_width: u32,
    /// Minimum height in pixels.
    pub min_height: u32,
    /// Exclude files whose name looks like a screen capture.
    pub exclude_screenshots: bool,
}

impl Default for QuickFilter {
    fn default() -> Self {
        Self {
            min_width: 256,
            min_height: 256,
            exclude_screenshots: true,
        }
    }
}

impl QuickFilter {
    fn name_excluded(&self, path: &Path) -> bool {
        if !self.exclude_screenshots {
            return false;
        }
        path.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_lowercase)
            .is_some_and(|name| name.contains("screenshot") || name.contains("screen shot"))
    }

    fn dimensions_excluded(&self, width: u32, height: u32) -> bool {
        width < self.min_width || height < self.min_height
    }
}

/// Filesystem candidate source.
///
/// Scans files and directories, keeps supported raster images whose
/// modification time falls inside the configured date range, applies the
/// quick filter, and yields candidates ordered by modification time
/// (oldest first) with ties broken by path. The ordering is what makes the
/// engine's tie-break deterministic across runs.
pub struct FsCandidateSource {
    paths: Vec<PathBuf>,
    recursive: bool,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    filter: QuickFilter,
}

impl FsCandidateSource {
    /// Creates a new filesystem candidate source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self {
            paths,
            recursive,
            since: None,
            until: None,
            filter: QuickFilter::default(),
        }
    }

    /// Restricts candidates to a modification-time range. Either bound may
    /// be open.
    #[must_use]
    pub fn with_date_range(
        mut self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    /// Replaces the default quick filter.
    #[must_use]
    pub fn with_filter(mut self, filter: QuickFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Collects candidate files, date-filtered and ordered by
    /// `(modified, path)`.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if is_supported_image(path) {
                    self.consider(path.clone(), &mut files);
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files.sort();
        files.into_iter().map(|(_, path)| path).collect()
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<(SystemTime, PathBuf)>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && is_supported_image(&path) {
                self.consider(path, files);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }

    /// Applies the date-range and name filters; dimension checks happen at
    /// load time, once the header is decoded anyway.
    fn consider(&self, path: PathBuf, files: &mut Vec<(SystemTime, PathBuf)>) {
        if self.filter.name_excluded(&path) {
            debug!("Excluded by name filter: {}", path.display());
            return;
        }

        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        if let (Some(modified), since, until) = (modified, self.since, self.until) {
            let modified_utc: DateTime<Utc> = modified.into();
            if since.is_some_and(|s| modified_utc < s) || until.is_some_and(|u| modified_utc > u) {
                debug!("Outside date range: {}", path.display());
                return;
            }
        }

        files.push((modified.unwrap_or(SystemTime::UNIX_EPOCH), path));
    }

    fn load(&self, path: &Path) -> Result<Option<Photo>> {
        let image = image::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?;
        let (width, height) = image.dimensions();
        if self.filter.dimensions_excluded(width, height) {
            debug!(
                "Excluded by resolution filter ({}x{}): {}",
                width,
                height,
                path.display()
            );
            return Ok(None);
        }
        Ok(Some(Photo::new(path.to_string_lossy().into_owned(), image)))
    }
}

impl CandidateSource for FsCandidateSource {
    fn candidates(&self) -> Box<dyn Iterator<Item = Result<Photo>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} candidate files", files.len());

        Box::new(
            files
                .into_iter()
                .filter_map(|path| self.load(&path).transpose()),
        )
    }

    fn count_hint(&self) -> Option<usize> {
        // Upper bound: the resolution filter can only drop files at load time.
        Some(self.collect_files().len())
    }
}

/// Checks if a path has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| RASTER_EXTENSIONS.contains(&e.as_str()))
}
