//! Photo identity and candidate types.

use std::fmt;
use std::sync::Arc;

use image::GenericImageView;
use serde::{Deserialize, Serialize};

/// Stable, opaque identifier for a photo.
///
/// The sole cache key: the same underlying photo must map to the same id for
/// the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    /// Creates a new photo id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhotoId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PhotoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A candidate photo: identity plus decoded pixel data.
///
/// Cheap to clone; the pixel data is shared behind an `Arc` so a photo can be
/// handed to several concurrently running assessors.
#[derive(Debug, Clone)]
pub struct Photo {
    /// Stable identifier (cache key).
    pub id: PhotoId,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: Arc<image::DynamicImage>,
}

impl Photo {
    /// Creates a photo from an id and decoded image.
    pub fn new(id: impl Into<PhotoId>, image: image::DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            id: id.into(),
            width,
            height,
            image: Arc::new(image),
        }
    }
}
