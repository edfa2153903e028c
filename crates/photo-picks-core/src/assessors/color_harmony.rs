//! Color harmony assessor.
//!
//! Splits the image into a coarse grid, quantizes each cell to its dominant
//! color, and scores the balance between color variety (enough distinct
//! colors to be interesting) and distribution (no single color drowning the
//! rest).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use image::GenericImageView;

use crate::domain::{Assessor, Photo};

/// Configuration for color harmony scoring.
#[derive(Debug, Clone)]
pub struct ColorHarmonyConfig {
    /// Cells per image side.
    pub grid_size: u32,
    /// Quantization levels per RGB channel.
    pub levels: u8,
}

impl Default for ColorHarmonyConfig {
    fn default() -> Self {
        Self {
            grid_size: 8,
            levels: 4,
        }
    }
}

/// Grid dominant-color harmony assessor.
pub struct ColorHarmonyAssessor {
    config: ColorHarmonyConfig,
}

impl ColorHarmonyAssessor {
    /// Creates a color harmony assessor with the given configuration.
    #[must_use]
    pub const fn new(config: ColorHarmonyConfig) -> Self {
        Self { config }
    }
}

impl Default for ColorHarmonyAssessor {
    fn default() -> Self {
        Self::new(ColorHarmonyConfig::default())
    }
}

#[async_trait]
impl Assessor for ColorHarmonyAssessor {
    fn name(&self) -> &'static str {
        "color_harmony"
    }

    async fn assess(&self, photo: &Photo) -> anyhow::Result<f64> {
        let image = Arc::clone(&photo.image);
        let config = self.config.clone();
        let score = tokio::task::spawn_blocking(move || score_harmony(&image, &config)).await?;
        Ok(score)
    }
}

fn score_harmony(image: &image::DynamicImage, config: &ColorHarmonyConfig) -> f64 {
    let (width, height) = image.dimensions();
    let grid = config.grid_size.max(1);
    if width < grid || height < grid {
        return 0.0;
    }

    let cell_w = width / grid;
    let cell_h = height / grid;
    let rgb = image.to_rgb8();

    let mut color_counts: HashMap<(u8, u8, u8), u32> = HashMap::new();
    for gx in 0..grid {
        for gy in 0..grid {
            let dominant = dominant_color(&rgb, gx * cell_w, gy * cell_h, cell_w, cell_h, config.levels);
            *color_counts.entry(dominant).or_insert(0) += 1;
        }
    }

    let cells = f64::from(grid * grid);
    #[allow(clippy::cast_precision_loss)]
    let unique = color_counts.len() as f64;

    // Variety: hit half the cells with distinct colors for a full score.
    let variety = (unique / (cells / 2.0)).min(1.0);

    // Distribution: mean absolute deviation from an even spread, inverted.
    let avg = cells / unique;
    let deviation: f64 = color_counts
        .values()
        .map(|&count| (f64::from(count) - avg).abs())
        .sum();
    let distribution = 1.0 - (deviation / (2.0 * cells)).min(1.0);

    (variety + distribution) / 2.0
}

/// Average color of a cell, quantized to `levels` steps per channel.
fn dominant_color(
    rgb: &image::RgbImage,
    x0: u32,
    y0: u32,
    w: u32,
    h: u32,
    levels: u8,
) -> (u8, u8, u8) {
    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for y in y0..(y0 + h).min(rgb.height()) {
        for x in x0..(x0 + w).min(rgb.width()) {
            let pixel = rgb.get_pixel(x, y);
            for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                *sum += u64::from(channel);
            }
            count += 1;
        }
    }
    if count == 0 {
        return (0, 0, 0);
    }
    let step = 256 / u16::from(levels.max(1));
    let quantize = |sum: u64| {
        #[allow(clippy::cast_possible_truncation)]
        let mean = (sum / count) as u16;
        (mean / step.max(1) * step.max(1)).min(255) as u8
    };
    (quantize(sums[0]), quantize(sums[1]), quantize(sums[2]))
}
