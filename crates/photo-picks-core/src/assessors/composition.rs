//! Composition assessor.
//!
//! Rule-of-thirds heuristic: finds the cells with the highest edge density
//! (a cheap stand-in for "subject") and scores how close they sit to the
//! third-line intersections. Centered or edge-pinned subjects score lower.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Assessor, Photo};

/// Configuration for composition scoring.
#[derive(Debug, Clone)]
pub struct CompositionConfig {
    /// Analysis grid cells per side.
    pub grid_size: u32,
    /// How many of the highest-energy cells count as subject regions.
    pub interest_regions: usize,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            grid_size: 12,
            interest_regions: 3,
        }
    }
}

/// Rule-of-thirds composition assessor.
pub struct CompositionAssessor {
    config: CompositionConfig,
}

impl CompositionAssessor {
    /// Creates a composition assessor with the given configuration.
    #[must_use]
    pub const fn new(config: CompositionConfig) -> Self {
        Self { config }
    }
}

impl Default for CompositionAssessor {
    fn default() -> Self {
        Self::new(CompositionConfig::default())
    }
}

#[async_trait]
impl Assessor for CompositionAssessor {
    fn name(&self) -> &'static str {
        "composition"
    }

    async fn assess(&self, photo: &Photo) -> anyhow::Result<f64> {
        let image = Arc::clone(&photo.image);
        let config = self.config.clone();
        let score =
            tokio::task::spawn_blocking(move || score_composition(&image.to_luma8(), &config))
                .await?;
        Ok(score)
    }
}

fn score_composition(luma: &image::GrayImage, config: &CompositionConfig) -> f64 {
    let grid = config.grid_size.max(3);
    let (width, height) = luma.dimensions();
    if width < grid || height < grid {
        return 0.0;
    }

    let cell_w = width / grid;
    let cell_h = height / grid;

    // Edge energy per cell: sum of absolute horizontal+vertical gradients.
    let mut cells: Vec<(f64, f64, f64)> = Vec::with_capacity((grid * grid) as usize);
    for gy in 0..grid {
        for gx in 0..grid {
            let energy = cell_energy(luma, gx * cell_w, gy * cell_h, cell_w, cell_h);
            // Cell center in normalized [0, 1] image coordinates.
            let cx = (f64::from(gx) + 0.5) / f64::from(grid);
            let cy = (f64::from(gy) + 0.5) / f64::from(grid);
            cells.push((energy, cx, cy));
        }
    }

    cells.sort_by(|a, b| b.0.total_cmp(&a.0));
    let interest = &cells[..config.interest_regions.min(cells.len())];
    if interest.iter().all(|(energy, _, _)| *energy == 0.0) {
        // No structure at all (flat image): nothing to compose.
        return 0.0;
    }

    // Average proximity of interest regions to the nearest thirds
    // intersection, where 0.5 is the farthest any point can be on one axis.
    let thirds = [1.0 / 3.0, 2.0 / 3.0];
    let proximity: f64 = interest
        .iter()
        .map(|(_, cx, cy)| {
            let dx = thirds
                .iter()
                .map(|t| (cx - t).abs())
                .fold(f64::MAX, f64::min);
            let dy = thirds
                .iter()
                .map(|t| (cy - t).abs())
                .fold(f64::MAX, f64::min);
            let distance = dx.hypot(dy);
            // Max possible distance to a thirds intersection is ~0.47.
            1.0 - (distance / 0.5).min(1.0)
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let score = proximity / interest.len() as f64;
    score
}

fn cell_energy(luma: &image::GrayImage, x0: u32, y0: u32, w: u32, h: u32) -> f64 {
    let x1 = (x0 + w).min(luma.width() - 1);
    let y1 = (y0 + h).min(luma.height() - 1);
    let at = |x: u32, y: u32| f64::from(luma.get_pixel(x, y).0[0]);

    let mut energy = 0.0;
    for y in y0..y1 {
        for x in x0..x1 {
            energy += (at(x + 1, y) - at(x, y)).abs() + (at(x, y + 1) - at(x, y)).abs();
        }
    }
    energy
}
