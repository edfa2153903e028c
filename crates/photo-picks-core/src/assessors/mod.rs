//! Built-in assessor implementations.
//!
//! Each assessor implements the `Assessor` trait for one quality dimension
//! using plain pixel statistics; none of them require models or network
//! access. Pixel work runs on a blocking thread so `assess` suspends instead
//! of stalling the runtime.

mod brightness;
mod color_harmony;
mod composition;
mod sharpness;

use std::sync::Arc;

pub use brightness::{BrightnessAssessor, BrightnessConfig};
pub use color_harmony::{ColorHarmonyAssessor, ColorHarmonyConfig};
pub use composition::{CompositionAssessor, CompositionConfig};
pub use sharpness::{SharpnessAssessor, SharpnessConfig};

use crate::domain::Assessor;
use crate::engine::AssessorRegistry;

/// Creates a registry with every built-in assessor registered, enabled, at
/// its default weight.
#[must_use]
pub fn default_registry() -> AssessorRegistry {
    AssessorRegistry::with_assessors(vec![
        Arc::new(BrightnessAssessor::default()) as Arc<dyn Assessor>,
        Arc::new(ColorHarmonyAssessor::default()),
        Arc::new(SharpnessAssessor::default()),
        Arc::new(CompositionAssessor::default()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_contents() {
        let registry = default_registry();
        let names: Vec<_> = registry
            .entries()
            .into_iter()
            .map(|(name, _, enabled)| {
                assert!(enabled);
                name
            })
            .collect();
        assert_eq!(
            names,
            vec!["brightness", "color_harmony", "composition", "sharpness"]
        );
    }
}
