//! Assessor registry: names, weights, enabled flags, and per-run snapshots.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::domain::Assessor;
use crate::error::RegistryError;

struct AssessorEntry {
    capability: Arc<dyn Assessor>,
    weight: f64,
    enabled: bool,
}

/// Owns the set of registered assessors, their weights and enabled flags.
///
/// Mutable at any time from any thread (a configuration UI, a CLI flag
/// handler); mutation only affects batch runs started afterwards, because a
/// run captures a [`RegistrySnapshot`] up front and never re-reads live state.
#[derive(Default)]
pub struct AssessorRegistry {
    entries: RwLock<BTreeMap<String, AssessorEntry>>,
}

impl AssessorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the given assessors.
    ///
    /// Each assessor is registered enabled with its default weight. A later
    /// assessor with a duplicate name replaces the earlier one.
    pub fn with_assessors(assessors: impl IntoIterator<Item = Arc<dyn Assessor>>) -> Self {
        let mut entries = BTreeMap::new();
        for capability in assessors {
            let weight = capability.default_weight().max(f64::MIN_POSITIVE);
            entries.insert(
                capability.name().to_owned(),
                AssessorEntry {
                    capability,
                    weight,
                    enabled: true,
                },
            );
        }
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Registers an assessor, enabled, with its default weight.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is taken, or
    /// [`RegistryError::InvalidWeight`] if the default weight is not > 0.
    pub fn register(&self, capability: Arc<dyn Assessor>) -> Result<(), RegistryError> {
        let weight = capability.default_weight();
        self.register_weighted(capability, weight)
    }

    /// Registers an assessor, enabled, overriding its default weight.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is taken, or
    /// [`RegistryError::InvalidWeight`] if `weight` is not finite and > 0.
    pub fn register_weighted(
        &self,
        capability: Arc<dyn Assessor>,
        weight: f64,
    ) -> Result<(), RegistryError> {
        let name = capability.name().to_owned();
        validate_weight(&name, weight)?;

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        debug!(assessor = %name, weight, "Registered assessor");
        entries.insert(
            name,
            AssessorEntry {
                capability,
                weight,
                enabled: true,
            },
        );
        Ok(())
    }

    /// Enables or disables an assessor. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown name.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_owned()))?;
        entry.enabled = enabled;
        debug!(assessor = name, enabled, "Toggled assessor");
        Ok(())
    }

    /// Sets an assessor's aggregation weight.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown name, or
    /// [`RegistryError::InvalidWeight`] if `weight` is not finite and > 0.
    pub fn set_weight(&self, name: &str, weight: f64) -> Result<(), RegistryError> {
        validate_weight(name, weight)?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_owned()))?;
        entry.weight = weight;
        debug!(assessor = name, weight, "Set assessor weight");
        Ok(())
    }

    /// Returns `(name, weight, enabled)` for every registered assessor, in
    /// name order. Intended for configuration display.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, f64, bool)> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .map(|(name, e)| (name.clone(), e.weight, e.enabled))
            .collect()
    }

    /// Captures an immutable point-in-time view of the registry.
    ///
    /// A batch run scores every photo under one snapshot, so rankings within
    /// the run are comparable even if the registry is mutated mid-flight.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        RegistrySnapshot {
            entries: entries
                .iter()
                .map(|(name, e)| {
                    (
                        name.clone(),
                        SnapshotEntry {
                            capability: Arc::clone(&e.capability),
                            weight: e.weight,
                            enabled: e.enabled,
                        },
                    )
                })
                .collect(),
        }
    }
}

fn validate_weight(name: &str, weight: f64) -> Result<(), RegistryError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(RegistryError::InvalidWeight {
            name: name.to_owned(),
            weight,
        })
    }
}

#[derive(Clone)]
pub(crate) struct SnapshotEntry {
    pub(crate) capability: Arc<dyn Assessor>,
    pub(crate) weight: f64,
    pub(crate) enabled: bool,
}

/// Immutable point-in-time view of registry configuration.
///
/// Holds its own `Arc` handles to the capabilities, so assessors registered
/// or reconfigured after the snapshot are invisible to the run using it.
/// Entries iterate in name order, which keeps floating-point aggregation
/// deterministic.
#[derive(Clone, Default)]
pub struct RegistrySnapshot {
    entries: BTreeMap<String, SnapshotEntry>,
}

impl RegistrySnapshot {
    /// Iterates over enabled assessors as `(name, weight, capability)`, in
    /// name order.
    pub(crate) fn enabled(&self) -> impl Iterator<Item = (&str, f64, &Arc<dyn Assessor>)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.enabled)
            .map(|(name, e)| (name.as_str(), e.weight, &e.capability))
    }

    /// Names of enabled assessors, in name order.
    pub fn enabled_names(&self) -> impl Iterator<Item = &str> {
        self.enabled().map(|(name, _, _)| name)
    }

    /// Number of enabled assessors.
    #[must_use]
    pub fn enabled_len(&self) -> usize {
        self.enabled().count()
    }
}
