//! Epoch-keyed cache for derived schema information
//!
//! Every entry belongs to one registry epoch. A lookup under a different
//! epoch misses, and the first write under a new epoch drops everything
//! computed before.

use indexmap::IndexMap;
use linkml_core::types::{ClassDefinition, SlotDefinition, TypeDefinition};
use std::collections::HashMap;
use std::sync::Arc;

use crate::namespace::Namespaces;

/// Key of an induced slot: slot name plus optional class context
pub(crate) type SlotKey = (String, Option<String>);

/// Cache for navigation results
#[derive(Debug, Default)]
pub struct NavigationCache {
    epoch: u64,
    induced_slots: HashMap<SlotKey, SlotDefinition>,
    induced_classes: HashMap<String, ClassDefinition>,
    induced_types: HashMap<String, TypeDefinition>,
    element_index: Option<Arc<IndexMap<String, String>>>,
    namespaces: Option<Arc<Namespaces>>,
}

impl NavigationCache {
    /// Create an empty cache for `epoch`
    #[must_use]
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            ..Self::default()
        }
    }

    /// Epoch the cached entries were computed under
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Drop everything if the cache was computed under another epoch
    pub fn sync(&mut self, epoch: u64) {
        if self.epoch != epoch {
            tracing::debug!(from = self.epoch, to = epoch, "invalidating navigation cache");
            *self = Self::new(epoch);
        }
    }

    pub(crate) fn induced_slot(&self, key: &SlotKey) -> Option<&SlotDefinition> {
        self.induced_slots.get(key)
    }

    pub(crate) fn cache_induced_slot(&mut self, key: SlotKey, slot: SlotDefinition) {
        self.induced_slots.insert(key, slot);
    }

    pub(crate) fn induced_class(&self, name: &str) -> Option<&ClassDefinition> {
        self.induced_classes.get(name)
    }

    pub(crate) fn cache_induced_class(&mut self, name: String, class: ClassDefinition) {
        self.induced_classes.insert(name, class);
    }

    pub(crate) fn induced_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.induced_types.get(name)
    }

    pub(crate) fn cache_induced_type(&mut self, name: String, type_def: TypeDefinition) {
        self.induced_types.insert(name, type_def);
    }

    pub(crate) fn element_index(&self) -> Option<&Arc<IndexMap<String, String>>> {
        self.element_index.as_ref()
    }

    pub(crate) fn cache_element_index(&mut self, index: Arc<IndexMap<String, String>>) {
        self.element_index = Some(index);
    }

    pub(crate) fn namespaces(&self) -> Option<&Arc<Namespaces>> {
        self.namespaces.as_ref()
    }

    pub(crate) fn cache_namespaces(&mut self, namespaces: Arc<Namespaces>) {
        self.namespaces = Some(namespaces);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_drops_stale_entries() {
        let mut cache = NavigationCache::new(1);
        cache.cache_induced_type("string".to_string(), TypeDefinition::new("string"));
        cache.sync(1);
        assert!(cache.induced_type("string").is_some());

        cache.sync(2);
        assert_eq!(cache.epoch(), 2);
        assert!(cache.induced_type("string").is_none());
    }
}
