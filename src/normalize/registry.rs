use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::adapters::{CarrierAdapter, FormatAAdapter, FormatBAdapter};

type AdapterMap = HashMap<String, Arc<dyn CarrierAdapter>>;

/// Registry mapping carrier identifiers to their format adapters.
///
/// Lookups take a snapshot of the current map; registration builds a new map
/// and swaps it in, so a lookup never observes a half-updated table.
pub struct AdapterRegistry {
    adapters: RwLock<Arc<AdapterMap>>,
}

impl AdapterRegistry {
    /// Create a new registry with the built-in adapters
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(Arc::new(FormatAAdapter::new()));
        registry.register(Arc::new(FormatBAdapter::new()));
        registry
    }

    pub fn empty() -> Self {
        Self {
            adapters: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    fn snapshot(&self) -> Arc<AdapterMap> {
        // The guarded value is only ever replaced whole, so a poisoned lock
        // still holds a consistent map.
        self.adapters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register an adapter under its own carrier identifier, returning the
    /// adapter it replaced, if any
    pub fn register(&self, adapter: Arc<dyn CarrierAdapter>) -> Option<Arc<dyn CarrierAdapter>> {
        let mut guard = self
            .adapters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next: AdapterMap = (**guard).clone();
        let previous = next.insert(adapter.carrier_id().to_string(), adapter);
        *guard = Arc::new(next);
        previous
    }

    /// Get the adapter for a carrier, by exact identifier match
    pub fn get_adapter(&self, carrier: &str) -> Option<Arc<dyn CarrierAdapter>> {
        self.snapshot().get(carrier).cloned()
    }

    pub fn contains(&self, carrier: &str) -> bool {
        self.snapshot().contains_key(carrier)
    }

    /// List all registered carrier identifiers, sorted
    pub fn list_carriers(&self) -> Vec<String> {
        let mut carriers: Vec<String> = self.snapshot().keys().cloned().collect();
        carriers.sort();
        carriers
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
