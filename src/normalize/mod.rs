use serde_json::Value;
use std::sync::Arc;

pub mod adapters;
pub mod clock;
pub mod registry;
pub mod status;

pub use adapters::{CarrierAdapter, ShipmentView};
pub use clock::{Clock, FixedClock, SystemClock};
pub use registry::AdapterRegistry;
pub use status::StatusVocabulary;

use crate::domain::TrackItShipment;
use crate::error::NormalizeError;

/// Dispatches raw carrier payloads to their adapter and assembles the
/// canonical [`TrackItShipment`].
///
/// Holds no per-call state; share one instance behind an `Arc`.
pub struct ShipmentNormalizer {
    registry: Arc<AdapterRegistry>,
    vocabulary: StatusVocabulary,
    clock: Arc<dyn Clock>,
}

impl ShipmentNormalizer {
    /// Built-in adapters and vocabulary, wall-clock timestamps
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(AdapterRegistry::new()),
            StatusVocabulary::new(),
            Arc::new(SystemClock),
        )
    }

    pub fn with_parts(
        registry: Arc<AdapterRegistry>,
        vocabulary: StatusVocabulary,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            vocabulary,
            clock,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: StatusVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn vocabulary(&self) -> &StatusVocabulary {
        &self.vocabulary
    }

    /// Validate `raw` against the adapter registered for `carrier` and build
    /// the canonical record. The input is not modified.
    pub fn normalize(&self, raw: &Value, carrier: &str) -> Result<TrackItShipment, NormalizeError> {
        let adapter = self
            .registry
            .get_adapter(carrier)
            .ok_or_else(|| NormalizeError::UnrecognizedCarrier(carrier.to_string()))?;

        let view = adapter
            .validate(raw)
            .map_err(|source| NormalizeError::ValidationFailed {
                carrier: carrier.to_string(),
                source,
            })?;

        Ok(TrackItShipment::new(
            view.tracking_id().to_string(),
            self.vocabulary.translate(view.raw_status()),
            view.friendly_status(),
            view.location(),
            carrier.to_string(),
            self.clock.now(),
        ))
    }
}

impl Default for ShipmentNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
