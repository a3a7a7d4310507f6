use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::app::ports::{CarrierFeedPort, ShipmentStore};
use crate::domain::TrackItShipment;
use crate::error::{NormalizeError, Result, TrackItError};
use crate::normalize::ShipmentNormalizer;
use crate::observability::metrics;

/// Use case for turning upstream carrier data into stored canonical shipments
pub struct TrackShipmentUseCase {
    normalizer: Arc<ShipmentNormalizer>,
    feed: Arc<dyn CarrierFeedPort>,
    store: Arc<dyn ShipmentStore>,
}

impl TrackShipmentUseCase {
    pub fn new(
        normalizer: Arc<ShipmentNormalizer>,
        feed: Arc<dyn CarrierFeedPort>,
        store: Arc<dyn ShipmentStore>,
    ) -> Self {
        Self {
            normalizer,
            feed,
            store,
        }
    }

    pub fn normalizer(&self) -> &ShipmentNormalizer {
        &self.normalizer
    }

    /// Fetch the raw payload for `tracking_id`, normalize it and store the result
    /// under `tracking_id`, even if the payload carries a different id
    pub async fn track(&self, tracking_id: &str) -> Result<TrackItShipment> {
        let payload = self
            .feed
            .fetch(tracking_id)
            .await?
            .ok_or_else(|| TrackItError::NotFound(tracking_id.to_string()))?;

        let shipment = self.normalize_payload(&payload.raw, &payload.carrier)?;

        self.store.put(tracking_id, shipment.clone()).await?;
        metrics::api::store_size(self.store.len().await?);
        debug!(
            tracking_id = %tracking_id,
            payload_id = %shipment.tracking_id(),
            "Stored normalized shipment"
        );

        Ok(shipment)
    }

    /// Normalize a payload without storing it, recording the outcome
    pub fn normalize_payload(&self, raw: &Value, carrier: &str) -> Result<TrackItShipment> {
        match self.normalizer.normalize(raw, carrier) {
            Ok(shipment) => {
                metrics::normalize::record_normalized(carrier, shipment.normalized_status());
                info!(
                    tracking_id = %shipment.tracking_id(),
                    carrier = %carrier,
                    status = %shipment.normalized_status(),
                    "Shipment normalized"
                );
                Ok(shipment)
            }
            Err(e) => {
                metrics::normalize::record_failure(&e);
                match &e {
                    NormalizeError::UnrecognizedCarrier(c) => {
                        warn!(carrier = %c, "Rejected payload from unrecognized carrier")
                    }
                    NormalizeError::ValidationFailed { carrier, source } => warn!(
                        carrier = %carrier,
                        field = %source.field(),
                        kind = source.kind(),
                        "Rejected payload that failed validation"
                    ),
                }
                Err(e.into())
            }
        }
    }

    /// Look up a previously normalized shipment
    pub async fn lookup(&self, tracking_id: &str) -> Result<TrackItShipment> {
        self.store
            .get(tracking_id)
            .await?
            .ok_or_else(|| TrackItError::NotFound(tracking_id.to_string()))
    }
}
