use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::app::ports::ShipmentStore;
use crate::domain::TrackItShipment;
use crate::error::Result;

/// In-memory shipment store for development/testing. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryShipmentStore {
    shipments: RwLock<HashMap<String, TrackItShipment>>,
}

impl InMemoryShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShipmentStore for InMemoryShipmentStore {
    async fn put(&self, tracking_id: &str, shipment: TrackItShipment) -> Result<()> {
        let replaced = self
            .shipments
            .write()
            .await
            .insert(tracking_id.to_string(), shipment)
            .is_some();
        debug!(tracking_id = %tracking_id, replaced, "Stored shipment");
        Ok(())
    }

    async fn get(&self, tracking_id: &str) -> Result<Option<TrackItShipment>> {
        Ok(self.shipments.read().await.get(tracking_id).cloned())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.shipments.read().await.len())
    }
}
