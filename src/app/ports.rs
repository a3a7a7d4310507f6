use async_trait::async_trait;
use serde_json::Value;

use crate::domain::TrackItShipment;
use crate::error::Result;

/// Where normalized shipments are kept, keyed by the id they were requested
/// under. A later record for the same key overwrites the earlier one.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn put(&self, tracking_id: &str, shipment: TrackItShipment) -> Result<()>;
    async fn get(&self, tracking_id: &str) -> Result<Option<TrackItShipment>>;
    async fn len(&self) -> Result<usize>;
}

/// A raw upstream payload and the carrier format it claims to follow
#[derive(Debug, Clone, PartialEq)]
pub struct CarrierPayload {
    pub carrier: String,
    pub raw: Value,
}

/// Upstream carrier data, keyed by tracking id
#[async_trait]
pub trait CarrierFeedPort: Send + Sync {
    async fn fetch(&self, tracking_id: &str) -> Result<Option<CarrierPayload>>;
}
