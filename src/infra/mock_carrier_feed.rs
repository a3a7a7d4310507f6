use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::app::ports::{CarrierFeedPort, CarrierPayload};
use crate::constants::{CARRIER_FORMAT_FIELD, FORMAT_A_CARRIER, FORMAT_B_CARRIER};
use crate::error::Result;

// Status pools each simulated carrier draws from
const FORMAT_A_STATUSES: &[&str] = &["DELIVERED", "IN_TRANSIT", "AT_WAREHOUSE"];
const FORMAT_B_STATUSES: &[&str] = &["Entregado", "En Tránsito", "En Almacén"];

const JITTER_DEGREES: f64 = 0.01;

/// Stand-in for the upstream carrier systems: raw payloads in their native
/// format, each tagged with the carrier format it follows.
pub struct MockCarrierFeed {
    inner: Mutex<FeedState>,
    drift_probability: f64,
}

struct FeedState {
    records: BTreeMap<String, Value>,
    rng: StdRng,
}

impl MockCarrierFeed {
    /// An empty feed
    pub fn new(seed: Option<u64>, drift_probability: f64) -> Self {
        Self::generate(0, seed, drift_probability)
    }

    /// A feed seeded with `count` shipments, `TRACK0001` upward. Odd ids
    /// follow Format B, even ids Format A.
    pub fn generate(count: u32, seed: Option<u64>, drift_probability: f64) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut records = BTreeMap::new();
        for i in 1..=count {
            let tracking_id = format!("TRACK{:04}", i);
            let record = if i % 2 == 0 {
                format_a_record(&tracking_id, i, &mut rng)
            } else {
                format_b_record(&tracking_id, i, &mut rng)
            };
            records.insert(tracking_id, record);
        }

        Self {
            inner: Mutex::new(FeedState { records, rng }),
            drift_probability,
        }
    }

    /// Add or replace a raw payload
    pub async fn insert(&self, tracking_id: &str, carrier: &str, mut raw: Value) {
        if let Some(object) = raw.as_object_mut() {
            object.insert(CARRIER_FORMAT_FIELD.to_string(), json!(carrier));
        }
        self.inner
            .lock()
            .await
            .records
            .insert(tracking_id.to_string(), raw);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn tracking_ids(&self) -> Vec<String> {
        self.inner.lock().await.records.keys().cloned().collect()
    }

    /// With the configured probability, move one random shipment along:
    /// warehouse shipments go in transit and every position jitters slightly.
    /// Returns the id that changed, if any.
    pub async fn maybe_drift(&self) -> Option<String> {
        let mut state = self.inner.lock().await;
        if self.drift_probability <= 0.0 || !state.rng.gen_bool(self.drift_probability.min(1.0)) {
            return None;
        }
        self.drift_one(&mut state)
    }

    /// Drift a random shipment unconditionally
    pub async fn drift_now(&self) -> Option<String> {
        let mut state = self.inner.lock().await;
        self.drift_one(&mut state)
    }

    fn drift_one(&self, state: &mut FeedState) -> Option<String> {
        let FeedState { records, rng } = state;
        let ids: Vec<&String> = records.keys().collect();
        let tracking_id = (*ids.choose(rng)?).clone();
        let record = records.get_mut(&tracking_id)?.as_object_mut()?;

        let carrier = record
            .get(CARRIER_FORMAT_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match carrier.as_str() {
            FORMAT_A_CARRIER => {
                advance(record, "status_code", "AT_WAREHOUSE", "IN_TRANSIT");
                jitter(record, "location_lat", rng);
                jitter(record, "location_lng", rng);
            }
            FORMAT_B_CARRIER => {
                advance(record, "estado", "En Almacén", "En Tránsito");
                let ubicacion = record.get_mut("ubicacion").and_then(Value::as_object_mut);
                if let Some(ubicacion) = ubicacion {
                    jitter(ubicacion, "latitud", rng);
                    jitter(ubicacion, "longitud", rng);
                }
            }
            _ => return None,
        }

        debug!(tracking_id = %tracking_id, carrier = %carrier, "Simulated shipment movement");
        Some(tracking_id)
    }
}

#[async_trait]
impl CarrierFeedPort for MockCarrierFeed {
    /// Returns a copy with the carrier tag split off; the stored record is untouched
    async fn fetch(&self, tracking_id: &str) -> Result<Option<CarrierPayload>> {
        let state = self.inner.lock().await;
        let Some(record) = state.records.get(tracking_id) else {
            return Ok(None);
        };

        let mut raw = record.clone();
        let carrier = raw
            .as_object_mut()
            .and_then(|object| object.remove(CARRIER_FORMAT_FIELD))
            .and_then(|tag| tag.as_str().map(str::to_string))
            .unwrap_or_default();

        Ok(Some(CarrierPayload { carrier, raw }))
    }
}

fn format_a_record(tracking_id: &str, i: u32, rng: &mut StdRng) -> Value {
    json!({
        "tracking_number": tracking_id,
        "status_code": FORMAT_A_STATUSES.choose(rng).copied().unwrap_or("IN_TRANSIT"),
        "progress_details": format!("Paquete en el área metropolitana {}.", i),
        "location_lat": rng.gen_range(30.0..40.0),
        "location_lng": rng.gen_range(-100.0..-80.0),
        CARRIER_FORMAT_FIELD: FORMAT_A_CARRIER,
    })
}

fn format_b_record(tracking_id: &str, i: u32, rng: &mut StdRng) -> Value {
    json!({
        "id_seguimiento": tracking_id,
        "estado": FORMAT_B_STATUSES.choose(rng).copied().unwrap_or("En Almacén"),
        "detalles": format!("El pedido está siendo procesado en la bodega {}.", i),
        "ubicacion": {
            "latitud": rng.gen_range(30.0..40.0),
            "longitud": rng.gen_range(-100.0..-80.0),
        },
        CARRIER_FORMAT_FIELD: FORMAT_B_CARRIER,
    })
}

// Fields that are absent or hold something else are left alone
fn advance(record: &mut Map<String, Value>, field: &str, from: &str, to: &str) {
    if let Some(value) = record.get_mut(field) {
        if *value == from {
            *value = json!(to);
        }
    }
}

fn jitter(object: &mut Map<String, Value>, field: &str, rng: &mut StdRng) {
    if let Some(value) = object.get_mut(field) {
        if let Some(v) = value.as_f64() {
            *value = json!(v + rng.gen_range(-JITTER_DEGREES..JITTER_DEGREES));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NormalizedStatus;
    use crate::normalize::ShipmentNormalizer;

    #[tokio::test]
    async fn test_generate_alternates_formats() {
        let feed = MockCarrierFeed::generate(4, Some(7), 0.0);
        assert_eq!(feed.len().await, 4);

        let odd = feed.fetch("TRACK0001").await.unwrap().unwrap();
        assert_eq!(odd.carrier, FORMAT_B_CARRIER);
        assert!(odd.raw.get("id_seguimiento").is_some());

        let even = feed.fetch("TRACK0002").await.unwrap().unwrap();
        assert_eq!(even.carrier, FORMAT_A_CARRIER);
        assert!(even.raw.get("tracking_number").is_some());
    }

    #[tokio::test]
    async fn test_fetch_strips_carrier_tag_without_mutating_store() {
        let feed = MockCarrierFeed::generate(2, Some(1), 0.0);
        let first = feed.fetch("TRACK0002").await.unwrap().unwrap();
        assert!(first.raw.get(CARRIER_FORMAT_FIELD).is_none());

        let second = feed.fetch("TRACK0002").await.unwrap().unwrap();
        assert_eq!(second.carrier, FORMAT_A_CARRIER);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_none() {
        let feed = MockCarrierFeed::generate(2, Some(1), 0.0);
        assert!(feed.fetch("NOEXISTE9999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_every_generated_payload_normalizes() {
        let feed = MockCarrierFeed::generate(20, Some(42), 0.0);
        let normalizer = ShipmentNormalizer::new();

        for id in feed.tracking_ids().await {
            let payload = feed.fetch(&id).await.unwrap().unwrap();
            let shipment = normalizer.normalize(&payload.raw, &payload.carrier).unwrap();
            assert_eq!(shipment.tracking_id(), id);
        }
    }

    #[tokio::test]
    async fn test_generated_english_statuses_are_unknown() {
        let feed = MockCarrierFeed::generate(2, Some(3), 0.0);
        let payload = feed.fetch("TRACK0002").await.unwrap().unwrap();
        let shipment = ShipmentNormalizer::new()
            .normalize(&payload.raw, &payload.carrier)
            .unwrap();
        assert_eq!(shipment.normalized_status(), NormalizedStatus::Unknown);
    }

    #[tokio::test]
    async fn test_drift_moves_warehouse_shipment() {
        let feed = MockCarrierFeed::new(Some(9), 0.0);
        feed.insert(
            "TRACK0001",
            FORMAT_B_CARRIER,
            json!({
                "id_seguimiento": "TRACK0001",
                "estado": "En Almacén",
                "detalles": "x",
                "ubicacion": {"latitud": 35.0, "longitud": -90.0}
            }),
        )
        .await;

        assert_eq!(feed.drift_now().await.as_deref(), Some("TRACK0001"));

        let payload = feed.fetch("TRACK0001").await.unwrap().unwrap();
        assert_eq!(payload.raw["estado"], "En Tránsito");
        let lat = payload.raw["ubicacion"]["latitud"].as_f64().unwrap();
        assert!((lat - 35.0).abs() <= JITTER_DEGREES);
    }

    #[tokio::test]
    async fn test_zero_probability_never_drifts() {
        let feed = MockCarrierFeed::generate(10, Some(5), 0.0);
        for _ in 0..50 {
            assert!(feed.maybe_drift().await.is_none());
        }
    }

    #[tokio::test]
    async fn test_drift_certain_probability() {
        let feed = MockCarrierFeed::generate(3, Some(4), 1.0);
        assert!(feed.maybe_drift().await.is_some());
    }

    #[tokio::test]
    async fn test_drift_leaves_malformed_records_shape_alone() {
        let feed = MockCarrierFeed::new(Some(2), 0.0);
        feed.insert(
            "TRACK0002",
            FORMAT_B_CARRIER,
            json!({"id_seguimiento": "TRACK0002", "estado": "En Almacén", "ubicacion": "Medellín"}),
        )
        .await;

        assert_eq!(feed.drift_now().await.as_deref(), Some("TRACK0002"));
        let payload = feed.fetch("TRACK0002").await.unwrap().unwrap();
        assert_eq!(payload.raw["ubicacion"], "Medellín");
        assert_eq!(payload.raw["estado"], "En Tránsito");

        let feed = MockCarrierFeed::new(Some(2), 0.0);
        feed.insert("T1", FORMAT_A_CARRIER, json!({"tracking_number": "T1"}))
            .await;
        feed.drift_now().await;

        let payload = feed.fetch("T1").await.unwrap().unwrap();
        assert_eq!(payload.raw, json!({"tracking_number": "T1"}));

        // Still a missing field, not a wrong type
        let err = ShipmentNormalizer::new()
            .normalize(&payload.raw, &payload.carrier)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::NormalizeError::ValidationFailed {
                source: crate::error::ValidationError::MissingField { .. },
                ..
            }
        ));
    }
}
