use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical shipment states every carrier vocabulary is translated into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NormalizedStatus {
    AtWarehouse,
    InTransit,
    DeliveryAttemptFailed,
    Delivered,
    /// No canonical mapping exists for the carrier's token. A value, not an error.
    Unknown,
}

impl NormalizedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizedStatus::AtWarehouse => "AT_WAREHOUSE",
            NormalizedStatus::InTransit => "IN_TRANSIT",
            NormalizedStatus::DeliveryAttemptFailed => "DELIVERY_ATTEMPT_FAILED",
            NormalizedStatus::Delivered => "DELIVERED",
            NormalizedStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for NormalizedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coordinate rejected by [`StandardLocation::new`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateError {
    Latitude(f64),
    Longitude(f64),
}

/// Carrier-agnostic position, in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StandardLocation {
    latitude: f64,
    longitude: f64,
}

impl StandardLocation {
    /// Build a location, rejecting non-finite values and anything outside
    /// -90..=90 latitude or -180..=180 longitude.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// The canonical shipment record handed to downstream services.
///
/// There is no public constructor: the only way to obtain one is a successful
/// call to [`ShipmentNormalizer::normalize`](crate::normalize::ShipmentNormalizer::normalize),
/// so every instance has passed adapter validation and status translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackItShipment {
    tracking_id: String,
    normalized_status: NormalizedStatus,
    friendly_status: String,
    current_location: StandardLocation,
    carrier_name: String,
    /// Seconds since the Unix epoch, taken when the record was normalized
    last_update: f64,
}

impl TrackItShipment {
    pub(crate) fn new(
        tracking_id: String,
        normalized_status: NormalizedStatus,
        friendly_status: String,
        current_location: StandardLocation,
        carrier_name: String,
        last_update: f64,
    ) -> Self {
        Self {
            tracking_id,
            normalized_status,
            friendly_status,
            current_location,
            carrier_name,
            last_update,
        }
    }

    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    pub fn normalized_status(&self) -> NormalizedStatus {
        self.normalized_status
    }

    pub fn friendly_status(&self) -> &str {
        &self.friendly_status
    }

    pub fn current_location(&self) -> StandardLocation {
        self.current_location
    }

    pub fn carrier_name(&self) -> &str {
        &self.carrier_name
    }

    pub fn last_update(&self) -> f64 {
        self.last_update
    }
}
