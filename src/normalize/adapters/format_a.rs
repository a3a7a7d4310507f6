use serde_json::Value;

use super::base::{title_case, CarrierAdapter, FieldReader, ShipmentView};
use crate::constants::{FORMAT_A_CARRIER, FORMAT_A_NAME};
use crate::domain::StandardLocation;
use crate::error::ValidationError;

/// Adapter for the flat Format A payload:
///
/// ```json
/// {"tracking_number": "TRACK0002", "status_code": "IN_TRANSIT",
///  "progress_details": "...", "location_lat": 34.0, "location_lng": -118.0}
/// ```
pub struct FormatAAdapter;

impl FormatAAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FormatAAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatAShipment {
    pub tracking_number: String,
    pub status_code: String,
    pub progress_details: String,
    pub location: StandardLocation,
}

impl ShipmentView for FormatAShipment {
    fn tracking_id(&self) -> &str {
        &self.tracking_number
    }

    fn raw_status(&self) -> &str {
        &self.status_code
    }

    fn progress_details(&self) -> &str {
        &self.progress_details
    }

    fn location(&self) -> StandardLocation {
        self.location
    }

    // Status codes are SHOUTING_SNAKE tokens; render them as words
    fn friendly_status(&self) -> String {
        title_case(&self.status_code.replace('_', " "))
    }
}

impl CarrierAdapter for FormatAAdapter {
    fn validate(&self, raw: &Value) -> Result<Box<dyn ShipmentView>, ValidationError> {
        let fields = FieldReader::root(raw)?;

        let shipment = FormatAShipment {
            tracking_number: fields.identifier("tracking_number")?.to_string(),
            status_code: fields.string("status_code")?.to_string(),
            progress_details: fields.string("progress_details")?.to_string(),
            location: fields.location("location_lat", "location_lng")?,
        };

        Ok(Box::new(shipment))
    }

    fn carrier_id(&self) -> &str {
        FORMAT_A_CARRIER
    }

    fn name(&self) -> &str {
        FORMAT_A_NAME
    }
}
