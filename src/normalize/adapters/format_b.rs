use serde_json::Value;

use super::base::{CarrierAdapter, FieldReader, ShipmentView};
use crate::constants::{FORMAT_B_CARRIER, FORMAT_B_NAME};
use crate::domain::StandardLocation;
use crate::error::ValidationError;

/// Adapter for Format B payloads, which name fields in Spanish and nest the
/// position under `ubicacion`:
///
/// ```json
/// {"id_seguimiento": "TRACK0001", "estado": "En Tránsito", "detalles": "...",
///  "ubicacion": {"latitud": 6.3, "longitud": -75.6}}
/// ```
pub struct FormatBAdapter;

impl FormatBAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FormatBAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatBShipment {
    pub id_seguimiento: String,
    pub estado: String,
    pub detalles: String,
    pub ubicacion: StandardLocation,
}

impl ShipmentView for FormatBShipment {
    fn tracking_id(&self) -> &str {
        &self.id_seguimiento
    }

    fn raw_status(&self) -> &str {
        &self.estado
    }

    fn progress_details(&self) -> &str {
        &self.detalles
    }

    fn location(&self) -> StandardLocation {
        self.ubicacion
    }

    // Already natural-language text
    fn friendly_status(&self) -> String {
        self.estado.clone()
    }
}

impl CarrierAdapter for FormatBAdapter {
    fn validate(&self, raw: &Value) -> Result<Box<dyn ShipmentView>, ValidationError> {
        let fields = FieldReader::root(raw)?;

        let id_seguimiento = fields.identifier("id_seguimiento")?.to_string();
        let estado = fields.string("estado")?.to_string();
        let detalles = fields.string("detalles")?.to_string();
        let ubicacion = fields.object("ubicacion")?.location("latitud", "longitud")?;

        Ok(Box::new(FormatBShipment {
            id_seguimiento,
            estado,
            detalles,
            ubicacion,
        }))
    }

    fn carrier_id(&self) -> &str {
        FORMAT_B_CARRIER
    }

    fn name(&self) -> &str {
        FORMAT_B_NAME
    }
}
