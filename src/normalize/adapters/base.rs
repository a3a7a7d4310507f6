use serde_json::{Map, Value};

use crate::domain::{CoordinateError, StandardLocation};
use crate::error::ValidationError;

/// Base trait for carrier-specific format adapters
pub trait CarrierAdapter: Send + Sync {
    /// Check a raw payload against this carrier's schema and return a typed view.
    /// Unrecognized fields are ignored.
    fn validate(&self, raw: &Value) -> Result<Box<dyn ShipmentView>, ValidationError>;

    /// Get the carrier identifier this adapter handles
    fn carrier_id(&self) -> &str;

    /// Get a human-readable name for this adapter
    fn name(&self) -> &str;
}

/// A validated, carrier-shaped payload. Accessors expose the carrier's fields
/// under format-neutral names so the dispatcher never needs to know the shape.
pub trait ShipmentView: Send + std::fmt::Debug {
    fn tracking_id(&self) -> &str;

    /// Status token exactly as the carrier sent it
    fn raw_status(&self) -> &str;

    fn progress_details(&self) -> &str;

    fn location(&self) -> StandardLocation;

    /// Human-readable rendering of the raw status, in the carrier's own language
    fn friendly_status(&self) -> String;
}

/// Typed access to the fields of one JSON object, with errors carrying the
/// dotted path of the offending field
pub struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    prefix: String,
}

impl<'a> FieldReader<'a> {
    /// Start reading at the payload root, which must be an object
    pub fn root(raw: &'a Value) -> Result<Self, ValidationError> {
        match raw.as_object() {
            Some(object) => Ok(Self {
                object,
                prefix: String::new(),
            }),
            None => Err(ValidationError::wrong_type("$", "an object")),
        }
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }

    fn required(&self, field: &str) -> Result<&'a Value, ValidationError> {
        self.object
            .get(field)
            .ok_or_else(|| ValidationError::missing(self.path(field)))
    }

    /// Descend into a nested object
    pub fn object(&self, field: &str) -> Result<FieldReader<'a>, ValidationError> {
        let object = self
            .required(field)?
            .as_object()
            .ok_or_else(|| ValidationError::wrong_type(self.path(field), "an object"))?;
        Ok(FieldReader {
            object,
            prefix: self.path(field),
        })
    }

    pub fn string(&self, field: &str) -> Result<&'a str, ValidationError> {
        self.required(field)?
            .as_str()
            .ok_or_else(|| ValidationError::wrong_type(self.path(field), "a string"))
    }

    /// A string that must carry content; blank counts as absent
    pub fn identifier(&self, field: &str) -> Result<&'a str, ValidationError> {
        let value = self.string(field)?;
        if value.trim().is_empty() {
            return Err(ValidationError::missing(self.path(field)));
        }
        Ok(value)
    }

    /// A float from a JSON number or from a string holding a numeric literal
    pub fn float(&self, field: &str) -> Result<f64, ValidationError> {
        let parsed = match self.required(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|v| v.is_finite())
            .ok_or_else(|| ValidationError::wrong_type(self.path(field), "a number"))
    }

    /// Read a latitude/longitude pair and range-check it
    pub fn location(
        &self,
        latitude_field: &str,
        longitude_field: &str,
    ) -> Result<StandardLocation, ValidationError> {
        let latitude = self.float(latitude_field)?;
        let longitude = self.float(longitude_field)?;
        StandardLocation::new(latitude, longitude).map_err(|e| match e {
            CoordinateError::Latitude(value) => ValidationError::OutOfRange {
                field: self.path(latitude_field),
                value,
            },
            CoordinateError::Longitude(value) => ValidationError::OutOfRange {
                field: self.path(longitude_field),
                value,
            },
        })
    }
}

/// Capitalize the first letter of every word and lowercase the rest, where a
/// word is any run of alphabetic characters
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
