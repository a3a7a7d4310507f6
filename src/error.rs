use thiserror::Error;

/// Why a raw payload does not match the schema its adapter declares.
///
/// Fields nested inside objects are reported by dotted path (`ubicacion.latitud`);
/// a payload that is not an object at all is reported against the root, `$`.
///
/// Besides missing and mistyped fields there is a third kind, `OutOfRange`:
/// coordinates that parse as numbers but are non-finite or outside ±90 / ±180
/// are rejected here rather than passed through. Match on all three.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` has the wrong type, expected {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("field `{field}` is out of range: {value}")]
    OutOfRange { field: String, value: f64 },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::MissingField { field: field.into() }
    }

    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        ValidationError::WrongType {
            field: field.into(),
            expected,
        }
    }

    /// The offending field path.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::WrongType { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }

    /// Short label used for metrics and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingField { .. } => "missing_field",
            ValidationError::WrongType { .. } => "wrong_type",
            ValidationError::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// Every way a normalization call can fail. Both variants are caller errors and
/// recur identically on retry unless the input changes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("unrecognized carrier: {0}")]
    UnrecognizedCarrier(String),

    #[error("payload for carrier {carrier} failed validation: {source}")]
    ValidationFailed {
        carrier: String,
        #[source]
        source: ValidationError,
    },
}

impl NormalizeError {
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizeError::UnrecognizedCarrier(_) => "unrecognized_carrier",
            NormalizeError::ValidationFailed { .. } => "validation_failed",
        }
    }
}

#[derive(Error, Debug)]
pub enum TrackItError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Shipment {0} not found")]
    NotFound(String),

    #[error("Rate limit exceeded for client {0}")]
    RateLimited(String),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

pub type Result<T> = std::result::Result<T, TrackItError>;
