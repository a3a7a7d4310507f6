pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod rate_limiter;
pub mod server;

// Canonical shipment model and the normalization core
pub mod domain;
pub mod normalize;

// Service layers around the core
pub mod app;
pub mod infra;
pub mod observability;

pub use domain::{NormalizedStatus, StandardLocation, TrackItShipment};
pub use error::{NormalizeError, TrackItError, ValidationError};
pub use normalize::ShipmentNormalizer;
