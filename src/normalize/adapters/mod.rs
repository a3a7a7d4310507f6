// Base traits and field readers shared by carrier adapters
pub mod base;

// Individual adapter implementations
pub mod format_a;
pub mod format_b;

// Re-export the main components
pub use base::{CarrierAdapter, FieldReader, ShipmentView};
pub use format_a::{FormatAAdapter, FormatAShipment};
pub use format_b::{FormatBAdapter, FormatBShipment};
