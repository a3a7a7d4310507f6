/// Carrier identifier constants shared by the dispatcher, the mock carrier feed
/// and callers. Extending this set means registering a matching adapter.
pub const FORMAT_A_CARRIER: &str = "Format-A";
pub const FORMAT_B_CARRIER: &str = "Format-B";

// Human-readable adapter names
pub const FORMAT_A_NAME: &str = "Format A (flat, English status codes)";
pub const FORMAT_B_NAME: &str = "Format B (nested location, Spanish status text)";

/// Field the mock carrier feed tags each raw payload with. Removed before the
/// payload reaches the normalizer.
pub const CARRIER_FORMAT_FIELD: &str = "carrier_format";

/// Get all built-in carrier identifiers
pub fn get_supported_carriers() -> Vec<&'static str> {
    vec![FORMAT_A_CARRIER, FORMAT_B_CARRIER]
}
