//! Metrics for the TrackIt service
//!
//! Recording functions are grouped by the layer that emits them. Without an
//! installed recorder every call is a no-op, which is what tests rely on.

use std::fmt;
use std::net::SocketAddr;

use tracing::{info, warn};

use crate::domain::NormalizedStatus;
use crate::error::NormalizeError;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    NormalizeRecords,
    NormalizeFailures,
    NormalizeUnknownStatus,
    ApiRequests,
    ApiRateLimited,
    ApiInjectedLatency,
    StoreSize,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NormalizeRecords => "trackit_normalize_records_total",
            MetricName::NormalizeFailures => "trackit_normalize_failures_total",
            MetricName::NormalizeUnknownStatus => "trackit_normalize_unknown_status_total",
            MetricName::ApiRequests => "trackit_api_requests_total",
            MetricName::ApiRateLimited => "trackit_requests_rate_limited_total",
            MetricName::ApiInjectedLatency => "trackit_api_injected_latency_total",
            MetricName::StoreSize => "trackit_store_shipments",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        [
            MetricName::NormalizeRecords,
            MetricName::NormalizeFailures,
            MetricName::NormalizeUnknownStatus,
            MetricName::ApiRequests,
            MetricName::ApiRateLimited,
            MetricName::ApiInjectedLatency,
            MetricName::StoreSize,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus exporter, serving `/metrics` on `port`
pub fn init(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => info!(%addr, "Prometheus exporter listening"),
        Err(e) => warn!(%addr, error = %e, "Prometheus exporter install failed"),
    }
}

pub mod normalize {
    use super::*;

    /// Record a successful normalization
    pub fn record_normalized(carrier: &str, status: NormalizedStatus) {
        ::metrics::counter!(
            MetricName::NormalizeRecords.as_str(),
            "carrier" => carrier.to_string(),
            "status" => status.as_str()
        )
        .increment(1);

        if status == NormalizedStatus::Unknown {
            ::metrics::counter!(
                MetricName::NormalizeUnknownStatus.as_str(),
                "carrier" => carrier.to_string()
            )
            .increment(1);
        }
    }

    /// Record a rejected payload by failure kind
    pub fn record_failure(error: &NormalizeError) {
        ::metrics::counter!(MetricName::NormalizeFailures.as_str(), "kind" => error.kind())
            .increment(1);
    }
}

pub mod api {
    use super::*;

    pub fn request(route: &'static str) {
        ::metrics::counter!(MetricName::ApiRequests.as_str(), "route" => route).increment(1);
    }

    pub fn rate_limited() {
        ::metrics::counter!(MetricName::ApiRateLimited.as_str()).increment(1);
    }

    pub fn latency_injected() {
        ::metrics::counter!(MetricName::ApiInjectedLatency.as_str()).increment(1);
    }

    pub fn store_size(size: usize) {
        ::metrics::gauge!(MetricName::StoreSize.as_str()).set(size as f64);
    }
}
