use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::SimulationConfig;

/// Randomly delays requests to mimic a slow upstream carrier
pub struct LatencyInjector {
    probability: f64,
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl LatencyInjector {
    pub fn new(probability: f64, delay: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            probability: probability.clamp(0.0, 1.0),
            delay,
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.latency_probability,
            Duration::from_millis(config.latency_ms),
            config.seed,
        )
    }

    /// Never delays
    pub fn disabled() -> Self {
        Self::new(0.0, Duration::ZERO, Some(0))
    }

    /// Sleep for the configured delay with the configured probability.
    /// Returns whether a delay was applied.
    pub async fn maybe_delay(&self) -> bool {
        if self.probability <= 0.0 || self.delay.is_zero() {
            return false;
        }
        let hit = self.rng.lock().await.gen_bool(self.probability);
        if hit {
            debug!(delay_ms = self.delay.as_millis() as u64, "Injecting latency");
            tokio::time::sleep(self.delay).await;
        }
        hit
    }
}
