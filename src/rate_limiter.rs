use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::RateLimitConfig;
use crate::error::{Result, TrackItError};

/// Fixed-window request counter per client. Counters are cleared wholesale at
/// the end of each window by [`RateLimiter::spawn_reset_task`].
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    /// Requests allowed per window; 0 disables limiting
    limit: u32,
    window: Duration,
    counts: Mutex<HashMap<String, u32>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                limit,
                window,
                counts: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.requests_per_window,
            Duration::from_secs(config.window_secs),
        )
    }

    pub fn unlimited() -> Self {
        Self::new(0, Duration::from_secs(60))
    }

    /// Count one request from `client`, failing once it exceeds the window limit
    pub async fn check(&self, client: &str) -> Result<()> {
        if self.inner.limit == 0 {
            return Ok(());
        }
        let mut counts = self.inner.counts.lock().await;
        let count = counts.entry(client.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        if *count > self.inner.limit {
            return Err(TrackItError::RateLimited(client.to_string()));
        }
        Ok(())
    }

    /// Forget every client's count
    pub async fn reset(&self) {
        let mut counts = self.inner.counts.lock().await;
        debug!(clients = counts.len(), "Resetting rate limit window");
        counts.clear();
    }

    /// Clear all counters once per window, for as long as the task runs
    pub fn spawn_reset_task(&self) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(limiter.inner.window);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.reset().await;
            }
        })
    }
}
