//! `GET <base>/config`: the hub's location and timezone.

use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{is_success, HubClient};
use crate::error::SyncError;

// ---

pub const DEFAULT_CONFIG_ATTEMPTS: u32 = 3;
pub const DEFAULT_CONFIG_DELAY: Duration = Duration::from_secs(1);

/// Geographic context every forecast timestamp depends on.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HubLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub time_zone: Tz,
}

/// Fixed-delay retry budget for the config fetch.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_CONFIG_ATTEMPTS,
            delay: DEFAULT_CONFIG_DELAY,
        }
    }
}

impl HubClient {
    /// Fetch the hub location, retrying any failure up to the policy's
    /// attempt count. Running out of attempts is fatal for the caller.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_location(&self, policy: RetryPolicy) -> Result<HubLocation, SyncError> {
        // ---
        for attempt in 1..=policy.attempts {
            match self.try_fetch_location().await {
                Ok(location) => {
                    info!(
                        "Found gps location {} {} ({})",
                        location.latitude, location.longitude, location.time_zone
                    );
                    return Ok(location);
                }
                Err(reason) => {
                    warn!(
                        "Hub config attempt {}/{} failed: {}",
                        attempt, policy.attempts, reason
                    );
                }
            }

            if attempt < policy.attempts {
                tokio::time::sleep(policy.delay).await;
            }
        }

        Err(SyncError::ConfigUnavailable {
            attempts: policy.attempts,
        })
    }

    async fn try_fetch_location(&self) -> Result<HubLocation, String> {
        // ---
        let url = format!("{}/config", self.base_url);
        debug!("Fetching hub config from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| format!("request error: {e}"))?;

        let status = response.status();
        if !is_success(status) {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{status}: {body}"));
        }

        response
            .json::<HubLocation>()
            .await
            .map_err(|e| format!("unexpected config body: {e}"))
    }
}
