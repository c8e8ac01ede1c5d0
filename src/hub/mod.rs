//! Client for the hub's REST API.
//!
//! The gateway owns the shared HTTP client, base URL and token; the
//! sibling modules implement the two calls the sensor needs:
//! - `location`: `GET <base>/config`, with bounded retries
//! - `publisher`: `POST <base>/states/<entity_id>`

use reqwest::StatusCode;

mod location;
mod publisher;

pub use location::{HubLocation, RetryPolicy};

// ---

/// Base URL of the hub API as seen from inside the add-on container.
pub const DEFAULT_API_URL: &str = "http://supervisor/core/api";

/// Statuses the hub answers with when a call succeeded.
const SUCCESS_STATUSES: [StatusCode; 2] = [StatusCode::OK, StatusCode::CREATED];

#[derive(Debug, Clone)]
pub struct HubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HubClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        // ---
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

fn is_success(status: StatusCode) -> bool {
    SUCCESS_STATUSES.contains(&status)
}
