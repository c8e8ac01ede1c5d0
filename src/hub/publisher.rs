//! `POST <base>/states/<entity_id>`: push the sensor document.

use tracing::{debug, error, instrument};

use super::{is_success, HubClient};
use crate::error::PublishFailed;
use crate::models::SensorDocument;

// ---

impl HubClient {
    /// Push `doc` as the full entity state. One attempt, no retries; a
    /// refusal is logged and returned for the caller to act on.
    #[instrument(skip(self, doc), fields(state = %doc.state), level = "debug")]
    pub async fn publish(&self, entity_id: &str, doc: &SensorDocument) -> Result<(), PublishFailed> {
        // ---
        let url = format!("{}/states/{}", self.base_url, entity_id);

        let response = match self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Content-Type", "application/json")
            .json(doc)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Error sending sensor data to hub: {}", e);
                return Err(PublishFailed {
                    status: None,
                    body: e.to_string(),
                });
            }
        };

        let status = response.status();
        if is_success(status) {
            debug!("Hub accepted {} with {}", entity_id, status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!("Error sending sensor data to hub: {} - {}", status.as_u16(), body);
        Err(PublishFailed {
            status: Some(status.as_u16()),
            body,
        })
    }
}
