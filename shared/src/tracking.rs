use crate::core::{OrderError, TrackingApi};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug)]
pub struct HttpTrackingApi {
    http_client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct TrackRequest<'a> {
    tracking_number: &'a str,
    order_reference: &'a str,
}

impl HttpTrackingApi {
    pub fn new(http_client: Client, api_url: String, api_key: String) -> Self {
        Self {
            http_client,
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl TrackingApi for HttpTrackingApi {
    async fn track(
        &self,
        tracking_number: &str,
        order_reference: &str,
    ) -> Result<Value, OrderError> {
        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&TrackRequest {
                tracking_number,
                order_reference,
            })
            .send()
            .await
            .map_err(|e| {
                OrderError::ExternalService(format!("Cannot reach tracking API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrderError::ExternalService(format!(
                "Tracking API returned {} for {}",
                status, tracking_number
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| OrderError::ExternalService(format!("Invalid tracking response: {}", e)))
    }
}
