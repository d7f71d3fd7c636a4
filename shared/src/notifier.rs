use crate::core::{OrderError, StatusNotifier};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::json;

/// Triggers the status-update mailer function over its HTTP endpoint.
#[derive(Debug)]
pub struct HttpStatusNotifier {
    http_client: Client,
    mailer_url: String,
    api_key: Option<String>,
}

impl HttpStatusNotifier {
    pub fn new(http_client: Client, mailer_url: String, api_key: Option<String>) -> Self {
        Self {
            http_client,
            mailer_url,
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    fn request(&self, order_id: &str, status: &str) -> RequestBuilder {
        let request = self
            .http_client
            .post(&self.mailer_url)
            .json(&json!({ "orderId": order_id, "status": status }));

        match &self.api_key {
            Some(api_key) => request.bearer_auth(api_key),
            None => request,
        }
    }
}

#[async_trait]
impl StatusNotifier for HttpStatusNotifier {
    async fn notify_status_change(&self, order_id: &str, status: &str) -> Result<(), OrderError> {
        if self.mailer_url.is_empty() {
            return Err(OrderError::ExternalService(
                "Status mailer URL not configured".to_string(),
            ));
        }

        let response = self
            .request(order_id, status)
            .send()
            .await
            .map_err(|e| OrderError::ExternalService(format!("Status mailer unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status_code = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OrderError::ExternalService(format!(
                "Status mailer returned {}: {}",
                status_code, text
            )));
        }

        Ok(())
    }
}
