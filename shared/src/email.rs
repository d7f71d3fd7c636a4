use crate::core::{EmailMessage, EmailSender, OrderError, SentEmail};
use async_trait::async_trait;
use reqwest::Client;

pub const RESEND_EMAILS_URL: &str = "https://api.resend.com/emails";

/// Sends transactional email through the Resend HTTP API.
#[derive(Debug)]
pub struct ResendEmailSender {
    http_client: Client,
    api_key: String,
    endpoint: String,
}

impl ResendEmailSender {
    pub fn new(http_client: Client, api_key: String) -> Self {
        Self::with_endpoint(http_client, api_key, RESEND_EMAILS_URL.to_string())
    }

    pub fn with_endpoint(http_client: Client, api_key: String, endpoint: String) -> Self {
        Self {
            http_client,
            api_key,
            endpoint,
        }
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<SentEmail, OrderError> {
        if self.api_key.is_empty() {
            return Err(OrderError::ExternalService(
                "Resend API key not configured".to_string(),
            ));
        }

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| OrderError::ExternalService(format!("Resend request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OrderError::ExternalService(format!(
                "Resend returned {}: {}",
                status, text
            )));
        }

        response
            .json::<SentEmail>()
            .await
            .map_err(|e| OrderError::ExternalService(format!("Invalid Resend response: {}", e)))
    }
}
