use figment::providers::{Env, Format, Json, Serialized};
use figment::Figment;
use lambda_http::tracing;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableNames {
    pub orders: String,
    pub order_items: String,
    pub products: String,
    pub tracking_history: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            orders: "orders".to_string(),
            order_items: "order_items".to_string(),
            products: "products".to_string(),
            tracking_history: "tracking_history".to_string(),
        }
    }
}

/// Bank details printed on the order confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAccount {
    pub account_name: String,
    pub bank: String,
    pub account_number: String,
}

impl Default for PaymentAccount {
    fn default() -> Self {
        Self {
            account_name: "Mosh Apparels Ventures".to_string(),
            bank: "OPay".to_string(),
            account_number: "6142257816".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    pub brand_name: String,
    pub orders_from: String,
    pub updates_from: String,
    pub onboarding_from: String,
    pub reply_to: Option<String>,
    pub site_url: String,
    pub footer_address: String,
    pub payment_account: PaymentAccount,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            brand_name: "Mosh Apparels".to_string(),
            orders_from: "Mosh Apparels <noreply@moshapparels.com>".to_string(),
            updates_from: "Mosh Apparels <orders@resend.dev>".to_string(),
            onboarding_from: "Mosh Apparels <onboarding@resend.dev>".to_string(),
            reply_to: Some("moshapparelsofficial@gmail.com".to_string()),
            site_url: "https://moshapparels.com".to_string(),
            footer_address: "9, Bolanle Awosika Street, Coca Cola Road, Oju Oore, Ota, Ogun State"
                .to_string(),
            payment_account: PaymentAccount::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSettings {
    pub api_url: String,
    pub api_key: String,
    pub number_prefix: String,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.deliverytracking.com/v1/track".to_string(),
            api_key: String::new(),
            number_prefix: "MOSH".to_string(),
        }
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub tables: TableNames,
    pub email: EmailSettings,
    pub resend_api_key: String,
    pub tracking: TrackingSettings,
    pub status_mailer_url: String,
    /// Sent as a bearer token to the status mailer when set.
    pub status_mailer_api_key: Option<String>,
}

impl Configuration {
    /// Defaults, then the Secrets Manager JSON when `SECRET_MANAGER_SECRET_ID`
    /// is set, then `APP_` environment variables (nested keys split on `__`,
    /// e.g. `APP_TABLES__ORDERS`).
    pub async fn load(
        secret_client: &aws_sdk_secretsmanager::Client,
    ) -> Result<Self, figment::Error> {
        let secret_config = match Configuration::load_from_secret_manager(secret_client).await {
            Ok(secret_config) => secret_config,
            Err(e) => {
                tracing::warn!("Failed to load configuration secret: {}", e);
                None
            }
        };

        let config: Configuration = Configuration::figment(secret_config.as_deref()).extract()?;
        tracing::info!("{}", config);
        Ok(config)
    }

    fn figment(secret_config: Option<&str>) -> Figment {
        let mut config = Figment::from(Serialized::defaults(Configuration::default()));
        if let Some(secret_config) = secret_config {
            config = config.merge(Json::string(secret_config));
        }
        // env is merged last so a single function can override a shared secret
        config.merge(Env::prefixed("APP_").split("__"))
    }

    async fn load_from_secret_manager(
        secret_client: &aws_sdk_secretsmanager::Client,
    ) -> Result<Option<String>, String> {
        let configuration_secret_id = match std::env::var("SECRET_MANAGER_SECRET_ID") {
            Ok(id) if !id.is_empty() => id,
            _ => return Ok(None),
        };

        let secret_value = secret_client
            .get_secret_value()
            .secret_id(configuration_secret_id)
            .send()
            .await
            .map_err(|e| format!("{:?}", e))?;

        Ok(secret_value.secret_string)
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Configuration {{ tables: {:?}, site_url: {}, tracking_api_url: {}, resend_api_key set: {}, tracking api_key set: {}, status_mailer_api_key set: {} }}",
            self.tables,
            self.email.site_url,
            self.tracking.api_url,
            !self.resend_api_key.is_empty(),
            !self.tracking.api_key.is_empty(),
            self.status_mailer_api_key.is_some(),
        )
    }
}
