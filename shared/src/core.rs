use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cuid2::CuidConstructor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use thiserror::Error;

#[cfg(any(test, feature = "mocks"))]
use mockall::{automock, predicate::*};

pub const PENDING_TRACKING_STATUS: &str = "pending";
pub const SHIPPED_STATUS: &str = "shipped";

/// Outcome of every side effect behind the seams below. Call sites decide
/// whether a given variant is fatal for their handler.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound,
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error("External service failure: {0}")]
    ExternalService(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait OrderRepository: Debug {
    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, OrderError>;
    async fn list_order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, OrderError>;
    async fn update_status(&self, order_id: &str, status: &str) -> Result<(), OrderError>;
    /// Stores the tracking number only if the order has none yet.
    /// Returns `false` when another writer got there first.
    async fn assign_tracking_number(
        &self,
        order_id: &str,
        tracking_number: &str,
    ) -> Result<bool, OrderError>;
    async fn update_tracking(
        &self,
        order_id: &str,
        update: &TrackingUpdate,
    ) -> Result<(), OrderError>;
    async fn list_orders_with_tracking_status(
        &self,
        statuses: Vec<String>,
    ) -> Result<Vec<Order>, OrderError>;
    async fn append_tracking_history(&self, entry: &TrackingHistoryEntry)
        -> Result<(), OrderError>;
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait EmailSender: Debug {
    async fn send_email(&self, email: &EmailMessage) -> Result<SentEmail, OrderError>;
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait TrackingApi: Debug {
    async fn track(&self, tracking_number: &str, order_reference: &str)
        -> Result<Value, OrderError>;
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait StatusNotifier: Debug {
    async fn notify_status_change(&self, order_id: &str, status: &str) -> Result<(), OrderError>;
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
pub trait TrackingNumberGenerator {
    fn generate_tracking_number(&self) -> String;
}

/// `{prefix}{unix millis}{random suffix}`, e.g. `MOSH1718000000000K3X9QA`.
pub struct TimestampTrackingNumberGenerator {
    prefix: String,
    suffix_gen: CuidConstructor,
}

impl TimestampTrackingNumberGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix_gen: CuidConstructor::new().with_length(6),
        }
    }
}

impl TrackingNumberGenerator for TimestampTrackingNumberGenerator {
    fn generate_tracking_number(&self) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            Utc::now().timestamp_millis(),
            self.suffix_gen.create_id().to_uppercase()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Order {
    pub id: String,
    pub order_number: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub total: f64,
    pub delivery_method: String,
    pub status: String,
    pub tracking_number: Option<String>,
    pub tracking_status: Option<String>,
    pub tracking_details: Option<Value>,
    pub tracking_updated_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Order {
    pub fn new(id: String, customer_name: String, customer_email: String) -> Self {
        Self {
            id,
            order_number: None,
            customer_name,
            customer_email,
            customer_phone: String::new(),
            customer_address: String::new(),
            total: 0.0,
            delivery_method: String::new(),
            status: PENDING_TRACKING_STATUS.to_string(),
            tracking_number: None,
            tracking_status: None,
            tracking_details: None,
            tracking_updated_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Human-facing reference: the order number, or the first 8 characters of the id.
    pub fn reference(&self) -> String {
        match self.order_number.as_deref() {
            Some(number) if !number.is_empty() => number.to_string(),
            _ => self.id.chars().take(8).collect(),
        }
    }

    pub fn delivery_method(&self) -> DeliveryMethod {
        DeliveryMethod::from(self.delivery_method.as_str())
    }

    pub fn existing_tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref().filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    Doorstep,
    Park,
    Store,
}

impl DeliveryMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMethod::Doorstep => "Doorstep Delivery",
            DeliveryMethod::Park => "Park/Terminal Pickup",
            DeliveryMethod::Store => "Store Pickup",
        }
    }
}

impl From<&str> for DeliveryMethod {
    fn from(raw: &str) -> Self {
        match raw {
            "doorstep" => DeliveryMethod::Doorstep,
            "park" => DeliveryMethod::Park,
            _ => DeliveryMethod::Store,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingUpdate {
    pub status: String,
    pub details: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingHistoryEntry {
    pub order_id: String,
    pub status: String,
    pub details: Option<Value>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Receipt returned by the email provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SentEmail {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusLabel {
    pub title: String,
    pub message: String,
    pub icon: String,
}

impl StatusLabel {
    fn new(title: &str, message: &str, icon: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Status keyword to email copy. Unknown keywords get a generic label.
#[derive(Debug, Clone)]
pub struct StatusCatalog {
    labels: HashMap<String, StatusLabel>,
}

impl StatusCatalog {
    pub fn new(labels: HashMap<String, StatusLabel>) -> Self {
        Self { labels }
    }

    pub fn label_for(&self, status: &str) -> StatusLabel {
        self.labels.get(status).cloned().unwrap_or_else(|| StatusLabel {
            title: "Order Status Update".to_string(),
            message: format!("Your order status has been updated to: {}", status),
            icon: "ℹ️".to_string(),
        })
    }
}

impl Default for StatusCatalog {
    fn default() -> Self {
        let labels = [
            (
                "confirmed",
                StatusLabel::new(
                    "Payment Confirmed",
                    "We've confirmed your payment! Your order is now being prepared.",
                    "✅",
                ),
            ),
            (
                "processing",
                StatusLabel::new(
                    "Order Processing",
                    "Your order is being carefully prepared for delivery.",
                    "📦",
                ),
            ),
            (
                SHIPPED_STATUS,
                StatusLabel::new(
                    "Order Shipped",
                    "Great news! Your order is on its way to you.",
                    "🚚",
                ),
            ),
            (
                "delivered",
                StatusLabel::new(
                    "Order Delivered",
                    "Your order has been delivered! We hope you love your new items.",
                    "🎉",
                ),
            ),
            (
                "cancelled",
                StatusLabel::new(
                    "Order Cancelled",
                    "Your order has been cancelled as requested. If this was a mistake, please contact us.",
                    "❌",
                ),
            ),
        ]
        .into_iter()
        .map(|(status, label)| (status.to_string(), label))
        .collect();

        Self::new(labels)
    }
}
