use crate::configuration::TableNames;
use crate::core::{
    Order, OrderError, OrderItem, OrderRepository, TrackingHistoryEntry, TrackingUpdate,
    PENDING_TRACKING_STATUS,
};
use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug)]
pub struct DynamoDbOrderRepository {
    tables: TableNames,
    dynamodb_client: Client,
}

impl DynamoDbOrderRepository {
    pub fn new(tables: TableNames, dynamodb_client: Client) -> Self {
        Self {
            tables,
            dynamodb_client,
        }
    }

    async fn product_name(&self, product_id: &str) -> Result<Option<String>, OrderError> {
        let result = self
            .dynamodb_client
            .get_item()
            .table_name(&self.tables.products)
            .key("ProductId", AttributeValue::S(product_id.to_string()))
            .projection_expression("#name")
            .expression_attribute_names("#name", "Name")
            .send()
            .await
            .map_err(|e| OrderError::Persistence(format!("Error reading product: {:?}", e)))?;

        Ok(result
            .item
            .and_then(|item| item.get("Name").and_then(|v| v.as_s().ok().cloned())))
    }
}

#[async_trait]
impl OrderRepository for DynamoDbOrderRepository {
    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        let result = self
            .dynamodb_client
            .get_item()
            .table_name(&self.tables.orders)
            .key("OrderId", AttributeValue::S(order_id.to_string()))
            .send()
            .await
            .map_err(|e| OrderError::Persistence(format!("Error reading order: {:?}", e)))?;

        result.item.map(Order::try_from).transpose()
    }

    async fn list_order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, OrderError> {
        let result = self
            .dynamodb_client
            .query()
            .table_name(&self.tables.order_items)
            .key_condition_expression("OrderId = :order_id")
            .expression_attribute_values(":order_id", AttributeValue::S(order_id.to_string()))
            .send()
            .await
            .map_err(|e| OrderError::Persistence(format!("Error querying order items: {:?}", e)))?;

        let mut items = vec![];
        for record in result.items.unwrap_or_default() {
            let product_id = string_attr(&record, "ProductId")?;
            let product_name = self
                .product_name(&product_id)
                .await?
                .unwrap_or_else(|| product_id.clone());
            items.push(OrderItem {
                product_name,
                product_id,
                quantity: number_attr(&record, "Quantity")?,
                price: number_attr(&record, "Price")?,
            });
        }

        Ok(items)
    }

    async fn update_status(&self, order_id: &str, status: &str) -> Result<(), OrderError> {
        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.tables.orders)
            .key("OrderId", AttributeValue::S(order_id.to_string()))
            .update_expression("SET #status = :status, UpdatedAt = :now")
            .expression_attribute_names("#status", "Status")
            .expression_attribute_values(":status", AttributeValue::S(status.to_string()))
            .expression_attribute_values(":now", AttributeValue::S(Utc::now().to_rfc3339()))
            .condition_expression("attribute_exists(OrderId)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let generic_err_msg = format!("Error updating order status: {:?}", e);
                if e.into_service_error().is_conditional_check_failed_exception() {
                    Err(OrderError::NotFound)
                } else {
                    Err(OrderError::Persistence(generic_err_msg))
                }
            }
        }
    }

    async fn assign_tracking_number(
        &self,
        order_id: &str,
        tracking_number: &str,
    ) -> Result<bool, OrderError> {
        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.tables.orders)
            .key("OrderId", AttributeValue::S(order_id.to_string()))
            .update_expression("SET TrackingNumber = :tracking_number")
            .expression_attribute_values(
                ":tracking_number",
                AttributeValue::S(tracking_number.to_string()),
            )
            .expression_attribute_values(":empty", AttributeValue::S(String::new()))
            .condition_expression(
                "attribute_exists(OrderId) AND (attribute_not_exists(TrackingNumber) OR TrackingNumber = :empty)",
            )
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                let generic_err_msg = format!("Error assigning tracking number: {:?}", e);
                if e.into_service_error().is_conditional_check_failed_exception() {
                    Ok(false)
                } else {
                    Err(OrderError::Persistence(generic_err_msg))
                }
            }
        }
    }

    async fn update_tracking(
        &self,
        order_id: &str,
        update: &TrackingUpdate,
    ) -> Result<(), OrderError> {
        let mut update_expression =
            "SET TrackingStatus = :tracking_status, TrackingUpdatedAt = :updated_at".to_string();
        let mut update_item = self
            .dynamodb_client
            .update_item()
            .table_name(&self.tables.orders)
            .key("OrderId", AttributeValue::S(order_id.to_string()))
            .expression_attribute_values(
                ":tracking_status",
                AttributeValue::S(update.status.clone()),
            )
            .expression_attribute_values(
                ":updated_at",
                AttributeValue::S(update.updated_at.to_rfc3339()),
            );

        if let Some(details) = &update.details {
            update_expression.push_str(", TrackingDetails = :details");
            update_item = update_item
                .expression_attribute_values(":details", AttributeValue::S(details.to_string()));
        }

        update_item
            .update_expression(update_expression)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| OrderError::Persistence(format!("Error updating tracking: {:?}", e)))
    }

    async fn list_orders_with_tracking_status(
        &self,
        statuses: Vec<String>,
    ) -> Result<Vec<Order>, OrderError> {
        if statuses.is_empty() {
            return Ok(vec![]);
        }

        let placeholders: Vec<String> = (0..statuses.len()).map(|i| format!(":s{}", i)).collect();
        let filter_expression = tracking_status_filter(&statuses, &placeholders);

        let mut orders = vec![];
        let mut exclusive_start_key = None;
        loop {
            let mut scan = self
                .dynamodb_client
                .scan()
                .table_name(&self.tables.orders)
                .filter_expression(&filter_expression)
                .set_exclusive_start_key(exclusive_start_key);
            for (placeholder, status) in placeholders.iter().zip(statuses.iter()) {
                scan = scan.expression_attribute_values(placeholder, AttributeValue::S(status.clone()));
            }

            let result = scan
                .send()
                .await
                .map_err(|e| OrderError::Persistence(format!("Error executing scan: {:?}", e)))?;

            for item in result.items.unwrap_or_default() {
                orders.push(Order::try_from(item)?);
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        Ok(orders)
    }

    async fn append_tracking_history(
        &self,
        entry: &TrackingHistoryEntry,
    ) -> Result<(), OrderError> {
        let mut put_item = self
            .dynamodb_client
            .put_item()
            .table_name(&self.tables.tracking_history)
            .item("OrderId", AttributeValue::S(entry.order_id.clone()))
            .item("RecordedAt", AttributeValue::S(entry.recorded_at.to_rfc3339()))
            .item("Status", AttributeValue::S(entry.status.clone()));

        if let Some(details) = &entry.details {
            put_item = put_item.item("Details", AttributeValue::S(details.to_string()));
        }

        put_item
            .send()
            .await
            .map(|_| ())
            .map_err(|e| OrderError::Persistence(format!("Error adding history entry: {:?}", e)))
    }
}

/// Rows written before tracking started carry no `TrackingStatus` and count as pending.
fn tracking_status_filter(statuses: &[String], placeholders: &[String]) -> String {
    let in_clause = format!("TrackingStatus IN ({})", placeholders.join(", "));
    if statuses.iter().any(|s| s == PENDING_TRACKING_STATUS) {
        format!("attribute_not_exists(TrackingStatus) OR {}", in_clause)
    } else {
        in_clause
    }
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String, OrderError> {
    item.get(name)
        .ok_or_else(|| OrderError::InvalidRecord(format!("{} not found", name)))?
        .as_s()
        .map(|s| s.to_string())
        .map_err(|_| OrderError::InvalidRecord(format!("{} is not a String", name)))
}

fn optional_string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().map(|s| s.to_string()).ok())
}

fn number_attr<T: std::str::FromStr>(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<T, OrderError> {
    item.get(name)
        .ok_or_else(|| OrderError::InvalidRecord(format!("{} not found", name)))?
        .as_n()
        .map_err(|_| OrderError::InvalidRecord(format!("{} is not a number", name)))
        .and_then(|n| {
            n.parse::<T>()
                .map_err(|_| OrderError::InvalidRecord(format!("Cannot parse {}", name)))
        })
}

impl TryFrom<HashMap<String, AttributeValue>> for Order {
    type Error = OrderError;

    fn try_from(item: HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        // details that fail to parse are dropped rather than failing the whole order
        let tracking_details = optional_string_attr(&item, "TrackingDetails")
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());

        Ok(Order {
            id: string_attr(&item, "OrderId")?,
            order_number: optional_string_attr(&item, "OrderNumber"),
            customer_name: string_attr(&item, "CustomerName")?,
            customer_email: string_attr(&item, "CustomerEmail")?,
            customer_phone: optional_string_attr(&item, "CustomerPhone").unwrap_or_default(),
            customer_address: optional_string_attr(&item, "CustomerAddress").unwrap_or_default(),
            total: number_attr(&item, "Total")?,
            delivery_method: optional_string_attr(&item, "DeliveryMethod").unwrap_or_default(),
            status: optional_string_attr(&item, "Status").unwrap_or_default(),
            tracking_number: optional_string_attr(&item, "TrackingNumber"),
            tracking_status: optional_string_attr(&item, "TrackingStatus"),
            tracking_details,
            tracking_updated_at: optional_string_attr(&item, "TrackingUpdatedAt"),
            created_at: optional_string_attr(&item, "CreatedAt"),
            updated_at: optional_string_attr(&item, "UpdatedAt"),
        })
    }
}
