use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use shared::core::{
    Order, OrderError, OrderRepository, TrackingApi, TrackingHistoryEntry,
    TrackingNumberGenerator, TrackingUpdate, PENDING_TRACKING_STATUS, SHIPPED_STATUS,
};

pub(crate) struct HandlerDeps<R: OrderRepository, T: TrackingApi, G: TrackingNumberGenerator> {
    pub order_repo: R,
    pub tracking_api: T,
    pub tracking_numbers: G,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TrackingOutcome {
    pub order_id: String,
    pub tracking_number: String,
    pub tracking_status: String,
    #[serde(skip)]
    pub tracking_details: Option<Value>,
}

pub(crate) async fn sweep_order<R: OrderRepository, T: TrackingApi, G: TrackingNumberGenerator>(
    deps: &HandlerDeps<R, T, G>,
    order_id: &str,
) -> Result<TrackingOutcome, OrderError> {
    let order = deps
        .order_repo
        .get_order(order_id)
        .await?
        .ok_or(OrderError::NotFound)?;

    refresh_order(deps, order).await
}

/// Refreshes every order still pending or shipped, one at a time. The first
/// persistence failure stops the sweep.
pub(crate) async fn sweep_active_orders<
    R: OrderRepository,
    T: TrackingApi,
    G: TrackingNumberGenerator,
>(
    deps: &HandlerDeps<R, T, G>,
) -> Result<Vec<TrackingOutcome>, OrderError> {
    let orders = deps
        .order_repo
        .list_orders_with_tracking_status(vec![
            PENDING_TRACKING_STATUS.to_string(),
            SHIPPED_STATUS.to_string(),
        ])
        .await?;
    tracing::info!("Refreshing tracking for {} orders", orders.len());

    let mut outcomes = Vec::with_capacity(orders.len());
    for order in orders {
        outcomes.push(refresh_order(deps, order).await?);
    }

    Ok(outcomes)
}

#[tracing::instrument(skip(deps, order), fields(order_id = %order.id))]
async fn refresh_order<R: OrderRepository, T: TrackingApi, G: TrackingNumberGenerator>(
    deps: &HandlerDeps<R, T, G>,
    order: Order,
) -> Result<TrackingOutcome, OrderError> {
    let tracking_number = ensure_tracking_number(deps, &order).await?;

    let previous_status = order.tracking_status.clone();
    let mut tracking_status = previous_status
        .clone()
        .unwrap_or_else(|| PENDING_TRACKING_STATUS.to_string());
    let mut tracking_details = None;

    match deps
        .tracking_api
        .track(&tracking_number, &order.reference())
        .await
    {
        Ok(details) => {
            if let Some(status) = details
                .get("status")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
            {
                tracking_status = status.to_string();
            }
            tracking_details = Some(details);
        }
        Err(e) => {
            tracing::warn!(
                "Tracking API error for {}, keeping status {}: {}",
                tracking_number,
                tracking_status,
                e
            );
        }
    }

    let now = Utc::now();
    deps.order_repo
        .update_tracking(
            &order.id,
            &TrackingUpdate {
                status: tracking_status.clone(),
                details: tracking_details.clone(),
                updated_at: now,
            },
        )
        .await?;

    if previous_status.as_deref() != Some(tracking_status.as_str()) {
        deps.order_repo
            .append_tracking_history(&TrackingHistoryEntry {
                order_id: order.id.clone(),
                status: tracking_status.clone(),
                details: tracking_details.clone(),
                recorded_at: now,
            })
            .await?;
    }

    tracing::info!("Tracking updated for order {}: {}", order.id, tracking_status);

    Ok(TrackingOutcome {
        order_id: order.id,
        tracking_number,
        tracking_status,
        tracking_details,
    })
}

/// The number is persisted before the tracking API is called, so it survives
/// a failed lookup.
async fn ensure_tracking_number<R: OrderRepository, T: TrackingApi, G: TrackingNumberGenerator>(
    deps: &HandlerDeps<R, T, G>,
    order: &Order,
) -> Result<String, OrderError> {
    if let Some(existing) = order.existing_tracking_number() {
        return Ok(existing.to_string());
    }

    let candidate = deps.tracking_numbers.generate_tracking_number();
    if deps
        .order_repo
        .assign_tracking_number(&order.id, &candidate)
        .await?
    {
        tracing::info!("Assigned tracking number {} to order {}", candidate, order.id);
        return Ok(candidate);
    }

    // another sweep assigned one first
    let stored = deps
        .order_repo
        .get_order(&order.id)
        .await?
        .ok_or(OrderError::NotFound)?;

    stored
        .existing_tracking_number()
        .map(str::to_string)
        .ok_or_else(|| {
            OrderError::InvalidRecord(format!(
                "Order {} rejected tracking number assignment but has none stored",
                order.id
            ))
        })
}
