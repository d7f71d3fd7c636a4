use crate::sweep::{sweep_active_orders, sweep_order, HandlerDeps, TrackingOutcome};
use lambda_http::{http::StatusCode, tracing, Error, IntoResponse, Request};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::core::{OrderRepository, TrackingApi, TrackingNumberGenerator};
use shared::utils::{
    error_response, is_preflight, json_body, json_response, preflight_response,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SingleOrderResponse {
    success: bool,
    tracking_number: String,
    tracking_status: String,
    tracking_details: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SweepResponse {
    success: bool,
    updated_orders: usize,
    results: Vec<TrackingOutcome>,
}

/// With an `orderId` only that order is refreshed; an empty body sweeps every
/// pending or shipped order.
pub(crate) async fn function_handler<R, T, G>(
    deps: &HandlerDeps<R, T, G>,
    event: Request,
) -> Result<impl IntoResponse, Error>
where
    R: OrderRepository,
    T: TrackingApi,
    G: TrackingNumberGenerator,
{
    tracing::info!("Received event: {:?}", event);

    if is_preflight(&event) {
        return preflight_response();
    }

    // scheduled invocations arrive without a body
    let request = match json_body::<TrackingRequest>(&event) {
        Ok(request) => request.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Invalid request body: {:?}", e);
            return error_response(&StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    match request.order_id.filter(|id| !id.trim().is_empty()) {
        Some(order_id) => match sweep_order(deps, &order_id).await {
            Ok(outcome) => json_response(
                &StatusCode::OK,
                &SingleOrderResponse {
                    success: true,
                    tracking_number: outcome.tracking_number,
                    tracking_status: outcome.tracking_status,
                    tracking_details: outcome.tracking_details,
                },
            ),
            Err(e) => {
                tracing::error!("Error refreshing tracking for {}: {}", order_id, e);
                error_response(&StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
        },
        None => match sweep_active_orders(deps).await {
            Ok(results) => json_response(
                &StatusCode::OK,
                &SweepResponse {
                    success: true,
                    updated_orders: results.len(),
                    results,
                },
            ),
            Err(e) => {
                tracing::error!("Tracking sweep aborted: {}", e);
                error_response(&StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
        },
    }
}
