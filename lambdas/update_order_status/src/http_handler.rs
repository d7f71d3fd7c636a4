use lambda_http::{http::StatusCode, tracing, Error, IntoResponse, Request};
use serde::Deserialize;
use shared::core::{OrderRepository, StatusNotifier};
use shared::utils::{
    error_response, is_preflight, json_body, json_response, preflight_response,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub order_id: String,
    pub new_status: String,
}

pub(crate) struct HandlerDeps<R: OrderRepository, N: StatusNotifier> {
    pub order_repo: R,
    pub notifier: N,
}

/// Responds with a bare JSON boolean: `true` once the status is stored,
/// `false` when the write failed.
pub(crate) async fn function_handler<R: OrderRepository, N: StatusNotifier>(
    deps: &HandlerDeps<R, N>,
    event: Request,
) -> Result<impl IntoResponse, Error> {
    tracing::info!("Received event: {:?}", event);

    if is_preflight(&event) {
        return preflight_response();
    }

    let request = match json_body::<UpdateOrderStatusRequest>(&event) {
        Ok(Some(request)) => request,
        Ok(None) => return error_response(&StatusCode::BAD_REQUEST, "Missing request body"),
        Err(e) => {
            tracing::warn!("Invalid request body: {:?}", e);
            return error_response(&StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let updated = update_order_status(deps, &request.order_id, &request.new_status).await;
    json_response(&StatusCode::OK, &updated)
}

async fn update_order_status<R: OrderRepository, N: StatusNotifier>(
    deps: &HandlerDeps<R, N>,
    order_id: &str,
    new_status: &str,
) -> bool {
    if let Err(e) = deps.order_repo.update_status(order_id, new_status).await {
        tracing::error!("Error updating order status for {}: {}", order_id, e);
        return false;
    }

    // the email is best-effort, the status change already happened
    if let Err(e) = deps
        .notifier
        .notify_status_change(order_id, new_status)
        .await
    {
        tracing::error!("Failed to send status update email for {}: {}", order_id, e);
    }

    tracing::info!("Order {} status updated to {}", order_id, new_status);
    true
}
