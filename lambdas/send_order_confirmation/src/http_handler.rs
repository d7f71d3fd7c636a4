use lambda_http::{http::StatusCode, tracing, Error, IntoResponse, Request};
use serde::Deserialize;
use shared::configuration::EmailSettings;
use shared::core::{EmailMessage, EmailSender, OrderError, OrderRepository, SentEmail};
use shared::templates;
use shared::utils::{
    error_response, is_preflight, json_body, preflight_response, success_response,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmationRequest {
    pub order_id: String,
}

pub(crate) struct HandlerDeps<R: OrderRepository, E: EmailSender> {
    pub order_repo: R,
    pub email_sender: E,
    pub settings: EmailSettings,
}

pub(crate) async fn function_handler<R: OrderRepository, E: EmailSender>(
    deps: &HandlerDeps<R, E>,
    event: Request,
) -> Result<impl IntoResponse, Error> {
    tracing::info!("Received event: {:?}", event);

    if is_preflight(&event) {
        return preflight_response();
    }

    let request = match json_body::<OrderConfirmationRequest>(&event) {
        Ok(Some(request)) => request,
        Ok(None) => return error_response(&StatusCode::BAD_REQUEST, "Missing request body"),
        Err(e) => {
            tracing::warn!("Invalid request body: {:?}", e);
            return error_response(&StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    match send_order_confirmation(deps, &request.order_id).await {
        Ok(sent) => {
            tracing::info!("Order confirmation sent successfully: {:?}", sent);
            success_response(&sent)
        }
        Err(e) => {
            tracing::error!("Error sending order confirmation for {}: {}", request.order_id, e);
            error_response(&StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn send_order_confirmation<R: OrderRepository, E: EmailSender>(
    deps: &HandlerDeps<R, E>,
    order_id: &str,
) -> Result<SentEmail, OrderError> {
    let order = deps
        .order_repo
        .get_order(order_id)
        .await?
        .ok_or(OrderError::NotFound)?;
    let items = deps.order_repo.list_order_items(&order.id).await?;

    let rendered = templates::order_confirmation(&order, &items, &deps.settings);
    let email = EmailMessage {
        from: deps.settings.orders_from.clone(),
        to: vec![order.customer_email.clone()],
        reply_to: deps.settings.reply_to.clone(),
        subject: rendered.subject,
        html: rendered.html,
    };

    deps.email_sender.send_email(&email).await
}
