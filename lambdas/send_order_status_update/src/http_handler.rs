use lambda_http::{http::StatusCode, tracing, Error, IntoResponse, Request};
use serde::Deserialize;
use shared::configuration::EmailSettings;
use shared::core::{
    EmailMessage, EmailSender, OrderError, OrderRepository, SentEmail, StatusCatalog,
};
use shared::templates;
use shared::utils::{
    error_response, is_preflight, json_body, preflight_response, success_response,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub order_id: String,
    pub status: String,
}

pub(crate) struct HandlerDeps<R: OrderRepository, E: EmailSender> {
    pub order_repo: R,
    pub email_sender: E,
    pub status_catalog: StatusCatalog,
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

    let request = match json_body::<StatusUpdateRequest>(&event) {
        Ok(Some(request)) => request,
        Ok(None) => return error_response(&StatusCode::BAD_REQUEST, "Missing request body"),
        Err(e) => {
            tracing::warn!("Invalid request body: {:?}", e);
            return error_response(&StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    match send_status_update(deps, &request.order_id, &request.status).await {
        Ok(sent) => {
            tracing::info!("Status update email sent successfully: {:?}", sent);
            success_response(&sent)
        }
        Err(e) => {
            tracing::error!(
                "Error sending status update for {} ({}): {}",
                request.order_id,
                request.status,
                e
            );
            error_response(&StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn send_status_update<R: OrderRepository, E: EmailSender>(
    deps: &HandlerDeps<R, E>,
    order_id: &str,
    status: &str,
) -> Result<SentEmail, OrderError> {
    let order = deps
        .order_repo
        .get_order(order_id)
        .await?
        .ok_or(OrderError::NotFound)?;

    let label = deps.status_catalog.label_for(status);
    let rendered = templates::status_update(&order, status, &label, &deps.settings);
    let email = EmailMessage {
        from: deps.settings.updates_from.clone(),
        to: vec![order.customer_email.clone()],
        reply_to: None,
        subject: rendered.subject,
        html: rendered.html,
    };

    deps.email_sender.send_email(&email).await
}

#[cfg(test)]
mod tests {
    use super::{function_handler, HandlerDeps};
    use lambda_http::http::{Method, Request};
    use lambda_http::{Body, IntoResponse};
    use mockall::predicate::function;
    use serde_json::{json, Value};
    use shared::configuration::EmailSettings;
    use shared::core::{
        EmailMessage, MockEmailSender, MockOrderRepository, Order, OrderError, SentEmail,
        StatusCatalog,
    };

    fn order() -> Order {
        let mut order = Order::new(
            "5e6f7a8b-1111-2222-3333-444455556666".to_string(),
            "Ada Obi".to_string(),
            "ada@example.com".to_string(),
        );
        order.customer_address = "12 Marina Road, Lagos".to_string();
        order.total = 18000.0;
        order
    }

    fn deps(
        order_repo: MockOrderRepository,
        email_sender: MockEmailSender,
    ) -> HandlerDeps<MockOrderRepository, MockEmailSender> {
        HandlerDeps {
            order_repo,
            email_sender,
            status_catalog: StatusCatalog::default(),
            settings: EmailSettings::default(),
        }
    }

    fn request(order_id: &str, status: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .header("Content-Type", "application/json")
            .body(json!({"orderId": order_id, "status": status}).to_string().into())
            .unwrap()
    }

    async fn call(
        deps: &HandlerDeps<MockOrderRepository, MockEmailSender>,
        request: Request<Body>,
    ) -> (u16, Value) {
        let data = function_handler(deps, request)
            .await
            .unwrap()
            .into_response()
            .await;
        let status = data.status().as_u16();
        (status, serde_json::from_slice(data.body()).unwrap_or(Value::Null))
    }

    fn found(order_repo: &mut MockOrderRepository) {
        order_repo
            .expect_get_order()
            .times(1)
            .returning(|_| Ok(Some(order())));
    }

    #[tokio::test]
    async fn when_shipped_should_include_delivery_address() {
        let mut order_repo = MockOrderRepository::default();
        let mut email_sender = MockEmailSender::default();
        found(&mut order_repo);
        email_sender
            .expect_send_email()
            .with(function(|email: &EmailMessage| {
                email.subject == "🚚 Order Shipped - Order #5e6f7a8b"
                    && email.html.contains("Your order will be delivered to:")
                    && email.html.contains("12 Marina Road, Lagos")
                    && email.from == "Mosh Apparels <orders@resend.dev>"
            }))
            .times(1)
            .returning(|_| {
                Ok(SentEmail {
                    id: "email-9".to_string(),
                })
            });
        let deps = deps(order_repo, email_sender);

        let (status, body) = call(&deps, request("5e6f7a8b-1111", "shipped")).await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({"success": true, "data": {"id": "email-9"}}));
    }

    #[tokio::test]
    async fn when_confirmed_should_not_include_delivery_address() {
        let mut order_repo = MockOrderRepository::default();
        let mut email_sender = MockEmailSender::default();
        found(&mut order_repo);
        email_sender
            .expect_send_email()
            .with(function(|email: &EmailMessage| {
                email.subject == "✅ Payment Confirmed - Order #5e6f7a8b"
                    && !email.html.contains("Your order will be delivered to:")
            }))
            .times(1)
            .returning(|_| {
                Ok(SentEmail {
                    id: "email-10".to_string(),
                })
            });
        let deps = deps(order_repo, email_sender);

        let (status, _) = call(&deps, request("5e6f7a8b-1111", "confirmed")).await;

        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn when_status_unknown_should_send_generic_update() {
        let mut order_repo = MockOrderRepository::default();
        let mut email_sender = MockEmailSender::default();
        found(&mut order_repo);
        email_sender
            .expect_send_email()
            .with(function(|email: &EmailMessage| {
                email.subject.contains("Order Status Update")
                    && email
                        .html
                        .contains("Your order status has been updated to: returned")
                    && email.html.contains("RETURNED")
            }))
            .times(1)
            .returning(|_| {
                Ok(SentEmail {
                    id: "email-11".to_string(),
                })
            });
        let deps = deps(order_repo, email_sender);

        let (status, _) = call(&deps, request("5e6f7a8b-1111", "returned")).await;

        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn when_order_missing_should_fail_before_sending() {
        let mut order_repo = MockOrderRepository::default();
        let mut email_sender = MockEmailSender::default();
        order_repo
            .expect_get_order()
            .times(1)
            .returning(|_| Ok(None));
        email_sender.expect_send_email().times(0);
        let deps = deps(order_repo, email_sender);

        let (status, body) = call(&deps, request("missing", "shipped")).await;

        assert_eq!(status, 500);
        assert_eq!(body, json!({"error": "Order not found"}));
    }

    #[tokio::test]
    async fn when_lookup_fails_should_return_500() {
        let mut order_repo = MockOrderRepository::default();
        let mut email_sender = MockEmailSender::default();
        order_repo
            .expect_get_order()
            .times(1)
            .returning(|_| Err(OrderError::Persistence("throttled".to_string())));
        email_sender.expect_send_email().times(0);
        let deps = deps(order_repo, email_sender);

        let (status, _) = call(&deps, request("5e6f7a8b-1111", "shipped")).await;

        assert_eq!(status, 500);
    }

    #[tokio::test]
    async fn when_provider_fails_should_return_500() {
        let mut order_repo = MockOrderRepository::default();
        let mut email_sender = MockEmailSender::default();
        found(&mut order_repo);
        email_sender
            .expect_send_email()
            .times(1)
            .returning(|_| Err(OrderError::ExternalService("rate limited".to_string())));
        let deps = deps(order_repo, email_sender);

        let (status, body) = call(&deps, request("5e6f7a8b-1111", "delivered")).await;

        assert_eq!(status, 500);
        assert_eq!(body["error"], "External service failure: rate limited");
    }

    #[tokio::test]
    async fn when_status_field_missing_should_return_400() {
        let deps = deps(MockOrderRepository::default(), MockEmailSender::default());
        let request = Request::builder()
            .method(Method::POST)
            .header("Content-Type", "application/json")
            .body(json!({"orderId": "o1"}).to_string().into())
            .unwrap();

        let (status, _) = call(&deps, request).await;

        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn when_json_sent_without_content_type_should_still_send() {
        let mut order_repo = MockOrderRepository::default();
        let mut email_sender = MockEmailSender::default();
        found(&mut order_repo);
        email_sender.expect_send_email().times(1).returning(|_| {
            Ok(SentEmail {
                id: "email-12".to_string(),
            })
        });
        let deps = deps(order_repo, email_sender);
        let request = Request::builder()
            .method(Method::POST)
            .body(r#"{"orderId":"5e6f7a8b-1111","status":"processing"}"#.into())
            .unwrap();

        let (status, body) = call(&deps, request).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["id"], "email-12");
    }
}
