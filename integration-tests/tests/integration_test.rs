//! Runs against a deployed stack. Set `ENV` (and optionally `STACK_NAME`) and
//! run with `cargo test -- --ignored`.

use aws_sdk_cloudformation::types::Output;
use reqwest::Client;
use serde_json::{json, Value};
use shared::utils::CORS_ALLOW_ORIGIN;
use std::env;

fn http_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap()
}

#[tokio::test]
#[ignore]
async fn when_preflight_sent_should_return_cors_headers() {
    let api_endpoint = retrieve_api_endpoint().await;

    let response = http_client()
        .request(reqwest::Method::OPTIONS, format!("{}send-welcome-email", api_endpoint))
        .send()
        .await
        .expect("Preflight request should succeed");

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["Access-Control-Allow-Origin"],
        CORS_ALLOW_ORIGIN
    );
}

#[tokio::test]
#[ignore]
async fn when_tracking_unknown_order_should_return_500_not_found() {
    let api_endpoint = retrieve_api_endpoint().await;

    let response = http_client()
        .post(format!("{}delivery-tracking", api_endpoint))
        .header("Content-Type", "application/json")
        .body(json!({"orderId": "integration-test-missing-order"}).to_string())
        .send()
        .await
        .expect("Tracking request should reach the function");

    assert_eq!(response.status(), 500);
    let body: Value = serde_json::from_str(response.text().await.unwrap().as_str())
        .expect("Error response should be JSON");
    assert_eq!(body, json!({"error": "Order not found"}));
}

#[tokio::test]
#[ignore]
async fn when_confirming_unknown_order_should_return_500_not_found() {
    let api_endpoint = retrieve_api_endpoint().await;

    let response = http_client()
        .post(format!("{}send-order-confirmation", api_endpoint))
        .header("Content-Type", "application/json")
        .body(json!({"orderId": "integration-test-missing-order"}).to_string())
        .send()
        .await
        .expect("Confirmation request should reach the function");

    assert_eq!(response.status(), 500);
}

#[tokio::test]
#[ignore]
async fn when_updating_unknown_order_should_return_false() {
    let api_endpoint = retrieve_api_endpoint().await;

    let response = http_client()
        .post(format!("{}update-order-status", api_endpoint))
        .header("Content-Type", "application/json")
        .body(json!({"orderId": "integration-test-missing-order", "newStatus": "shipped"}).to_string())
        .send()
        .await
        .expect("Status update request should reach the function");

    assert_eq!(response.status(), 200);
    let body: Value = serde_json::from_str(response.text().await.unwrap().as_str()).unwrap();
    assert_eq!(body, json!(false));
}

#[tokio::test]
#[ignore]
async fn when_welcome_email_missing_address_should_return_400() {
    let api_endpoint = retrieve_api_endpoint().await;

    let response = http_client()
        .post(format!("{}send-welcome-email", api_endpoint))
        .header("Content-Type", "application/json")
        .body(json!({"name": "No Address"}).to_string())
        .send()
        .await
        .expect("Welcome request should reach the function");

    assert_eq!(response.status(), 400);
}

async fn retrieve_api_endpoint() -> String {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let cloudformation_client = aws_sdk_cloudformation::Client::new(&config);
    let stack_name = env::var("STACK_NAME").unwrap_or("order-notifications".to_string());
    let env = env::var("ENV")
        .expect("The current environment should be set using the 'ENV' environment variable");

    let get_stacks = cloudformation_client
        .describe_stacks()
        .set_stack_name(Some(stack_name.clone()))
        .send()
        .await
        .unwrap_or_else(|_| panic!("CloudFormation stack named {} should exist", stack_name));

    let outputs = get_stacks
        .stacks
        .expect("Get stack request should return an array")[0]
        .clone()
        .outputs
        .expect("The first stack in the get stacks response should have outputs");
    let api_outputs: Vec<Output> = outputs
        .into_iter()
        .filter(|output| {
            output.export_name.as_deref() == Some(format!("OrderNotificationsEndpoint-{}", env).as_str())
        })
        .collect();

    api_outputs[0]
        .clone()
        .output_value
        .expect("CloudFormation stack should have an output named `OrderNotificationsEndpoint`")
}
