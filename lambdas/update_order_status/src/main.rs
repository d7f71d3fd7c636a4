use crate::http_handler::{function_handler, HandlerDeps};
use lambda_http::{run, service_fn, tracing, Error};
use shared::adapters::DynamoDbOrderRepository;
use shared::configuration::Configuration;
use shared::notifier::HttpStatusNotifier;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secret_client = aws_sdk_secretsmanager::Client::new(&aws_config);
    let config = Configuration::load(&secret_client).await?;

    let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws_config);
    let http_client = shared::Client::builder()
        .timeout(shared::HTTP_TIMEOUT)
        .build()?;

    let deps = HandlerDeps {
        order_repo: DynamoDbOrderRepository::new(config.tables, dynamodb_client),
        notifier: HttpStatusNotifier::new(
            http_client,
            config.status_mailer_url,
            config.status_mailer_api_key,
        ),
    };

    run(service_fn(|event| function_handler(&deps, event))).await
}
