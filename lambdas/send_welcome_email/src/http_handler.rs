use lambda_http::{http::StatusCode, tracing, Error, IntoResponse, Request};
use serde::Deserialize;
use shared::configuration::EmailSettings;
use shared::core::{EmailMessage, EmailSender};
use shared::templates;
use shared::utils::{
    error_response, is_preflight, json_body, preflight_response, success_response,
};

#[derive(Debug, Deserialize)]
pub struct WelcomeEmailRequest {
    pub email: String,
    pub name: Option<String>,
}

pub(crate) struct HandlerDeps<E: EmailSender> {
    pub email_sender: E,
    pub settings: EmailSettings,
}

pub(crate) async fn function_handler<E: EmailSender>(
    deps: &HandlerDeps<E>,
    event: Request,
) -> Result<impl IntoResponse, Error> {
    tracing::info!("Received event: {:?}", event);

    if is_preflight(&event) {
        return preflight_response();
    }

    let request = match json_body::<WelcomeEmailRequest>(&event) {
        Ok(Some(request)) if !request.email.trim().is_empty() => request,
        Ok(_) => return error_response(&StatusCode::BAD_REQUEST, "Missing email address"),
        Err(e) => {
            tracing::warn!("Invalid request body: {:?}", e);
            return error_response(&StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let rendered = templates::welcome(request.name.as_deref(), &deps.settings);
    let email = EmailMessage {
        from: deps.settings.onboarding_from.clone(),
        to: vec![request.email.trim().to_string()],
        reply_to: None,
        subject: rendered.subject,
        html: rendered.html,
    };

    match deps.email_sender.send_email(&email).await {
        Ok(sent) => {
            tracing::info!("Welcome email sent successfully: {:?}", sent);
            success_response(&sent)
        }
        Err(e) => {
            tracing::error!("Error sending welcome email: {}", e);
            error_response(&StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}
