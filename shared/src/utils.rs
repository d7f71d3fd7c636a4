use lambda_http::http::{Method, StatusCode};
use lambda_http::{Body, Error, Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

pub fn is_preflight(event: &Request) -> bool {
    event.method() == Method::OPTIONS
}

/// Parses the body as JSON whatever the `Content-Type` header says. A blank
/// body is `Ok(None)`.
pub fn json_body<T: DeserializeOwned>(event: &Request) -> Result<Option<T>, serde_json::Error> {
    let bytes: &[u8] = event.body();
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes).map(Some)
}

pub fn preflight_response() -> Result<Response<Body>, Error> {
    empty_response(&StatusCode::OK)
}

pub fn empty_response(status: &StatusCode) -> Result<Response<Body>, Error> {
    let response = Response::builder()
        .status(status)
        .header("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN)
        .header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)
        .body(Body::Empty)
        .map_err(Box::new)?;

    Ok(response)
}

pub fn json_response<T: Serialize>(status: &StatusCode, body: &T) -> Result<Response<Body>, Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN)
        .header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)
        .body(Body::Text(serde_json::to_string(body)?))
        .map_err(Box::new)?;

    Ok(response)
}

pub fn error_response(status: &StatusCode, message: &str) -> Result<Response<Body>, Error> {
    json_response(status, &json!({ "error": message }))
}

pub fn success_response<T: Serialize>(data: &T) -> Result<Response<Body>, Error> {
    json_response(&StatusCode::OK, &json!({ "success": true, "data": data }))
}
