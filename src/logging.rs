//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_DISPOSITION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The maximum number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The JSON fields whose values are never written to the log.
const REDACTED_FIELDS: [&str; 4] = ["password", "old_password", "new_password", "access_token"];

const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Secrets in JSON bodies are redacted, any other body is logged by size only
/// and headers are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    tracing::info!(
        "Received request: {} {}\nbody: {}",
        parts.method,
        parts.uri,
        describe_body(&parts.headers, &body_bytes)
    );
    log_full_body("request", &parts.headers, &body_bytes);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(
        "Sending response: {}\nbody: {}",
        parts.status,
        describe_body(&parts.headers, &body_bytes)
    );
    log_full_body("response", &parts.headers, &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

/// The text of a body as it should appear in the log.
///
/// Only bodies that parse as JSON are logged, with their secrets redacted,
/// whatever their content type claims. `None` for file downloads, binary data
/// and any text that is not valid JSON.
fn loggable_text(headers: &HeaderMap, body: &Bytes) -> Option<String> {
    if headers.contains_key(CONTENT_DISPOSITION) {
        return None;
    }

    if body.is_empty() {
        return Some(String::new());
    }

    let text = std::str::from_utf8(body).ok()?;

    redact_secrets(text)
}

fn describe_body(headers: &HeaderMap, body: &Bytes) -> String {
    match loggable_text(headers, body) {
        Some(text) if text.len() > LOG_BODY_LENGTH_LIMIT => {
            format!("{}...", truncate(&text, LOG_BODY_LENGTH_LIMIT))
        }
        Some(text) => format!("{text:?}"),
        None => format!("<{} bytes>", body.len()),
    }
}

fn log_full_body(direction: &str, headers: &HeaderMap, body: &Bytes) {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return;
    }

    if let Some(text) = loggable_text(headers, body) {
        tracing::debug!("Full {direction} body: {text:?}");
    }
}

/// Replace the values of [REDACTED_FIELDS] in a JSON document, `None` if
/// `json_text` is not valid JSON.
fn redact_secrets(json_text: &str) -> Option<String> {
    let mut value = serde_json::from_str::<Value>(json_text).ok()?;
    redact_value(&mut value);

    Some(value.to_string())
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::String(REDACTED_VALUE.to_owned());
                } else {
                    redact_value(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {}
    }
}

/// The longest prefix of `text` that is at most `max_bytes` long and ends on a character boundary.
fn truncate(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

#[cfg(test)]
mod logging_tests {
    use axum::{
        Json, Router,
        http::{HeaderMap, HeaderValue, header::CONTENT_TYPE},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{describe_body, logging_middleware, redact_secrets, truncate};

    #[test]
    fn redacts_password_fields() {
        let redacted = redact_secrets(
            r#"{"email":"foo@bar.baz","password":"hunter2","old_password":"a","new_password":"b"}"#,
        )
        .unwrap();
        let redacted: Value = serde_json::from_str(&redacted).unwrap();

        assert_eq!(
            redacted,
            json!({
                "email": "foo@bar.baz",
                "password": "********",
                "old_password": "********",
                "new_password": "********",
            })
        );
    }

    #[test]
    fn redacts_access_token() {
        let redacted =
            redact_secrets(r#"{"access_token":"eyJ.abc.def","token_type":"bearer"}"#).unwrap();

        assert!(!redacted.contains("eyJ"));
        assert!(redacted.contains("bearer"));
    }

    #[test]
    fn invalid_json_is_not_redactable() {
        assert_eq!(redact_secrets("not json"), None);
    }

    #[test]
    fn redacts_json_without_content_type() {
        let description = describe_body(
            &HeaderMap::new(),
            &axum::body::Bytes::from_static(br#"{"password":"hunter2"}"#),
        );

        assert!(!description.contains("hunter2"));
        assert!(description.contains("********"));
    }

    #[test]
    fn describes_malformed_json_by_length() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let body = br#"{"email":"a@b.c","password":"hunter2",}"#;

        let description = describe_body(&headers, &axum::body::Bytes::from_static(body));

        assert_eq!(description, format!("<{} bytes>", body.len()));
    }

    #[test]
    fn describes_plain_text_by_length() {
        let description = describe_body(
            &HeaderMap::new(),
            &axum::body::Bytes::from_static(b"password=hunter2"),
        );

        assert_eq!(description, "<16 bytes>");
    }

    #[test]
    fn describes_empty_body_as_empty_string() {
        assert_eq!(
            describe_body(&HeaderMap::new(), &axum::body::Bytes::new()),
            "\"\""
        );
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn describes_attachment_by_length() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-disposition",
            HeaderValue::from_static("attachment; filename=\"report.pdf\""),
        );

        assert_eq!(
            describe_body(&headers, &axum::body::Bytes::from_static(b"%PDF-1.3")),
            "<8 bytes>"
        );
    }

    #[test]
    fn describes_json_without_secrets() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let description = describe_body(
            &headers,
            &axum::body::Bytes::from_static(br#"{"password":"hunter2"}"#),
        );

        assert!(!description.contains("hunter2"));
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).unwrap();
        let body = json!({"email": "foo@bar.baz", "password": "hunter2"});

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), body);
    }
}
