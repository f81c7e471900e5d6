//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Form fields whose values must never appear in the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated in
/// the `info` log and logged in full at the `debug` level. Password fields in
/// form submissions are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = body_to_text(body).await;

    let display_text = if is_form_submission(&parts.method, parts.headers.get(CONTENT_TYPE)) {
        REDACTED_FIELDS
            .iter()
            .fold(body_text.clone(), |text, field| {
                redact_field(&text, field)
            })
    } else {
        body_text.clone()
    };
    log_body(&format!("Received request: {parts:#?}"), &display_text);

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = body_to_text(body).await;
    log_body(&format!("Sending response: {parts:#?}"), &body_text);

    Response::from_parts(parts, body_text.into())
}

fn is_form_submission(method: &Method, content_type: Option<&HeaderValue>) -> bool {
    method == Method::POST
        && content_type == Some(&HeaderValue::from_static(
            "application/x-www-form-urlencoded",
        ))
}

/// Replace the value of `field_name` in the urlencoded `form_text` with asterisks.
fn redact_field(form_text: &str, field_name: &str) -> String {
    let prefix = format!("{field_name}=");
    let start = match form_text.find(&prefix) {
        Some(position) => position,
        None => return form_text.to_string(),
    };

    let end = form_text[start..]
        .find('&')
        .map(|offset| start + offset)
        .unwrap_or(form_text.len());

    form_text.replace(&form_text[start..end], &format!("{field_name}=********"))
}

async fn body_to_text(body: Body) -> String {
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    String::from_utf8_lossy(&body_bytes).to_string()
}

fn log_body(prefix: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{prefix}\nbody: {:}...", &body[..LOG_BODY_LENGTH_LIMIT]);
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{prefix}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod redact_field_tests {
    use super::redact_field;

    #[test]
    fn redacts_field_in_the_middle_of_a_form() {
        let form = "email=test%40test.com&password=hunter2&remember_me=on";

        let redacted = redact_field(form, "password");

        assert_eq!(
            redacted,
            "email=test%40test.com&password=********&remember_me=on"
        );
    }

    #[test]
    fn redacts_field_at_the_end_of_a_form() {
        let form = "email=test%40test.com&password=hunter2";

        let redacted = redact_field(form, "password");

        assert_eq!(redacted, "email=test%40test.com&password=********");
    }

    #[test]
    fn leaves_forms_without_the_field_alone() {
        let form = "email=test%40test.com&remember_me=on";

        assert_eq!(redact_field(form, "password"), form);
    }
}
