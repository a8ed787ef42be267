use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

const MAX_BODY_LOG_SIZE: usize = 1024; // 1KB limit for body logging
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogSettings {
    pub log_body: bool,
}

/// Only bodies with a declared length within the log limit are buffered.
fn loggable_body_len(req: &Request) -> Option<usize> {
    req.headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse::<usize>()
        .ok()
        .filter(|len| *len <= MAX_BODY_LOG_SIZE)
}

fn describe_body(bytes: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(json) => {
            let sanitized = crate::utils::sanitize::sanitize_json(&json);
            serde_json::to_string(&sanitized).unwrap_or_else(|_| "[invalid json]".to_string())
        }
        Err(_) if bytes.is_empty() => String::new(),
        Err(_) => format!("[non-json, {} bytes]", bytes.len()),
    }
}

pub async fn request_logger_middleware(
    State(settings): State<RequestLogSettings>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let header_value = HeaderValue::from_str(&request_id).ok();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    // Insert request ID into headers for downstream handlers
    if let Some(value) = header_value.clone() {
        req.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    if settings.log_body {
        match loggable_body_len(&req) {
            Some(_) => {
                let (parts, body) = req.into_parts();
                match axum::body::to_bytes(body, MAX_BODY_LOG_SIZE).await {
                    Ok(bytes) => {
                        tracing::info!(
                            request_id = %request_id,
                            method = %method,
                            uri = %uri,
                            body_size = bytes.len(),
                            body = %describe_body(&bytes),
                            "Incoming request"
                        );
                        req = Request::from_parts(parts, Body::from(bytes));
                    }
                    Err(e) => {
                        // The body no longer exists; let the handler see an empty one.
                        tracing::warn!(
                            request_id = %request_id,
                            method = %method,
                            uri = %uri,
                            error = %e,
                            "Failed to read request body"
                        );
                        req = Request::from_parts(parts, Body::empty());
                    }
                }
            }
            None => {
                tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    uri = %uri,
                    body = "[body too large or unsized, not logged]",
                    "Incoming request"
                );
            }
        }
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            "Incoming request"
        );
    }

    let response = next.run(req).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = latency.as_millis(),
        "Outgoing response"
    );

    let (mut parts, body) = response.into_parts();
    if let Some(value) = header_value {
        parts.headers.insert(REQUEST_ID_HEADER, value);
    }

    Response::from_parts(parts, body)
}
