// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::{
    body::{to_bytes, Body, HttpBody},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{debug, enabled, Level};

/// Bodies on these paths carry credentials or session tokens
const REDACTED_PATHS: &[&str] = &["/login", "/logout", "/api/auth/login", "/api/auth/logout"];

/// Upper bound on buffered request bodies; larger or unsized ones are passed
/// through unlogged
const MAX_LOGGED_BODY: usize = 64 * 1024;

fn is_redacted(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    REDACTED_PATHS.contains(&path)
}

fn fits_log_buffer(body: &Body) -> bool {
    body.size_hint()
        .upper()
        .map_or(false, |len| len <= MAX_LOGGED_BODY as u64)
}

fn render_body(bytes: &[u8]) -> Option<String> {
    let body_str = std::str::from_utf8(bytes).ok()?;
    Some(
        serde_json::from_str::<serde_json::Value>(body_str)
            .ok()
            .and_then(|json| serde_json::to_string_pretty(&json).ok())
            .unwrap_or_else(|| body_str.to_string()),
    )
}

/// Middleware to log request and response bodies when debug logging is on
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) || is_redacted(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    if !fits_log_buffer(&body) {
        debug!(method = %parts.method, uri = %parts.uri, "📥 Request (body not logged)");
        return Ok(next.run(Request::from_parts(parts, body)).await);
    }

    let bytes = to_bytes(body, MAX_LOGGED_BODY)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    if let Some(body) = render_body(&bytes).filter(|b| !b.is_empty()) {
        debug!(method = %parts.method, uri = %parts.uri, request_body = %body, "📥 Request");
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = render_body(&bytes).filter(|b| !b.is_empty()) {
        debug!(status = %parts.status, response_body = %body, "📤 Response");
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
