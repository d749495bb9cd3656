//! Logging middleware
//!
//! Records one span per HTTP request with its outcome and duration

use axum::{
    extract::Request,
    http::{HeaderMap, Method, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

/// Requests slower than this are logged as warnings
const SLOW_REQUEST: Duration = Duration::from_secs(5);

/// Request logging middleware
///
/// Answer generation over many questions is expected to be slow; the warning
/// only makes it visible in the logs.
pub async fn request_logging_middleware(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
    );

    async move {
        info!(
            "Request started: {} {} - Client: {}",
            method,
            uri,
            client_ip(&headers).unwrap_or("unknown")
        );

        if let Some(length) = content_length(&headers) {
            info!("Request body size: {} bytes", length);
        }

        let response = next.run(request).await;
        let duration = start_time.elapsed();
        log_completion(response.status(), duration);

        if duration > SLOW_REQUEST {
            warn!(
                "Slow request: {} {} - Duration: {:.2}s",
                method,
                uri,
                duration.as_secs_f64()
            );
        }

        response
    }
    .instrument(span)
    .await
}

fn log_completion(status: StatusCode, duration: Duration) {
    let millis = duration.as_secs_f64() * 1000.0;
    if status.is_client_error() {
        warn!("Client error: {} - Duration: {:.2}ms", status, millis);
    } else if status.is_server_error() {
        warn!("Server error: {} - Duration: {:.2}ms", status, millis);
    } else {
        info!("Request completed: {} - Duration: {:.2}ms", status, millis);
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// First address from the proxy forwarding headers
fn client_ip(headers: &HeaderMap) -> Option<&str> {
    ["x-forwarded-for", "x-real-ip"]
        .iter()
        .filter_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .filter_map(|value| value.split(',').next().map(str::trim))
        .find(|ip| !ip.is_empty() && *ip != "unknown")
}
