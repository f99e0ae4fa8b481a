//! Request ID tracking and request logging

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::info;
use uuid::Uuid;

/// Request ID header name
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID middleware
///
/// Reuses a well-formed `x-request-id` from the client or generates one,
/// stores it in the request extensions and echoes it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

/// Request logging middleware
///
/// Logs completion at a level picked from the response status.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request.extensions().get::<Uuid>().copied();

    info!(
        request_id = ?request_id,
        method = %method,
        path = %path,
        "serving request"
    );

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    let status = response.status().as_u16();
    let duration_ms = elapsed.as_millis() as u64;
    macro_rules! completed {
        ($level:expr) => {
            tracing::event!(
                $level,
                request_id = ?request_id,
                method = %method,
                path = %path,
                status,
                duration_ms,
                "request completed"
            )
        };
    }
    match status {
        500..=599 => completed!(tracing::Level::ERROR),
        400..=499 => completed!(tracing::Level::WARN),
        _ => completed!(tracing::Level::INFO),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn echo_request_id(request: Request) -> String {
        request
            .extensions()
            .get::<Uuid>()
            .map(Uuid::to_string)
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let app = Router::new()
            .route("/", get(echo_request_id))
            .layer(middleware::from_fn(request_id_middleware));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(header).is_ok());
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let app = Router::new()
            .route("/", get(echo_request_id))
            .layer(middleware::from_fn(logging_middleware))
            .layer(middleware::from_fn(request_id_middleware));
        let id = Uuid::new_v4();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(X_REQUEST_ID, id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), &id.to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, id.to_string().as_bytes());
    }
}
