//! Route definitions for the API server

use crate::{handlers, middleware, models, state::AppState};
use axum::{middleware as axum_middleware, routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scopes API",
        description = "Access policies for the scopes users grant to clients"
    ),
    paths(
        handlers::health_check,
        handlers::create_scope,
        handlers::get_scope,
        handlers::update_scope,
        handlers::delete_scope,
        handlers::list_scopes,
    ),
    components(
        schemas(
            models::ScopeBody,
            models::ChangeBody,
            models::RequestError,
            models::Response,
            models::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "scopes", description = "Scope management"),
    )
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let scopes = get(handlers::list_scopes).post(handlers::create_scope);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi))
        .route("/v1", scopes.clone())
        .route("/v1/", scopes)
        .route(
            "/v1/:id",
            get(handlers::get_scope)
                .patch(handlers::update_scope)
                .delete(handlers::delete_scope),
        )
        .with_state(state)
        // Executed bottom to top
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use ed25519_dalek::SigningKey;
    use lockbox_scopes::InMemoryScopeStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        AppState::new(
            Arc::new(InMemoryScopeStore::new()),
            SigningKey::from_bytes(&[1; 32]).verifying_key(),
        )
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_openapi_json() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"].get("/v1/{id}").is_some());
    }

    #[tokio::test]
    async fn test_scope_routes_require_verification() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/v1/some-scope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
