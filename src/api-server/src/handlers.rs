use axum::{
    body::Bytes,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use lockbox_scopes::{sort_by_id, Scope};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::{ApiError, Result},
    models::*,
    state::AppState,
    verify::{verify_body, verify_header},
};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Create a scope
///
/// The request body is the signed JSON scope.
#[utoipa::path(
    post,
    path = "/v1/",
    request_body = ScopeBody,
    responses(
        (status = 201, description = "Scope created", body = Response),
        (status = 400, description = "Invalid scope or duplicate ID", body = Response),
        (status = 401, description = "Request could not be verified", body = Response),
        (status = 500, description = "Storage failure", body = Response)
    ),
    tag = "scopes"
)]
pub async fn create_scope(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Response>)> {
    let payload = verify_body(&state.verifying_key, &body)?;
    let scope = decode::<ScopeBody>(&payload)?
        .into_scope()
        .map_err(ApiError::BadRequest)?;

    if let Err(e) = state.store.create(scope.clone()).await {
        if e.is_already_exists() {
            return Err(ApiError::BadRequest(vec![RequestError::field("/id", CONFLICT)]));
        }
        return Err(e.into());
    }

    debug!(scope_id = %scope.id, "scope created");
    Ok((StatusCode::CREATED, Json(Response::scopes([scope]))))
}

/// Get a scope by ID
#[utoipa::path(
    get,
    path = "/v1/{id}",
    params(
        ("id" = String, Path, description = "Scope ID"),
        ("verification" = String, Header, description = "Signed `GET,{id}`")
    ),
    responses(
        (status = 200, description = "Scope", body = Response),
        (status = 401, description = "Request could not be verified", body = Response),
        (status = 404, description = "Scope not found", body = Response)
    ),
    tag = "scopes"
)]
pub async fn get_scope(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Response>> {
    verify_header(&state.verifying_key, &headers, &format!("GET,{}", id))?;

    let scope = fetch_one(&state, &id).await?;
    Ok(Json(Response::scopes([scope])))
}

/// Apply a change to a scope
///
/// The request body is the signed JSON change.
#[utoipa::path(
    patch,
    path = "/v1/{id}",
    params(
        ("id" = String, Path, description = "Scope ID")
    ),
    request_body = ChangeBody,
    responses(
        (status = 200, description = "Updated scope", body = Response),
        (status = 400, description = "Invalid change", body = Response),
        (status = 401, description = "Request could not be verified", body = Response),
        (status = 404, description = "Scope not found", body = Response)
    ),
    tag = "scopes"
)]
pub async fn update_scope(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Response>> {
    let payload = verify_body(&state.verifying_key, &body)?;
    let change = decode::<ChangeBody>(&payload)?
        .into_change()
        .map_err(ApiError::BadRequest)?;

    state.store.update(&id, &change).await?;
    debug!(scope_id = %id, "scope updated");

    let scope = fetch_one(&state, &id).await?;
    Ok(Json(Response::scopes([scope])))
}

/// Delete a scope, returning it as it was before deletion
#[utoipa::path(
    delete,
    path = "/v1/{id}",
    params(
        ("id" = String, Path, description = "Scope ID"),
        ("verification" = String, Header, description = "Signed `DELETE,{id}`")
    ),
    responses(
        (status = 200, description = "Deleted scope", body = Response),
        (status = 401, description = "Request could not be verified", body = Response),
        (status = 404, description = "Scope not found", body = Response)
    ),
    tag = "scopes"
)]
pub async fn delete_scope(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Response>> {
    verify_header(&state.verifying_key, &headers, &format!("DELETE,{}", id))?;

    let scope = fetch_one(&state, &id).await?;
    state.store.delete(&id).await?;
    debug!(scope_id = %id, "scope deleted");

    Ok(Json(Response::scopes([scope])))
}

/// Which scopes a list request asks for
#[derive(Debug, PartialEq, Eq)]
enum ListFilter {
    Default,
    Ids(Vec<String>),
}

impl ListFilter {
    /// Exactly one of `default=true` or one or more `id` params
    fn from_params(params: &[(String, String)]) -> Result<Self> {
        let default = params
            .iter()
            .find(|(key, _)| key == "default")
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty());
        let ids: Vec<String> = params
            .iter()
            .filter(|(key, _)| key == "id")
            .map(|(_, value)| value.clone())
            .collect();

        match default {
            Some(_) if !ids.is_empty() => Err(ApiError::BadRequest(vec![RequestError::param(
                "default,id",
                CONFLICT,
            )])),
            None if ids.is_empty() => Err(ApiError::BadRequest(vec![RequestError::param(
                "default", MISSING,
            )])),
            Some("true") => Ok(ListFilter::Default),
            Some(_) => Err(ApiError::BadRequest(vec![RequestError::param(
                "default",
                INVALID_VALUE,
            )])),
            None => Ok(ListFilter::Ids(ids)),
        }
    }
}

/// List default scopes, or the scopes with the given IDs
#[utoipa::path(
    get,
    path = "/v1/",
    params(
        ("default" = Option<String>, Query, description = "Must be `true` to list default scopes"),
        ("id" = Option<Vec<String>>, Query, description = "Scope IDs to fetch"),
        ("verification" = String, Header, description = "Signed `LIST,{raw query}`")
    ),
    responses(
        (status = 200, description = "Scopes, sorted by ID", body = Response),
        (status = 400, description = "Missing or conflicting filters", body = Response),
        (status = 401, description = "Request could not be verified", body = Response)
    ),
    tag = "scopes"
)]
pub async fn list_scopes(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<Response>> {
    let filter = ListFilter::from_params(&params)?;
    verify_header(
        &state.verifying_key,
        &headers,
        &format!("LIST,{}", raw_query.unwrap_or_default()),
    )?;

    let scopes = match filter {
        ListFilter::Default => state.store.list_default().await?,
        ListFilter::Ids(ids) => {
            let mut scopes: Vec<Scope> = state.store.get_multi(&ids).await?.into_values().collect();
            sort_by_id(&mut scopes);
            scopes
        }
    };

    debug!(count = scopes.len(), "scopes retrieved");
    Ok(Json(Response::scopes(scopes)))
}

async fn fetch_one(state: &AppState, id: &str) -> Result<Scope> {
    state
        .store
        .get_multi(&[id.to_string()])
        .await?
        .remove(id)
        .ok_or_else(|| ApiError::NotFound(RequestError::param("id", NOT_FOUND)))
}

fn decode<T: DeserializeOwned>(payload: &str) -> Result<T> {
    serde_json::from_str(payload).map_err(|e| {
        debug!(error = %e, "error decoding request body");
        ApiError::BadRequest(vec![RequestError::field("/", INVALID_FORMAT)])
    })
}
