//! Route handlers for `/health` and `/api/bugs`.
//!
//! Gateway calls hit `SQLite` synchronously, so each one runs on the blocking
//! pool.

use crate::app::AppState;
use crate::error::ApiError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use bugtrack_core::{BugRecord, Gateway, GatewayError};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn list_bugs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BugRecord>>, ApiError> {
    let bugs = blocking(state.gateway, Gateway::list)
        .await
        .map_err(|err| ApiError::from_gateway(err, &headers))?;
    Ok(Json(bugs))
}

pub async fn create_bug(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BugRecord>), ApiError> {
    let result = match json_object(body) {
        Ok(draft) => blocking(state.gateway, move |gateway| gateway.create(&draft)).await,
        Err(err) => Err(err),
    };
    let record = result.map_err(|err| ApiError::from_gateway(err, &headers))?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BugRecord>, ApiError> {
    let result = match json_object(body) {
        Ok(draft) => blocking(state.gateway, move |gateway| gateway.update(&id, &draft)).await,
        Err(err) => Err(err),
    };
    let record = result.map_err(|err| ApiError::from_gateway(err, &headers))?;
    Ok(Json(record))
}

pub async fn delete_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    blocking(state.gateway, move |gateway| gateway.delete(&id))
        .await
        .map_err(|err| ApiError::from_gateway(err, &headers))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH`/`DELETE` on the collection path, where the id segment is empty.
pub async fn missing_id(headers: HeaderMap) -> ApiError {
    ApiError::from_gateway(GatewayError::MissingId, &headers)
}

pub async fn route_not_found(uri: Uri, headers: HeaderMap) -> ApiError {
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    ApiError::route_not_found(&path, &headers)
}

fn json_object(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, GatewayError> {
    match body {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(GatewayError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(rejection) => Err(GatewayError::BadRequest(rejection.body_text())),
    }
}

async fn blocking<T, F>(gateway: Gateway, op: F) -> Result<T, GatewayError>
where
    T: Send + 'static,
    F: FnOnce(&Gateway) -> Result<T, GatewayError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&gateway))
        .await
        .map_err(|err| GatewayError::Internal(format!("gateway task failed: {err}")))?
}
