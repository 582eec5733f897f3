use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use pinorama_types::{
    BulkResponse, HealthResponse, Introspection, PersistResponse, SearchParams, SearchResponse,
};

use crate::{ServerError, ServerState};

type ApiResult<T> = Result<Json<T>, ServerError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ServerError::BadRequest(e.body_text()))
}

pub async fn bulk(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<Vec<Value>>, JsonRejection>,
) -> ApiResult<BulkResponse> {
    let records = body(payload)?;
    let index = state.index.clone();
    tokio::task::spawn_blocking(move || index.insert_many(records)).await??;
    Ok(Json(BulkResponse { success: true }))
}

pub async fn search(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SearchParams>, JsonRejection>,
) -> ApiResult<SearchResponse> {
    let params = body(payload)?;
    let index = state.index.clone();
    let response = tokio::task::spawn_blocking(move || index.search(&params)).await??;
    Ok(Json(response))
}

pub async fn introspection(State(state): State<Arc<ServerState>>) -> Json<Introspection> {
    Json(state.introspection.clone())
}

pub async fn styles(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        state.stylesheet.clone(),
    )
}

pub async fn clear(State(state): State<Arc<ServerState>>) -> ApiResult<BulkResponse> {
    let index = state.index.clone();
    tokio::task::spawn_blocking(move || index.clear()).await??;
    Ok(Json(BulkResponse { success: true }))
}

pub async fn persist(State(state): State<Arc<ServerState>>) -> ApiResult<PersistResponse> {
    let documents = state.persist().await?;
    Ok(Json(PersistResponse {
        success: true,
        documents,
    }))
}

pub async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        documents: state.index.count(),
    })
}

pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
