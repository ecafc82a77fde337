use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use till_core::{Supplier, SupplierInput};

use super::{ApiJson, Deleted, SearchParams};
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(state.db.suppliers().list(params.q.as_deref()).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<SupplierInput>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    let supplier = state.db.suppliers().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<SupplierInput>,
) -> ApiResult<Json<Supplier>> {
    Ok(Json(state.db.suppliers().update(&id, &input).await?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    state.db.suppliers().delete(&id).await?;
    Ok(Json(Deleted { success: true }))
}
