//! Product catalog handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use till_core::{ProductDetail, ProductInput};

use super::{ApiJson, Deleted, SearchParams};
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<ProductDetail>>> {
    let products = state.db.products().list(params.q.as_deref()).await?;
    Ok(Json(products))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<(StatusCode, Json<ProductDetail>)> {
    let product = state.db.products().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductDetail>> {
    Ok(Json(state.db.products().get_detail(&id).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Json<ProductDetail>> {
    let product = state.db.products().update(&id, &input).await?;
    Ok(Json(product))
}

/// Past sales keep their lines; the product reads back as null there.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    state.db.products().delete(&id).await?;
    Ok(Json(Deleted { success: true }))
}
