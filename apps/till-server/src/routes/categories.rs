use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use till_core::{Category, CategoryInput};

use super::ApiJson;
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

/// 409 when a category with the same name (ignoring case) exists.
pub async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.db.categories().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
