use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use till_core::{summarize, SalesSummary};

use crate::error::ApiResult;
use crate::AppState;

/// Aggregates the full sales history.
pub async fn summary(State(state): State<Arc<AppState>>) -> ApiResult<Json<SalesSummary>> {
    let sales = state.db.sales().list_with_items().await?;
    Ok(Json(summarize(&sales)))
}
