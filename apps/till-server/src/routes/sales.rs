//! Checkout and sale history handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use till_core::{CreateSaleRequest, Invoice, SaleWithItems, ShareLink};

use super::ApiJson;
use crate::error::ApiResult;
use crate::AppState;

/// Runs the checkout transaction.
///
/// Rejections (insufficient stock, unknown product, totals that do not add
/// up) leave the catalog untouched.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<SaleWithItems>)> {
    let sale = state.db.sales().checkout(&request).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// All sales, newest first, with items and their products.
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<SaleWithItems>>> {
    Ok(Json(state.db.sales().list_with_items().await?))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleWithItems>> {
    Ok(Json(state.db.sales().get_with_items(&id).await?))
}

/// Printable HTML invoice.
pub async fn invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Html<String>> {
    let sale = state.db.sales().get_with_items(&id).await?;
    let invoice = Invoice::from_sale(&sale, &state.config.store);
    Ok(Html(invoice.render_html()))
}

/// WhatsApp deep link carrying the invoice summary to the customer.
pub async fn share(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ShareLink>> {
    let sale = state.db.sales().get_with_items(&id).await?;
    let invoice = Invoice::from_sale(&sale, &state.config.store);
    let link = invoice.share_link(&state.config.whatsapp_country_code)?;
    Ok(Json(link))
}
