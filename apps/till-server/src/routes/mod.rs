//! HTTP routes.
//!
//! | Method | Path                      | Handler                   |
//! |--------|---------------------------|---------------------------|
//! | GET    | /health                   | [`health::health`]        |
//! | GET    | /api/products?q=          | [`products::list`]        |
//! | POST   | /api/products             | [`products::create`]      |
//! | GET    | /api/products/:id         | [`products::get`]         |
//! | PUT    | /api/products/:id         | [`products::update`]      |
//! | DELETE | /api/products/:id         | [`products::delete`]      |
//! | GET    | /api/categories           | [`categories::list`]      |
//! | POST   | /api/categories           | [`categories::create`]    |
//! | GET    | /api/suppliers?q=         | [`suppliers::list`]       |
//! | POST   | /api/suppliers            | [`suppliers::create`]     |
//! | PUT    | /api/suppliers/:id        | [`suppliers::update`]     |
//! | DELETE | /api/suppliers/:id        | [`suppliers::delete`]     |
//! | GET    | /api/sales                | [`sales::list`]           |
//! | POST   | /api/sales                | [`sales::checkout`]       |
//! | GET    | /api/sales/:id            | [`sales::get`]            |
//! | GET    | /api/sales/:id/invoice    | [`sales::invoice`]        |
//! | GET    | /api/sales/:id/share      | [`sales::share`]          |
//! | GET    | /api/dashboard            | [`dashboard::summary`]    |

pub mod categories;
pub mod dashboard;
pub mod health;
pub mod products;
pub mod sales;
pub mod suppliers;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::routing::{get, put};
use axum::Router;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:id",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route("/api/suppliers", get(suppliers::list).post(suppliers::create))
        .route(
            "/api/suppliers/:id",
            put(suppliers::update).delete(suppliers::delete),
        )
        .route("/api/sales", get(sales::list).post(sales::checkout))
        .route("/api/sales/:id", get(sales::get))
        .route("/api/sales/:id/invoice", get(sales::invoice))
        .route("/api/sales/:id/share", get(sales::share))
        .route("/api/dashboard", get(dashboard::summary))
}

/// `?q=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Body of successful deletes.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
}

/// JSON body extractor whose rejections use the API error body.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}
