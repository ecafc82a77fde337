//! HTTP-level tests driving the router with `oneshot`.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use till_db::{Database, DbConfig};
use till_server::{build_router, AppState, ServerConfig};

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let mut config = ServerConfig::default();
    config.store.name = "Meera Collections".to_string();
    build_router(AppState::new(db, config))
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Body>,
) -> (StatusCode, String, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder.body(body.unwrap_or_else(Body::empty)).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = body.map(|b| Body::from(serde_json::to_vec(&b).unwrap()));
    let (status, _, text) = send_raw(app, method, uri, body).await;
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, value)
}

/// Creates a product priced in whole rupees and returns its id.
async fn create_product(app: &Router, name: &str, cost: i64, price: i64, stock: i64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/products",
        Some(json!({
            "name": name,
            "brand": "Lakme",
            "cost_price": cost * 100,
            "sell_price": price * 100,
            "quantity": stock,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

/// 2 × ₹100 with ₹10 off each: subtotal 200, discount 20, total 180.
fn discounted_sale(product_id: &str) -> Value {
    json!({
        "items": [{
            "product_id": product_id,
            "quantity_sold": 2,
            "sell_price": 10_000,
            "unit_discount": 1_000,
            "total_price": 18_000,
        }],
        "total_amount": 18_000,
        "customer_name": "Asha",
        "customer_phone": "98765 43210",
        "customer_address": "Lucknow",
    })
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_checkout_with_discount() {
    let app = app().await;
    let id = create_product(&app, "Kajal", 60, 100, 5).await;

    let (status, sale) = send(&app, Method::POST, "/api/sales", Some(discounted_sale(&id))).await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["subtotal"], 20_000);
    assert_eq!(sale["discount"], 2_000);
    assert_eq!(sale["total_amount"], 18_000);
    assert!(sale["invoice_number"].as_str().unwrap().starts_with("INV-"));
    assert_eq!(sale["items"][0]["quantity_sold"], 2);
    assert_eq!(sale["items"][0]["total_price"], 18_000);
    assert_eq!(sale["items"][0]["product"]["name"], "Kajal");

    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(product["quantity"], 3);

    let sale_id = sale["id"].as_str().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/api/sales/{sale_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["invoice_number"], sale["invoice_number"]);
}

#[tokio::test]
async fn test_insufficient_stock_rejected() {
    let app = app().await;
    let id = create_product(&app, "Lipstick", 150, 250, 1).await;

    let request = json!({
        "items": [{ "product_id": id, "quantity_sold": 2, "sell_price": 25_000 }],
    });
    let (status, body) = send(&app, Method::POST, "/api/sales", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert!(body["message"].as_str().unwrap().contains("Lipstick"));

    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(product["quantity"], 1);

    let (_, sales) = send(&app, Method::GET, "/api/sales", None).await;
    assert_eq!(sales.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_total_mismatch_is_bad_request() {
    let app = app().await;
    let id = create_product(&app, "Kajal", 60, 100, 5).await;

    let mut request = discounted_sale(&id);
    request["total_amount"] = json!(20_000);
    let (status, body) = send(&app, Method::POST, "/api/sales", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "TOTAL_MISMATCH");

    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(product["quantity"], 5);
}

#[tokio::test]
async fn test_oversized_amounts_are_bad_request() {
    let app = app().await;
    let id = create_product(&app, "Kajal", 60, 100, 5).await;

    let request = json!({
        "items": [{
            "product_id": id,
            "quantity_sold": 3,
            "sell_price": 4_000_000_000_000_000_000_i64,
        }],
    });
    let (status, body) = send(&app, Method::POST, "/api/sales", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("sell_price"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "name": "Gold Set",
            "brand": "Tanishq",
            "cost_price": i64::MAX,
            "sell_price": i64::MAX,
            "quantity": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(product["quantity"], 5);
}

#[tokio::test]
async fn test_empty_cart_and_malformed_body() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/api/sales", Some(json!({ "items": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_CART");

    let (status, _, text) = send_raw(
        &app,
        Method::POST,
        "/api/sales",
        Some(Body::from("{\"items\": ")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_not_found_responses() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/products/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::GET, "/api/sales/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/products/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = json!({
        "items": [{ "product_id": "missing", "quantity_sold": 1, "sell_price": 100 }],
    });
    let (status, _) = send(&app, Method::POST, "/api/sales", Some(request)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_product_reads_as_null_in_sales() {
    let app = app().await;
    let id = create_product(&app, "Kajal", 60, 100, 5).await;
    let (status, _) = send(&app, Method::POST, "/api/sales", Some(discounted_sale(&id))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, sales) = send(&app, Method::GET, "/api/sales", None).await;
    assert_eq!(status, StatusCode::OK);
    let item = &sales[0]["items"][0];
    assert!(item["product"].is_null());
    assert_eq!(item["product_name"], "Kajal");
    assert_eq!(item["quantity_sold"], 2);
}

#[tokio::test]
async fn test_invoice_and_share_link() {
    let app = app().await;
    let id = create_product(&app, "Kajal", 60, 100, 5).await;
    let (_, sale) = send(&app, Method::POST, "/api/sales", Some(discounted_sale(&id))).await;
    let sale_id = sale["id"].as_str().unwrap();
    let number = sale["invoice_number"].as_str().unwrap();

    let (status, content_type, html) = send_raw(
        &app,
        Method::GET,
        &format!("/api/sales/{sale_id}/invoice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(html.contains(number));
    assert!(html.contains("Meera Collections"));
    assert!(html.contains("₹180.00"));
    assert!(html.contains("One hundred eighty rupees"));

    let (status, link) = send(
        &app,
        Method::GET,
        &format!("/api/sales/{sale_id}/share"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link["phone"], "919876543210");
    assert!(link["url"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/919876543210?text="));
    assert!(link["message"].as_str().unwrap().contains(number));
}

#[tokio::test]
async fn test_share_without_phone_is_rejected() {
    let app = app().await;
    let id = create_product(&app, "Kajal", 60, 100, 5).await;
    let request = json!({
        "items": [{ "product_id": id, "quantity_sold": 1, "sell_price": 10_000 }],
    });
    let (_, sale) = send(&app, Method::POST, "/api/sales", Some(request)).await;
    let sale_id = sale["id"].as_str().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/api/sales/{sale_id}/share"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PHONE");
}

#[tokio::test]
async fn test_dashboard_summary() {
    let app = app().await;

    let (_, empty) = send(&app, Method::GET, "/api/dashboard", None).await;
    assert_eq!(empty["sale_count"], 0);
    assert_eq!(empty["total_sales"], 0);
    assert_eq!(empty["profit_margin_bps"], 0);

    let id = create_product(&app, "Kajal", 60, 100, 5).await;
    send(&app, Method::POST, "/api/sales", Some(discounted_sale(&id))).await;

    let (status, summary) = send(&app, Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["sale_count"], 1);
    assert_eq!(summary["total_sales"], 18_000);
    assert_eq!(summary["total_cost"], 12_000);
    assert_eq!(summary["net_profit"], 6_000);
    assert_eq!(summary["profit_margin_bps"], 3_333);
    assert_eq!(summary["best_selling_products"][0]["name"], "Kajal");
    assert_eq!(summary["best_selling_products"][0]["quantity"], 2);
    assert_eq!(summary["sales_by_date"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_categories_reject_duplicates() {
    let app = app().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "Cosmetics" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Cosmetics");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "cosmetics" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");

    let (status, body) = send(&app, Method::POST, "/api/categories", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, list) = send(&app, Method::GET, "/api/categories", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_product_search_and_update() {
    let app = app().await;
    let (_, category) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "Kurtis" })),
    )
    .await;
    let kurti = create_product(&app, "Cotton Kurti", 300, 550, 4).await;
    create_product(&app, "Kajal", 60, 100, 5).await;

    let (_, found) = send(&app, Method::GET, "/api/products?q=kurti", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{kurti}"),
        Some(json!({
            "name": "Cotton Kurti",
            "brand": "Biba",
            "cost_price": 30_000,
            "sell_price": 60_000,
            "quantity": 10,
            "category_id": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["sell_price"], 60_000);
    assert_eq!(updated["category"]["name"], "Kurtis");

    let (_, by_category) = send(&app, Method::GET, "/api/products?q=kurtis", None).await;
    assert_eq!(by_category.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_supplier_lifecycle() {
    let app = app().await;

    let (status, supplier) = send(
        &app,
        Method::POST,
        "/api/suppliers",
        Some(json!({ "name": "Surat Textiles", "contact": "9800000001", "address": "Surat" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = supplier["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/suppliers/{id}"),
        Some(json!({ "name": "Surat Textiles Ltd", "address": "Ring Road, Surat" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Surat Textiles Ltd");

    let (_, found) = send(&app, Method::GET, "/api/suppliers?q=ring", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/suppliers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/suppliers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
