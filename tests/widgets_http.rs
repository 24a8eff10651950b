//! HTTP-level tests: the full actix app wired to in-memory upstreams.

use std::sync::{Arc, Mutex};

use actix_web::{http::StatusCode, test, web};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use storefront_widgets::config::AppConfig;
use storefront_widgets::domain::errors::WidgetError;
use storefront_widgets::domain::picklist::CartLine;
use storefront_widgets::domain::ports::{CartAddReceipt, CartApi, CatalogApi, DownloadsApi};
use storefront_widgets::{build_app, AppState};

struct FakeCatalog(Result<Value, WidgetError>);

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn product_modifiers(&self, _product_id: i64) -> Result<Value, WidgetError> {
        self.0.clone()
    }
}

#[derive(Default)]
struct FakeDownloads {
    calls: Mutex<Vec<(String, u32, u32)>>,
}

#[async_trait]
impl DownloadsApi for FakeDownloads {
    async fn orders_with_links(
        &self,
        identifier: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Value, WidgetError> {
        self.calls
            .lock()
            .unwrap()
            .push((identifier.to_string(), page, per_page));
        if page > 2 {
            return Ok(json!({ "success": true, "orders_with_links": [] }));
        }
        Ok(json!({
            "success": true,
            "orders_with_links": [{
                "order_id": 100,
                "order_number": "100",
                "date_created": "Tue, 20 Nov 2012 00:00:00 +0000",
                "download_links": [
                    { "sku": "X1", "product_title": "<script>alert(1)</script>" },
                    { "download_link": "/files/guide.pdf", "sku": "X2", "product_title": "Guide" }
                ]
            }],
            "pagination": { "current_page": page, "per_page": per_page },
            "orders_count": 7
        }))
    }
}

#[derive(Default)]
struct RecordingCart {
    added: Mutex<Vec<CartLine>>,
    reject_product: Option<i64>,
}

#[async_trait]
impl CartApi for RecordingCart {
    async fn add_item(&self, line: CartLine) -> Result<CartAddReceipt, WidgetError> {
        if self.reject_product == Some(line.product_id) {
            return Err(WidgetError::Submission("Only 1 left in stock".into()));
        }
        let mut added = self.added.lock().unwrap();
        added.push(line);
        Ok(CartAddReceipt {
            cart_item_id: Some(format!("item-{}", added.len())),
        })
    }
}

fn picklist_payload() -> Value {
    json!({
        "data": [{
            "modifier_details": {
                "modifier_type": "product_list_with_images",
                "modifier_id": 77,
                "modifier_display_name": "Bundle"
            },
            "products": [
                { "id": 1, "name": "Hardcover", "sku": "HC", "price": "20", "inventory_level": 4 },
                { "id": 2, "name": "Paperback", "sku": "PB", "price": 10, "inventory_level": 0 },
                { "id": 3, "name": "Audio MP3", "sku": "AU", "price": 5, "inventory_level": 0 }
            ]
        }]
    })
}

fn config() -> AppConfig {
    AppConfig::from_lookup(|name| match name {
        "API_BASE_URL" => Some("https://api.example.com".to_string()),
        "STOREFRONT_URL" => Some("https://shop.example.com".to_string()),
        _ => None,
    })
    .unwrap()
}

struct Harness {
    state: web::Data<AppState>,
    downloads: Arc<FakeDownloads>,
    cart: Arc<RecordingCart>,
}

fn harness(catalog: Result<Value, WidgetError>, cart: RecordingCart) -> Harness {
    let downloads = Arc::new(FakeDownloads::default());
    let cart = Arc::new(cart);
    let state = AppState::new(
        &config(),
        Arc::new(FakeCatalog(catalog)),
        downloads.clone(),
        cart.clone(),
    );
    Harness {
        state: web::Data::new(state),
        downloads,
        cart,
    }
}

fn header(resp: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>, name: &str) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[actix_web::test]
async fn picklist_renders_rows_and_view_id() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/picklist/99").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(header(&resp, "X-View-Id").is_some());
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();

    assert!(body.contains(r#"data-hidden-option-ids="77""#));
    assert!(body.contains("Hardcover"));
    assert!(body.contains("20.00"));
    assert!(body.contains("Out of stock"));
    assert!(body.contains(r#"name="qty[3]" value="0" data-min="0" data-max="9999" data-prevent-enter>"#));
}

#[actix_web::test]
async fn picklist_failure_renders_coming_soon() {
    let h = harness(
        Err(WidgetError::Network("connection refused".into())),
        RecordingCart::default(),
    );
    let app = test::init_service(build_app(h.state.clone())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/picklist/99").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Coming Soon..."));
    assert!(!body.contains("connection refused"));
}

#[actix_web::test]
async fn picklist_without_rows_renders_hidden_root() {
    let h = harness(Ok(json!({ "data": [] })), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/picklist/99").to_request()).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("data-picklist-empty"));
}

#[actix_web::test]
async fn quantity_changes_track_session_rows() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/picklist/99").to_request()).await;
    let view = header(&resp, "X-View-Id").unwrap();

    let update: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/picklist/99/quantity")
            .set_json(json!({ "view": view, "product_id": 1, "action": "set", "value": "9" }))
            .to_request(),
    )
    .await;
    assert_eq!(
        update,
        json!({ "product_id": 1, "qty": 9, "valid": false, "can_submit": false })
    );

    let update: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/picklist/99/quantity")
            .set_json(json!({ "view": view, "product_id": 1, "action": "inc", "value": "9" }))
            .to_request(),
    )
    .await;
    assert_eq!(
        update,
        json!({ "product_id": 1, "qty": 4, "valid": true, "can_submit": true })
    );
}

#[actix_web::test]
async fn out_of_stock_quantity_change_is_rejected() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/picklist/99").to_request()).await;
    let view = header(&resp, "X-View-Id").unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/picklist/99/quantity")
            .set_json(json!({ "view": view, "product_id": 2, "action": "inc", "value": "0" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn quantity_for_unknown_view_is_not_found() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/picklist/99/quantity")
            .set_json(json!({
                "view": "6f1c1d58-1c55-4d6e-9a0a-1f3f4c1a2b3c",
                "product_id": 1,
                "action": "inc",
                "value": "0"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn cart_submission_adds_selected_rows_in_order() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let report: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/picklist/99/cart")
            .set_json(json!({
                "quantities": [
                    { "product_id": 1, "value": "2" },
                    { "product_id": 2, "value": "0" },
                    { "product_id": 3, "value": "3" }
                ]
            }))
            .to_request(),
    )
    .await;

    assert_eq!(report["status"], "added");
    assert_eq!(report["refresh"], json!({ "kind": "preview", "cart_item_id": "item-2" }));
    assert_eq!(
        *h.cart.added.lock().unwrap(),
        vec![
            CartLine { product_id: 1, qty: 2 },
            CartLine { product_id: 3, qty: 3 },
        ]
    );
}

#[actix_web::test]
async fn cart_failure_stops_remaining_rows() {
    let h = harness(
        Ok(picklist_payload()),
        RecordingCart {
            reject_product: Some(1),
            ..Default::default()
        },
    );
    let app = test::init_service(build_app(h.state.clone())).await;

    let report: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/picklist/99/cart")
            .set_json(json!({
                "quantities": [
                    { "product_id": 1, "value": "2" },
                    { "product_id": 3, "value": "3" }
                ]
            }))
            .to_request(),
    )
    .await;

    assert_eq!(report["status"], "failed");
    assert_eq!(report["message"], "Only 1 left in stock");
    assert_eq!(report["steps"][1]["outcome"]["kind"], "not_attempted");
    assert!(h.cart.added.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn cart_rejects_out_of_bounds_quantity() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let report: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/picklist/99/cart")
            .set_json(json!({ "quantities": [{ "product_id": 1, "value": "50" }] }))
            .to_request(),
    )
    .await;

    assert_eq!(report["status"], "rejected");
    assert_eq!(report["field_errors"][0]["product_id"], 1);
    assert!(h.cart.added.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn downloads_render_table_for_resolved_customer() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/downloads?hidden_field_email=a%40b.com&data_email=other%40b.com")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "X-Fetch-Generation").as_deref(), Some("1"));
    assert_eq!(header(&resp, "X-Fetch-Stale"), None);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();

    assert!(body.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!body.contains("<script>"));
    assert!(body.contains(r#"href="https://api.example.com/files/guide.pdf""#));
    assert!(body.contains("https://api.example.com/account/download?data="));
    assert!(body.contains("Nov 20, 2012"));
    assert!(body.contains(r#"data-page="2">Next</button>"#));
    assert_eq!(
        *h.downloads.calls.lock().unwrap(),
        vec![("a@b.com".to_string(), 1, 5)]
    );
}

#[actix_web::test]
async fn downloads_without_identity_ask_to_sign_in() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/downloads").to_request()).await;
    let body = String::from_utf8(body.to_vec()).unwrap();

    assert!(body.contains("Please ensure you are logged in."));
    assert!(h.downloads.calls.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn later_pages_reuse_the_view_identity() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/downloads?customer_email=a%40b.com").to_request(),
    )
    .await;
    let view = header(&resp, "X-View-Id").unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/downloads?view={view}&page=2"))
            .to_request(),
    )
    .await;
    assert_eq!(header(&resp, "X-View-Id").as_deref(), Some(view.as_str()));
    assert_eq!(header(&resp, "X-Fetch-Generation").as_deref(), Some("2"));
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(r#"<button type="button" disabled>Next</button>"#));

    assert_eq!(
        h.downloads.calls.lock().unwrap()[1],
        ("a@b.com".to_string(), 2, 5)
    );
}

#[actix_web::test]
async fn page_past_the_end_offers_only_previous() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let body = test::call_and_read_body(
        &app,
        test::TestRequest::get()
            .uri("/downloads?customer_email=a%40b.com&page=3")
            .to_request(),
    )
    .await;
    let body = String::from_utf8(body.to_vec()).unwrap();

    assert!(body.contains("No more downloadable records available."));
    assert!(body.contains(r#"data-page="2">Previous</button>"#));
    assert!(!body.contains("Next"));
}

#[actix_web::test]
async fn openapi_document_lists_widget_routes() {
    let h = harness(Ok(picklist_payload()), RecordingCart::default());
    let app = test::init_service(build_app(h.state.clone())).await;

    let doc: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api-docs/openapi.json").to_request(),
    )
    .await;
    assert!(doc["paths"]["/downloads"].is_object());
    assert!(doc["paths"]["/picklist/{product_id}/cart"].is_object());
}
