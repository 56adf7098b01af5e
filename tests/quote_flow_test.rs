mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, TestApp};
use printshop_api::entities::quote;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn quote_pricing_derives_unit_and_total() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Editorial Rio", "east").await;
    let product_id = app.seed_product(&customer_id, "Brochure").await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "customer_id": customer_id,
                "product_id": product_id,
                "quantity": 1000,
                "paper_cost": "100",
                "print_cost": "50",
                "margin": "30",
            })),
            StatusCode::CREATED,
        )
        .await;

    let quote = &body["data"];
    assert_eq!(decimal(&quote["unit_price"]), dec!(0.195));
    assert_eq!(decimal(&quote["total_price"]), dec!(195));
    assert_eq!(quote["status"], "draft");
    assert_eq!(quote["customer"]["name"], "Editorial Rio");
    assert_eq!(quote["product"]["internal_name"], "Brochure");
    assert!(quote["order"].is_null());
}

#[tokio::test]
async fn quote_rejects_bad_quantity_and_unknown_references() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Taller Este", "east").await;
    let product_id = app.seed_product(&customer_id, "Calendar").await;

    app.request_json(
        Method::POST,
        "/api/v1/quotes",
        Some(json!({
            "customer_id": customer_id,
            "product_id": product_id,
            "quantity": 0,
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    app.request_json(
        Method::POST,
        "/api/v1/quotes",
        Some(json!({
            "customer_id": "00000000-0000-0000-0000-000000000000",
            "product_id": product_id,
            "quantity": 10,
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    app.request_json(
        Method::POST,
        "/api/v1/quotes",
        Some(json!({
            "customer_id": customer_id,
            "product_id": "00000000-0000-0000-0000-000000000000",
            "quantity": 10,
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn quote_converts_to_order_exactly_once() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Vinoteca Andes", "west").await;
    let product_id = app.seed_product(&customer_id, "Wine label").await;

    let quote = app
        .request_json(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "customer_id": customer_id,
                "product_id": product_id,
                "quantity": 200,
                "paper_cost": "40",
                "print_cost": "10",
                "margin": "100",
            })),
            StatusCode::CREATED,
        )
        .await;
    let quote_id = quote["data"]["id"].as_str().unwrap().to_string();
    let convert_uri = format!("/api/v1/quotes/{}/convert", quote_id);

    let converted = app
        .request_json(Method::POST, &convert_uri, None, StatusCode::CREATED)
        .await;

    let order = &converted["data"];
    // base 50, unit 0.25, doubled by 100% margin, times 200
    assert_eq!(decimal(&order["total"]), dec!(100));
    assert_eq!(decimal(&order["balance"]), dec!(100));
    assert_eq!(order["status"], "requested");
    assert_eq!(order["quote_id"], quote["data"]["id"]);

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 200);
    assert_eq!(decimal(&items[0]["unit_price"]), dec!(0.5));
    assert_eq!(decimal(&items[0]["subtotal"]), dec!(100));

    let history = order["status_history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], "requested");

    // The quote is now approved and links back to the order
    let refreshed = app
        .request_json(
            Method::GET,
            &format!("/api/v1/quotes/{}", quote_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(refreshed["data"]["status"], "approved");
    assert_eq!(refreshed["data"]["order"]["id"], order["id"]);

    // A second conversion is refused
    app.request_json(Method::POST, &convert_uri, None, StatusCode::CONFLICT)
        .await;
}

#[tokio::test]
async fn converting_a_quote_without_a_product_fails_and_writes_nothing() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Museo Centro", "center").await;

    // The API always requires a product on quote creation, so seed the
    // product-less row directly
    let quote_id = Uuid::new_v4();
    quote::ActiveModel {
        id: Set(quote_id),
        customer_id: Set(customer_id.parse().unwrap()),
        product_id: Set(None),
        quantity: Set(50),
        paper_cost: Set(dec!(10)),
        print_cost: Set(dec!(0)),
        matrix_cost: Set(dec!(0)),
        other_cost: Set(dec!(0)),
        margin: Set(dec!(0)),
        unit_price: Set(dec!(0.2)),
        total_price: Set(dec!(10)),
        notes: Set(None),
        status: Set("draft".to_string()),
        ..Default::default()
    }
    .insert(&*app.state.db)
    .await
    .expect("failed to seed product-less quote");

    app.request_json(
        Method::POST,
        &format!("/api/v1/quotes/{}/convert", quote_id),
        None,
        StatusCode::BAD_REQUEST,
    )
    .await;

    // No order was created and the quote is untouched
    let orders = app
        .request_json(Method::GET, "/api/v1/orders", None, StatusCode::OK)
        .await;
    assert!(orders["data"].as_array().unwrap().is_empty());

    let refreshed = app
        .request_json(
            Method::GET,
            &format!("/api/v1/quotes/{}", quote_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(refreshed["data"]["status"], "draft");
    assert!(refreshed["data"]["order"].is_null());
}

#[tokio::test]
async fn converting_a_missing_quote_is_404() {
    let app = TestApp::new().await;
    app.request_json(
        Method::POST,
        "/api/v1/quotes/00000000-0000-0000-0000-000000000000/convert",
        None,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn quote_status_and_notes_can_be_patched() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Bar Astral", "north").await;
    let product_id = app.seed_product(&customer_id, "Coaster").await;

    let quote = app
        .request_json(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "customer_id": customer_id,
                "product_id": product_id,
                "quantity": 500,
                "paper_cost": "25",
            })),
            StatusCode::CREATED,
        )
        .await;
    let quote_id = quote["data"]["id"].as_str().unwrap();

    let updated = app
        .request_json(
            Method::PATCH,
            &format!("/api/v1/quotes/{}", quote_id),
            Some(json!({ "status": "rejected", "notes": "customer declined" })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["data"]["status"], "rejected");
    assert_eq!(updated["data"]["notes"], "customer declined");

    app.request_json(
        Method::PATCH,
        "/api/v1/quotes/00000000-0000-0000-0000-000000000000",
        Some(json!({ "notes": "nobody home" })),
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn quotes_list_newest_first_with_embeds() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Cine Plaza", "south").await;
    let product_id = app.seed_product(&customer_id, "Ticket roll").await;

    for quantity in [10, 20] {
        app.request_json(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "customer_id": customer_id,
                "product_id": product_id,
                "quantity": quantity,
                "paper_cost": "5",
            })),
            StatusCode::CREATED,
        )
        .await;
    }

    let list = app
        .request_json(Method::GET, "/api/v1/quotes", None, StatusCode::OK)
        .await;
    let quotes = list["data"].as_array().unwrap();
    assert_eq!(quotes.len(), 2);
    for quote in quotes {
        assert_eq!(quote["customer"]["name"], "Cine Plaza");
        assert_eq!(quote["product"]["internal_name"], "Ticket roll");
    }
}
