mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn order_creation_seeds_balance_and_initial_history() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Bakery Delgado", "north").await;
    let flyer = app.seed_product(&customer_id, "A5 flyer").await;
    let card = app.seed_product(&customer_id, "Business card").await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "items": [
                    { "product_id": flyer, "quantity": 100, "unit_price": "1.50" },
                    { "product_id": card, "quantity": 200, "unit_price": "0.25" },
                ],
            })),
            StatusCode::CREATED,
        )
        .await;

    let order = &body["data"];
    assert_eq!(decimal(&order["total"]), dec!(200));
    assert_eq!(decimal(&order["balance"]), dec!(200));
    assert_eq!(order["paid"], false);
    assert_eq!(order["status"], "requested");

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(decimal(&items[0]["subtotal"]), dec!(150));
    assert_eq!(decimal(&items[1]["subtotal"]), dec!(50));

    let history = order["status_history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], "requested");
}

#[tokio::test]
async fn caller_supplied_total_is_stored_without_reconciliation() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Agencia Faro", "west").await;
    let product_id = app.seed_product(&customer_id, "Postcard").await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "total": "500",
                "items": [{ "product_id": product_id, "quantity": 10, "unit_price": "1.00" }],
            })),
            StatusCode::CREATED,
        )
        .await;

    // The declared total wins over the 10.00 the items add up to
    let order = &body["data"];
    assert_eq!(decimal(&order["total"]), dec!(500));
    assert_eq!(decimal(&order["balance"]), dec!(500));
    assert_eq!(decimal(&order["items"][0]["subtotal"]), dec!(10));
}

#[tokio::test]
async fn order_requires_existing_customer_and_items() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Cafe Central", "south").await;
    let product_id = app.seed_product(&customer_id, "Menu card").await;

    // No items
    app.request_json(
        Method::POST,
        "/api/v1/orders",
        Some(json!({ "customer_id": customer_id, "items": [] })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    // Unknown customer
    app.request_json(
        Method::POST,
        "/api/v1/orders",
        Some(json!({
            "customer_id": "00000000-0000-0000-0000-000000000000",
            "items": [{ "product_id": product_id, "quantity": 10, "unit_price": "1.00" }],
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    // Non-positive quantity
    app.request_json(
        Method::POST,
        "/api/v1/orders",
        Some(json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 0, "unit_price": "1.00" }],
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn payments_rederive_balance_until_settled() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Studio Norte", "west").await;
    let product_id = app.seed_product(&customer_id, "Poster").await;

    let order = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "items": [{ "product_id": product_id, "quantity": 100, "unit_price": "1.00" }],
            })),
            StatusCode::CREATED,
        )
        .await;
    let order_id = order["data"]["id"].as_str().unwrap().to_string();
    let payment_uri = format!("/api/v1/orders/{}/payment", order_id);
    let order_uri = format!("/api/v1/orders/{}", order_id);

    // Partial payment
    let payment = app
        .request_json(
            Method::POST,
            &payment_uri,
            Some(json!({ "amount": "40", "method": "cash" })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(payment["data"]["method"], "cash");

    let after_partial = app
        .request_json(Method::GET, &order_uri, None, StatusCode::OK)
        .await;
    assert_eq!(decimal(&after_partial["data"]["balance"]), dec!(60));
    assert_eq!(after_partial["data"]["paid"], false);

    // Second payment settles the order
    app.request_json(
        Method::POST,
        &payment_uri,
        Some(json!({ "amount": "60", "method": "transfer" })),
        StatusCode::CREATED,
    )
    .await;

    let settled = app
        .request_json(Method::GET, &order_uri, None, StatusCode::OK)
        .await;
    assert_eq!(decimal(&settled["data"]["balance"]), dec!(0));
    assert_eq!(settled["data"]["paid"], true);
    assert_eq!(settled["data"]["payments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn overpayment_clamps_balance_at_zero() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Kiosko Sur", "south").await;
    let product_id = app.seed_product(&customer_id, "Sticker sheet").await;

    let order = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "items": [{ "product_id": product_id, "quantity": 10, "unit_price": "5.00" }],
            })),
            StatusCode::CREATED,
        )
        .await;
    let order_id = order["data"]["id"].as_str().unwrap();

    app.request_json(
        Method::POST,
        &format!("/api/v1/orders/{}/payment", order_id),
        Some(json!({ "amount": "75", "method": "card" })),
        StatusCode::CREATED,
    )
    .await;

    let settled = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(decimal(&settled["data"]["balance"]), dec!(0));
    assert_eq!(settled["data"]["paid"], true);
}

#[tokio::test]
async fn payment_validation_and_missing_order() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Libreria Oeste", "west").await;
    let product_id = app.seed_product(&customer_id, "Notebook cover").await;

    let order = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "items": [{ "product_id": product_id, "quantity": 1, "unit_price": "10" }],
            })),
            StatusCode::CREATED,
        )
        .await;
    let order_id = order["data"]["id"].as_str().unwrap();
    let payment_uri = format!("/api/v1/orders/{}/payment", order_id);

    // Zero amount
    app.request_json(
        Method::POST,
        &payment_uri,
        Some(json!({ "amount": "0", "method": "cash" })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    // Unknown method
    app.request_json(
        Method::POST,
        &payment_uri,
        Some(json!({ "amount": "5", "method": "barter" })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    // Unknown order
    app.request_json(
        Method::POST,
        "/api/v1/orders/00000000-0000-0000-0000-000000000000/payment",
        Some(json!({ "amount": "5", "method": "cash" })),
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn status_changes_append_history_in_order() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Imprenta Delta", "east").await;
    let product_id = app.seed_product(&customer_id, "Letterhead").await;

    let order = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "items": [{ "product_id": product_id, "quantity": 500, "unit_price": "0.10" }],
            })),
            StatusCode::CREATED,
        )
        .await;
    let order_id = order["data"]["id"].as_str().unwrap();
    let order_uri = format!("/api/v1/orders/{}", order_id);

    for status in ["in_production", "ready", "delivered"] {
        app.request_json(
            Method::PATCH,
            &order_uri,
            Some(json!({ "status": status })),
            StatusCode::OK,
        )
        .await;
    }

    // Re-sending the current status must not add a row
    app.request_json(
        Method::PATCH,
        &order_uri,
        Some(json!({ "status": "delivered" })),
        StatusCode::OK,
    )
    .await;

    let detail = app
        .request_json(Method::GET, &order_uri, None, StatusCode::OK)
        .await;
    let history: Vec<&str> = detail["data"]["status_history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["status"].as_str().unwrap())
        .collect();
    assert_eq!(
        history,
        vec!["requested", "in_production", "ready", "delivered"]
    );
    assert_eq!(detail["data"]["status"], "delivered");
}

#[tokio::test]
async fn empty_status_is_rejected() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Panaderia Luz", "north").await;
    let product_id = app.seed_product(&customer_id, "Bread bag print").await;

    let order = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "items": [{ "product_id": product_id, "quantity": 10, "unit_price": "2" }],
            })),
            StatusCode::CREATED,
        )
        .await;
    let order_id = order["data"]["id"].as_str().unwrap();

    app.request_json(
        Method::PATCH,
        &format!("/api/v1/orders/{}", order_id),
        Some(json!({ "status": "  " })),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn list_orders_embeds_customer_and_get_missing_is_404() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Taller Sur", "south").await;
    let product_id = app.seed_product(&customer_id, "Banner").await;

    app.request_json(
        Method::POST,
        "/api/v1/orders",
        Some(json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 2, "unit_price": "30" }],
        })),
        StatusCode::CREATED,
    )
    .await;

    let list = app
        .request_json(Method::GET, "/api/v1/orders", None, StatusCode::OK)
        .await;
    let orders = list["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["customer"]["name"], "Taller Sur");

    app.request_json(
        Method::GET,
        "/api/v1/orders/00000000-0000-0000-0000-000000000000",
        None,
        StatusCode::NOT_FOUND,
    )
    .await;
}
