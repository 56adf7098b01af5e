mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn customer_crud_roundtrip() {
    let app = TestApp::new().await;

    let created = app
        .request_json(
            Method::POST,
            "/api/v1/customers",
            Some(json!({
                "name": "Hotel Mirador",
                "zone": "center",
                "phone": "555-0101",
                "email": "front@mirador.example",
            })),
            StatusCode::CREATED,
        )
        .await;
    let customer_id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["name"], "Hotel Mirador");

    let fetched = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}", customer_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(fetched["data"]["phone"], "555-0101");

    let updated = app
        .request_json(
            Method::PATCH,
            &format!("/api/v1/customers/{}", customer_id),
            Some(json!({ "name": "Hotel Mirador", "zone": "north" })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["data"]["zone"], "north");
    // Omitted optional fields are cleared by the full-payload update
    assert!(updated["data"]["phone"].is_null());

    app.request_json(
        Method::GET,
        "/api/v1/customers/00000000-0000-0000-0000-000000000000",
        None,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn customer_name_and_zone_are_required() {
    let app = TestApp::new().await;

    app.request_json(
        Method::POST,
        "/api/v1/customers",
        Some(json!({ "name": "", "zone": "north" })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    app.request_json(
        Method::POST,
        "/api/v1/customers",
        Some(json!({ "name": "No Zone SA", "zone": "" })),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn customers_list_sorted_by_name() {
    let app = TestApp::new().await;
    app.seed_customer("Zapateria Uno", "south").await;
    app.seed_customer("Almacen Dos", "north").await;

    let list = app
        .request_json(Method::GET, "/api/v1/customers", None, StatusCode::OK)
        .await;
    let names: Vec<&str> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Almacen Dos", "Zapateria Uno"]);
}

#[tokio::test]
async fn lookup_lists_create_and_delete() {
    let app = TestApp::new().await;

    let paper = app
        .request_json(
            Method::POST,
            "/api/v1/config/paper-types",
            Some(json!({ "name": "Coated 150g" })),
            StatusCode::CREATED,
        )
        .await;
    let paper_id = paper["data"]["id"].as_str().unwrap().to_string();

    app.request_json(
        Method::POST,
        "/api/v1/config/paper-types",
        Some(json!({ "name": "" })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let list = app
        .request_json(
            Method::GET,
            "/api/v1/config/paper-types",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    // Delete is idempotent
    for _ in 0..2 {
        let response = app
            .request(
                Method::DELETE,
                &format!("/api/v1/config/paper-types/{}", paper_id),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let empty = app
        .request_json(
            Method::GET,
            "/api/v1/config/paper-types",
            None,
            StatusCode::OK,
        )
        .await;
    assert!(empty["data"].as_array().unwrap().is_empty());

    let matrix = app
        .request_json(
            Method::POST,
            "/api/v1/config/matrix-sizes",
            Some(json!({ "name": "A3" })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(matrix["data"]["name"], "A3");
}

#[tokio::test]
async fn product_creation_requires_lookups_and_owner() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Verduleria Flor", "east").await;

    // Missing paper type / matrix size
    app.request_json(
        Method::POST,
        "/api/v1/products",
        Some(json!({
            "customer_id": customer_id,
            "internal_name": "Fruit bag print",
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let product_id = app.seed_product(&customer_id, "Fruit bag print").await;

    // Unknown customer
    app.request_json(
        Method::POST,
        "/api/v1/products",
        Some(json!({
            "customer_id": "00000000-0000-0000-0000-000000000000",
            "internal_name": "Orphan product",
            "paper_type_id": "00000000-0000-0000-0000-000000000000",
            "matrix_size_id": "00000000-0000-0000-0000-000000000000",
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let list = app
        .request_json(Method::GET, "/api/v1/products", None, StatusCode::OK)
        .await;
    let products = list["data"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], product_id);
    assert_eq!(products[0]["customer"]["name"], "Verduleria Flor");
    assert!(products[0]["paper_type"]["name"]
        .as_str()
        .unwrap()
        .starts_with("Paper for"));
}

#[tokio::test]
async fn product_listing_filters_by_customer() {
    let app = TestApp::new().await;
    let first = app.seed_customer("Heladeria Polo", "north").await;
    let second = app.seed_customer("Carniceria Sol", "south").await;
    app.seed_product(&first, "Cup sleeve").await;
    app.seed_product(&second, "Wrapping paper").await;

    let all = app
        .request_json(Method::GET, "/api/v1/products", None, StatusCode::OK)
        .await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    let filtered = app
        .request_json(
            Method::GET,
            &format!("/api/v1/products?customer_id={}", first),
            None,
            StatusCode::OK,
        )
        .await;
    let products = filtered["data"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["internal_name"], "Cup sleeve");
}

#[tokio::test]
async fn deleted_lookup_leaves_product_reference_null() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Panificadora Real", "west").await;
    let product_id = app.seed_product(&customer_id, "Box print").await;

    let list = app
        .request_json(Method::GET, "/api/v1/products", None, StatusCode::OK)
        .await;
    let paper_id = list["data"][0]["paper_type"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/config/paper-types/{}", paper_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let after = app
        .request_json(Method::GET, "/api/v1/products", None, StatusCode::OK)
        .await;
    assert_eq!(after["data"][0]["id"], product_id);
    assert!(after["data"][0]["paper_type"].is_null());
}
