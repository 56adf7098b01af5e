use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use printshop_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    AppState,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by a fresh
/// file-based SQLite database per test.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("failed to create temp dir for test database");
        let db_file = db_dir.path().join("printshop_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_file.display()),
            "127.0.0.1",
            18_080,
            "test",
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(db_arc, cfg, Some(event_sender));

        let router = Router::new()
            .nest("/api/v1", printshop_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a request and decode the JSON body, asserting the status code.
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        expected_status: StatusCode,
    ) -> Value {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();
        let json: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not valid json")
        };
        assert_eq!(
            status, expected_status,
            "unexpected status for {} (body: {})",
            uri, json
        );
        json
    }

    /// Seed a customer and return its id.
    pub async fn seed_customer(&self, name: &str, zone: &str) -> String {
        let body = self
            .request_json(
                Method::POST,
                "/api/v1/customers",
                Some(serde_json::json!({ "name": name, "zone": zone })),
                StatusCode::CREATED,
            )
            .await;
        body["data"]["id"].as_str().expect("customer id").to_string()
    }

    /// Seed a paper type and matrix size, then a product for the customer.
    /// Returns the product id.
    pub async fn seed_product(&self, customer_id: &str, internal_name: &str) -> String {
        let paper = self
            .request_json(
                Method::POST,
                "/api/v1/config/paper-types",
                Some(serde_json::json!({ "name": format!("Paper for {}", internal_name) })),
                StatusCode::CREATED,
            )
            .await;
        let matrix = self
            .request_json(
                Method::POST,
                "/api/v1/config/matrix-sizes",
                Some(serde_json::json!({ "name": format!("Matrix for {}", internal_name) })),
                StatusCode::CREATED,
            )
            .await;

        let body = self
            .request_json(
                Method::POST,
                "/api/v1/products",
                Some(serde_json::json!({
                    "customer_id": customer_id,
                    "internal_name": internal_name,
                    "paper_type_id": paper["data"]["id"],
                    "matrix_size_id": matrix["data"]["id"],
                })),
                StatusCode::CREATED,
            )
            .await;
        body["data"]["id"].as_str().expect("product id").to_string()
    }
}

/// Parse a JSON string field into a Decimal. Monetary fields serialize as
/// strings whose scale depends on the arithmetic that produced them, so
/// tests compare numerically.
#[allow(dead_code)]
pub fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("expected a decimal string"))
        .expect("invalid decimal string")
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}
