use crate::entities::payment::Model as Payment;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::orders::{
    CreateOrderRequest, CustomerDebt, OrderDetail, OrderSummary, RecordPaymentRequest,
    UpdateOrderRequest,
};
use crate::ApiResponse;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

/// List orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "All orders, newest first", body = crate::ApiResponse<Vec<OrderSummary>>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<OrderSummary>>>, ServiceError> {
    let orders = state.services.orders.list_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Create an order with line items
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = crate::ApiResponse<OrderDetail>),
        (status = 400, description = "Bad request", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDetail>>), ServiceError> {
    let order = state.services.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Orders with an outstanding balance, grouped by customer
#[utoipa::path(
    get,
    path = "/api/v1/orders/debt-summary",
    responses(
        (status = 200, description = "Per-customer outstanding balances", body = crate::ApiResponse<Vec<CustomerDebt>>)
    ),
    tag = "Orders"
)]
pub async fn debt_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CustomerDebt>>>, ServiceError> {
    let summary = state.services.orders.debt_summary().await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// Get an order by ID
#[utoipa::path(
    get,
    path = "/api/v1/orders/:order_id",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with items, payments and history", body = crate::ApiResponse<OrderDetail>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderDetail>>, ServiceError> {
    let order = state.services.orders.get_order(order_id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Update an order's status or notes
#[utoipa::path(
    patch,
    path = "/api/v1/orders/:order_id",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = crate::ApiResponse<OrderDetail>),
        (status = 400, description = "Invalid status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<OrderDetail>>, ServiceError> {
    let order = state
        .services
        .orders
        .update_order(order_id, request)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Record a payment against an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/:order_id/payment",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = crate::ApiResponse<Payment>),
        (status = 400, description = "Bad request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), ServiceError> {
    let payment = state
        .services
        .orders
        .record_payment(order_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment))))
}

/// Order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/debt-summary", get(debt_summary))
        .route("/:order_id", get(get_order).patch(update_order))
        .route("/:order_id/payment", post(record_payment))
}
