use crate::entities::customer::Model as Customer;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::customers::CustomerPayload;
use crate::ApiResponse;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use uuid::Uuid;
use validator::Validate;

/// List customers sorted by name
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    responses(
        (status = 200, description = "All customers", body = crate::ApiResponse<Vec<Customer>>)
    ),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Customer>>>, ServiceError> {
    let customers = state.services.customers.list_customers().await?;
    Ok(Json(ApiResponse::success(customers)))
}

/// Get a customer by ID
#[utoipa::path(
    get,
    path = "/api/v1/customers/:customer_id",
    params(
        ("customer_id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer details", body = crate::ApiResponse<Customer>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Customer>>, ServiceError> {
    let customer = state.services.customers.get_customer(customer_id).await?;
    Ok(Json(ApiResponse::success(customer)))
}

/// Create a customer
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Customer created", body = crate::ApiResponse<Customer>),
        (status = 400, description = "Bad request", body = crate::errors::ErrorResponse)
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CustomerPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Customer>>), ServiceError> {
    payload.validate()?;
    let customer = state.services.customers.create_customer(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(customer))))
}

/// Update a customer
#[utoipa::path(
    patch,
    path = "/api/v1/customers/:customer_id",
    params(
        ("customer_id" = Uuid, Path, description = "Customer ID")
    ),
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Customer updated", body = crate::ApiResponse<Customer>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<CustomerPayload>,
) -> Result<Json<ApiResponse<Customer>>, ServiceError> {
    payload.validate()?;
    let customer = state
        .services
        .customers
        .update_customer(customer_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(customer)))
}

/// Customer routes
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:customer_id", get(get_customer).patch(update_customer))
}
