use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::products::{CreateProductRequest, ProductResponse};
use crate::ApiResponse;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListFilter {
    /// Restrict the listing to one customer's products
    pub customer_id: Option<Uuid>,
}

/// List products, optionally filtered by customer
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListFilter),
    responses(
        (status = 200, description = "Products with resolved references", body = crate::ApiResponse<Vec<ProductResponse>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductListFilter>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ServiceError> {
    let products = state
        .services
        .products
        .list_products(filter.customer_id)
        .await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Create a product for a customer
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Bad request", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), ServiceError> {
    request.validate()?;
    let product = state.services.products.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// Product routes
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/", get(list_products).post(create_product))
}
