use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::orders::OrderDetail;
use crate::services::quotes::{CreateQuoteRequest, QuoteResponse, UpdateQuoteRequest};
use crate::ApiResponse;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

/// List quotes
#[utoipa::path(
    get,
    path = "/api/v1/quotes",
    responses(
        (status = 200, description = "All quotes, newest first", body = crate::ApiResponse<Vec<QuoteResponse>>)
    ),
    tag = "Quotes"
)]
pub async fn list_quotes(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<QuoteResponse>>>, ServiceError> {
    let quotes = state.services.quotes.list_quotes().await?;
    Ok(Json(ApiResponse::success(quotes)))
}

/// Create a quote
#[utoipa::path(
    post,
    path = "/api/v1/quotes",
    request_body = CreateQuoteRequest,
    responses(
        (status = 201, description = "Quote created with derived prices", body = crate::ApiResponse<QuoteResponse>),
        (status = 400, description = "Bad request", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotes"
)]
pub async fn create_quote(
    State(state): State<AppState>,
    Json(request): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuoteResponse>>), ServiceError> {
    let quote = state.services.quotes.create_quote(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(quote))))
}

/// Get a quote by ID
#[utoipa::path(
    get,
    path = "/api/v1/quotes/:quote_id",
    params(
        ("quote_id" = Uuid, Path, description = "Quote ID")
    ),
    responses(
        (status = 200, description = "Quote details", body = crate::ApiResponse<QuoteResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotes"
)]
pub async fn get_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ServiceError> {
    let quote = state.services.quotes.get_quote(quote_id).await?;
    Ok(Json(ApiResponse::success(quote)))
}

/// Update a quote's status or notes
#[utoipa::path(
    patch,
    path = "/api/v1/quotes/:quote_id",
    params(
        ("quote_id" = Uuid, Path, description = "Quote ID")
    ),
    request_body = UpdateQuoteRequest,
    responses(
        (status = 200, description = "Quote updated", body = crate::ApiResponse<QuoteResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotes"
)]
pub async fn update_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
    Json(request): Json<UpdateQuoteRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ServiceError> {
    let quote = state
        .services
        .quotes
        .update_quote(quote_id, request)
        .await?;
    Ok(Json(ApiResponse::success(quote)))
}

/// Convert a quote into an order
#[utoipa::path(
    post,
    path = "/api/v1/quotes/:quote_id/convert",
    params(
        ("quote_id" = Uuid, Path, description = "Quote ID")
    ),
    responses(
        (status = 201, description = "Order created from quote", body = crate::ApiResponse<OrderDetail>),
        (status = 400, description = "Quote cannot be converted", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quote already converted", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotes"
)]
pub async fn convert_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDetail>>), ServiceError> {
    let order = state.services.orders.convert_quote(quote_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Quote routes
pub fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quotes).post(create_quote))
        .route("/:quote_id", get(get_quote).patch(update_quote))
        .route("/:quote_id/convert", post(convert_quote))
}
