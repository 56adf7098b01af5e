use crate::entities::{matrix_size::Model as MatrixSize, paper_type::Model as PaperType};
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::lookups::CreateLookupOptionRequest;
use crate::ApiResponse;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use uuid::Uuid;
use validator::Validate;

/// List paper types
#[utoipa::path(
    get,
    path = "/api/v1/config/paper-types",
    responses(
        (status = 200, description = "All paper types", body = crate::ApiResponse<Vec<PaperType>>)
    ),
    tag = "Configuration"
)]
pub async fn list_paper_types(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PaperType>>>, ServiceError> {
    let paper_types = state.services.lookups.list_paper_types().await?;
    Ok(Json(ApiResponse::success(paper_types)))
}

/// Add a paper type
#[utoipa::path(
    post,
    path = "/api/v1/config/paper-types",
    request_body = CreateLookupOptionRequest,
    responses(
        (status = 201, description = "Paper type created", body = crate::ApiResponse<PaperType>),
        (status = 400, description = "Bad request", body = crate::errors::ErrorResponse)
    ),
    tag = "Configuration"
)]
pub async fn create_paper_type(
    State(state): State<AppState>,
    Json(request): Json<CreateLookupOptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaperType>>), ServiceError> {
    request.validate()?;
    let paper_type = state.services.lookups.create_paper_type(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(paper_type))))
}

/// Remove a paper type
#[utoipa::path(
    delete,
    path = "/api/v1/config/paper-types/:id",
    params(
        ("id" = Uuid, Path, description = "Paper type ID")
    ),
    responses(
        (status = 204, description = "Paper type deleted")
    ),
    tag = "Configuration"
)]
pub async fn delete_paper_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.lookups.delete_paper_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List matrix sizes
#[utoipa::path(
    get,
    path = "/api/v1/config/matrix-sizes",
    responses(
        (status = 200, description = "All matrix sizes", body = crate::ApiResponse<Vec<MatrixSize>>)
    ),
    tag = "Configuration"
)]
pub async fn list_matrix_sizes(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MatrixSize>>>, ServiceError> {
    let matrix_sizes = state.services.lookups.list_matrix_sizes().await?;
    Ok(Json(ApiResponse::success(matrix_sizes)))
}

/// Add a matrix size
#[utoipa::path(
    post,
    path = "/api/v1/config/matrix-sizes",
    request_body = CreateLookupOptionRequest,
    responses(
        (status = 201, description = "Matrix size created", body = crate::ApiResponse<MatrixSize>),
        (status = 400, description = "Bad request", body = crate::errors::ErrorResponse)
    ),
    tag = "Configuration"
)]
pub async fn create_matrix_size(
    State(state): State<AppState>,
    Json(request): Json<CreateLookupOptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MatrixSize>>), ServiceError> {
    request.validate()?;
    let matrix_size = state.services.lookups.create_matrix_size(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(matrix_size))))
}

/// Remove a matrix size
#[utoipa::path(
    delete,
    path = "/api/v1/config/matrix-sizes/:id",
    params(
        ("id" = Uuid, Path, description = "Matrix size ID")
    ),
    responses(
        (status = 204, description = "Matrix size deleted")
    ),
    tag = "Configuration"
)]
pub async fn delete_matrix_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.lookups.delete_matrix_size(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Configuration list routes
pub fn config_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/paper-types",
            get(list_paper_types).post(create_paper_type),
        )
        .route("/paper-types/:id", delete(delete_paper_type))
        .route(
            "/matrix-sizes",
            get(list_matrix_sizes).post(create_matrix_size),
        )
        .route("/matrix-sizes/:id", delete(delete_matrix_size))
}
