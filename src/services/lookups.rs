use crate::{
    db::DbPool,
    entities::{matrix_size, paper_type},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLookupOptionRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Service for the shared configuration lists (paper types, matrix sizes).
/// Deletion is idempotent by id and performs no referential checks; readers
/// of products and quotes null-check dangling references.
#[derive(Clone)]
pub struct LookupService {
    db: Arc<DbPool>,
}

impl LookupService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_paper_types(&self) -> Result<Vec<paper_type::Model>, ServiceError> {
        paper_type::Entity::find()
            .order_by_asc(paper_type::Column::Name)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list paper types");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_paper_type(
        &self,
        request: CreateLookupOptionRequest,
    ) -> Result<paper_type::Model, ServiceError> {
        request.validate()?;

        let model = paper_type::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create paper type");
            ServiceError::DatabaseError(e)
        })?;

        info!(paper_type_id = %model.id, "Paper type created");
        Ok(model)
    }

    #[instrument(skip(self), fields(paper_type_id = %id))]
    pub async fn delete_paper_type(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = paper_type::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, paper_type_id = %id, "Failed to delete paper type");
                ServiceError::DatabaseError(e)
            })?;

        info!(paper_type_id = %id, rows = result.rows_affected, "Paper type deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_matrix_sizes(&self) -> Result<Vec<matrix_size::Model>, ServiceError> {
        matrix_size::Entity::find()
            .order_by_asc(matrix_size::Column::Name)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list matrix sizes");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_matrix_size(
        &self,
        request: CreateLookupOptionRequest,
    ) -> Result<matrix_size::Model, ServiceError> {
        request.validate()?;

        let model = matrix_size::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create matrix size");
            ServiceError::DatabaseError(e)
        })?;

        info!(matrix_size_id = %model.id, "Matrix size created");
        Ok(model)
    }

    #[instrument(skip(self), fields(matrix_size_id = %id))]
    pub async fn delete_matrix_size(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = matrix_size::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, matrix_size_id = %id, "Failed to delete matrix size");
                ServiceError::DatabaseError(e)
            })?;

        info!(matrix_size_id = %id, rows = result.rows_affected, "Matrix size deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_name_must_be_non_empty() {
        assert!(CreateLookupOptionRequest { name: "".into() }
            .validate()
            .is_err());
        assert!(CreateLookupOptionRequest {
            name: "Obra 80g".into()
        }
        .validate()
        .is_ok());
    }
}
