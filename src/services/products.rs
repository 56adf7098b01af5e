use crate::{
    db::DbPool,
    entities::{
        custom_product::{
            self, ActiveModel as ProductActiveModel, Entity as ProductEntity,
            Model as ProductModel,
        },
        customer::{self, Entity as CustomerEntity},
        matrix_size, paper_type,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "Internal name is required"))]
    pub internal_name: String,
    pub description: Option<String>,
    pub measures: Option<String>,
    pub paper_type_id: Option<Uuid>,
    pub matrix_size_id: Option<Uuid>,
    pub colors: Option<String>,
    pub observations: Option<String>,
}

/// A product with its owner and lookup rows resolved. Lookups are optional
/// because the referenced option may have been deleted since creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: ProductModel,
    pub customer: Option<customer::Model>,
    pub paper_type: Option<paper_type::Model>,
    pub matrix_size: Option<matrix_size::Model>,
}

/// Service for per-customer product definitions
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Lists products newest-updated first, optionally scoped to one customer
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<ProductResponse>, ServiceError> {
        let mut query = ProductEntity::find();
        if let Some(customer_id) = customer_id {
            query = query.filter(custom_product::Column::CustomerId.eq(customer_id));
        }

        let products = query
            .order_by_desc(custom_product::Column::UpdatedAt)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list products");
                ServiceError::DatabaseError(e)
            })?;

        self.resolve_references(products).await
    }

    /// Creates a product for a customer. Paper type and matrix size are
    /// required at creation even though the stored references are nullable.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, internal_name = %request.internal_name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request.validate()?;

        let paper_type_id = request.paper_type_id.ok_or_else(|| {
            ServiceError::ValidationError("A paper type must be selected".to_string())
        })?;
        let matrix_size_id = request.matrix_size_id.ok_or_else(|| {
            ServiceError::ValidationError("A matrix size must be selected".to_string())
        })?;

        let customer = CustomerEntity::find_by_id(request.customer_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Product references an unknown customer ({})",
                    request.customer_id
                ))
            })?;

        let product_id = Uuid::new_v4();
        let active_model = ProductActiveModel {
            id: Set(product_id),
            customer_id: Set(request.customer_id),
            internal_name: Set(request.internal_name),
            description: Set(request.description),
            measures: Set(request.measures),
            paper_type_id: Set(Some(paper_type_id)),
            matrix_size_id: Set(Some(matrix_size_id)),
            colors: Set(request.colors),
            observations: Set(request.observations),
            ..Default::default()
        };

        let model = active_model.insert(&*self.db).await.map_err(|e| {
            error!(error = %e, product_id = %product_id, "Failed to create product");
            ServiceError::DatabaseError(e)
        })?;

        info!(product_id = %product_id, customer_id = %customer.id, "Product created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::ProductCreated(product_id)).await {
                warn!(error = %e, product_id = %product_id, "Failed to send product created event");
            }
        }

        let paper = paper_type::Entity::find_by_id(paper_type_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let matrix = matrix_size::Entity::find_by_id(matrix_size_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(ProductResponse {
            product: model,
            customer: Some(customer),
            paper_type: paper,
            matrix_size: matrix,
        })
    }

    /// Batch-resolves customers and lookup rows for a page of products
    async fn resolve_references(
        &self,
        products: Vec<ProductModel>,
    ) -> Result<Vec<ProductResponse>, ServiceError> {
        let customer_ids: Vec<Uuid> = products.iter().map(|p| p.customer_id).collect();
        let paper_ids: Vec<Uuid> = products.iter().filter_map(|p| p.paper_type_id).collect();
        let matrix_ids: Vec<Uuid> = products.iter().filter_map(|p| p.matrix_size_id).collect();

        let customers: HashMap<Uuid, customer::Model> = CustomerEntity::find()
            .filter(customer::Column::Id.is_in(customer_ids))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let papers: HashMap<Uuid, paper_type::Model> = paper_type::Entity::find()
            .filter(paper_type::Column::Id.is_in(paper_ids))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let matrices: HashMap<Uuid, matrix_size::Model> = matrix_size::Entity::find()
            .filter(matrix_size::Column::Id.is_in(matrix_ids))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| {
                let customer = customers.get(&product.customer_id).cloned();
                let paper_type = product
                    .paper_type_id
                    .and_then(|id| papers.get(&id).cloned());
                let matrix_size = product
                    .matrix_size_id
                    .and_then(|id| matrices.get(&id).cloned());
                ProductResponse {
                    product,
                    customer,
                    paper_type,
                    matrix_size,
                }
            })
            .collect())
    }
}
