use crate::{
    db::DbPool,
    entities::{
        custom_product::{self, Entity as ProductEntity},
        customer::{self, Entity as CustomerEntity},
        matrix_size,
        order::{self, Entity as OrderEntity},
        paper_type,
        quote::{self, ActiveModel as QuoteActiveModel, Entity as QuoteEntity, Model as QuoteModel},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateQuoteRequest {
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub paper_cost: Decimal,
    #[serde(default)]
    pub print_cost: Decimal,
    #[serde(default)]
    pub matrix_cost: Decimal,
    #[serde(default)]
    pub other_cost: Decimal,
    #[serde(default)]
    pub margin: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateQuoteRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Product embed with its lookup rows resolved (null-safe against deleted
/// lookup options).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteProduct {
    #[serde(flatten)]
    pub product: custom_product::Model,
    pub paper_type: Option<paper_type::Model>,
    pub matrix_size: Option<matrix_size::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: QuoteModel,
    pub customer: Option<customer::Model>,
    pub product: Option<QuoteProduct>,
    /// The order this quote was converted into, when conversion happened
    pub order: Option<order::Model>,
}

/// Derived pricing for a quote. Stored verbatim, no rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePricing {
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// `base = paper + print + matrix + other`; `unit = base / quantity`;
/// `unit_price = unit * (1 + margin/100)`; `total = unit_price * quantity`.
/// The caller guarantees `quantity > 0`.
pub fn compute_pricing(
    quantity: i32,
    paper_cost: Decimal,
    print_cost: Decimal,
    matrix_cost: Decimal,
    other_cost: Decimal,
    margin: Decimal,
) -> QuotePricing {
    let quantity = Decimal::from(quantity);
    let base_cost = paper_cost + print_cost + matrix_cost + other_cost;
    let unit_cost = base_cost / quantity;
    let unit_price = unit_cost * (Decimal::ONE + margin / Decimal::ONE_HUNDRED);
    let total_price = unit_price * quantity;
    QuotePricing {
        unit_price,
        total_price,
    }
}

/// Service for price quotes
#[derive(Clone)]
pub struct QuoteService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl QuoteService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a quote, deriving unit and total prices from the cost
    /// components and margin. Quantity must be positive; it guards the
    /// per-unit division.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, product_id = %request.product_id))]
    pub async fn create_quote(
        &self,
        request: CreateQuoteRequest,
    ) -> Result<QuoteResponse, ServiceError> {
        if request.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Quantity must be greater than 0".to_string(),
            ));
        }

        let customer = CustomerEntity::find_by_id(request.customer_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Quote references an unknown customer ({})",
                    request.customer_id
                ))
            })?;

        let product = ProductEntity::find_by_id(request.product_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Quote references an unknown product ({})",
                    request.product_id
                ))
            })?;

        let pricing = compute_pricing(
            request.quantity,
            request.paper_cost,
            request.print_cost,
            request.matrix_cost,
            request.other_cost,
            request.margin,
        );

        let quote_id = Uuid::new_v4();
        let active_model = QuoteActiveModel {
            id: Set(quote_id),
            customer_id: Set(request.customer_id),
            product_id: Set(Some(request.product_id)),
            quantity: Set(request.quantity),
            paper_cost: Set(request.paper_cost),
            print_cost: Set(request.print_cost),
            matrix_cost: Set(request.matrix_cost),
            other_cost: Set(request.other_cost),
            margin: Set(request.margin),
            unit_price: Set(pricing.unit_price),
            total_price: Set(pricing.total_price),
            notes: Set(request.notes),
            status: Set(quote::STATUS_DRAFT.to_string()),
            ..Default::default()
        };

        let model = active_model.insert(&*self.db).await.map_err(|e| {
            error!(error = %e, quote_id = %quote_id, "Failed to create quote");
            ServiceError::DatabaseError(e)
        })?;

        info!(quote_id = %quote_id, total_price = %model.total_price, "Quote created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::QuoteCreated(quote_id)).await {
                warn!(error = %e, quote_id = %quote_id, "Failed to send quote created event");
            }
        }

        let product = self.resolve_product(Some(product)).await?;
        Ok(QuoteResponse {
            quote: model,
            customer: Some(customer),
            product,
            order: None,
        })
    }

    /// Lists quotes newest first with their customer, product and converted
    /// order embedded
    #[instrument(skip(self))]
    pub async fn list_quotes(&self) -> Result<Vec<QuoteResponse>, ServiceError> {
        let quotes = QuoteEntity::find()
            .order_by_desc(quote::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list quotes");
                ServiceError::DatabaseError(e)
            })?;

        let mut responses = Vec::with_capacity(quotes.len());
        for quote_model in quotes {
            responses.push(self.build_response(quote_model).await?);
        }
        Ok(responses)
    }

    /// Fetches a quote with embeds, or NotFound
    #[instrument(skip(self), fields(quote_id = %quote_id))]
    pub async fn get_quote(&self, quote_id: Uuid) -> Result<QuoteResponse, ServiceError> {
        let quote_model = QuoteEntity::find_by_id(quote_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Quote with ID {} not found", quote_id))
            })?;

        self.build_response(quote_model).await
    }

    /// Updates a quote's status and/or notes
    #[instrument(skip(self, request), fields(quote_id = %quote_id))]
    pub async fn update_quote(
        &self,
        quote_id: Uuid,
        request: UpdateQuoteRequest,
    ) -> Result<QuoteResponse, ServiceError> {
        let quote_model = QuoteEntity::find_by_id(quote_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Quote with ID {} not found", quote_id))
            })?;

        let mut active_model: QuoteActiveModel = quote_model.into();
        if let Some(status) = request.status {
            active_model.status = Set(status);
        }
        if let Some(notes) = request.notes {
            active_model.notes = Set(Some(notes));
        }
        active_model.updated_at = Set(Some(Utc::now()));

        let updated = active_model.update(&*self.db).await.map_err(|e| {
            error!(error = %e, quote_id = %quote_id, "Failed to update quote");
            ServiceError::DatabaseError(e)
        })?;

        info!(quote_id = %quote_id, status = %updated.status, "Quote updated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::QuoteUpdated(quote_id)).await {
                warn!(error = %e, quote_id = %quote_id, "Failed to send quote updated event");
            }
        }

        self.build_response(updated).await
    }

    async fn build_response(&self, quote_model: QuoteModel) -> Result<QuoteResponse, ServiceError> {
        let customer = CustomerEntity::find_by_id(quote_model.customer_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let product_model = match quote_model.product_id {
            Some(product_id) => ProductEntity::find_by_id(product_id)
                .one(&*self.db)
                .await
                .map_err(ServiceError::DatabaseError)?,
            None => None,
        };
        let product = self.resolve_product(product_model).await?;

        let order = OrderEntity::find()
            .filter(order::Column::QuoteId.eq(quote_model.id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(QuoteResponse {
            quote: quote_model,
            customer,
            product,
            order,
        })
    }

    async fn resolve_product(
        &self,
        product: Option<custom_product::Model>,
    ) -> Result<Option<QuoteProduct>, ServiceError> {
        let Some(product) = product else {
            return Ok(None);
        };

        let paper_type = match product.paper_type_id {
            Some(id) => paper_type::Entity::find_by_id(id)
                .one(&*self.db)
                .await
                .map_err(ServiceError::DatabaseError)?,
            None => None,
        };
        let matrix_size = match product.matrix_size_id {
            Some(id) => matrix_size::Entity::find_by_id(id)
                .one(&*self.db)
                .await
                .map_err(ServiceError::DatabaseError)?,
            None => None,
        };

        Ok(Some(QuoteProduct {
            product,
            paper_type,
            matrix_size,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pricing_applies_margin_over_unit_cost() {
        // 1000 units, 100 + 50 in costs, 30% margin
        let pricing = compute_pricing(1000, dec!(100), dec!(50), dec!(0), dec!(0), dec!(30));
        assert_eq!(pricing.unit_price, dec!(0.195));
        assert_eq!(pricing.total_price, dec!(195));
    }

    #[test]
    fn pricing_with_zero_margin_is_cost_passthrough() {
        let pricing = compute_pricing(100, dec!(20), dec!(5), dec!(0), dec!(0), dec!(0));
        assert_eq!(pricing.unit_price, dec!(0.25));
        assert_eq!(pricing.total_price, dec!(25));
    }

    #[test]
    fn pricing_handles_all_cost_components() {
        let pricing = compute_pricing(10, dec!(1), dec!(2), dec!(3), dec!(4), dec!(100));
        // base 10, unit 1, doubled by the 100% margin
        assert_eq!(pricing.unit_price, dec!(2));
        assert_eq!(pricing.total_price, dec!(20));
    }
}
