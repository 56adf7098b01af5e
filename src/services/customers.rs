use crate::{
    db::DbPool,
    entities::customer::{self, ActiveModel as CustomerActiveModel, Entity as CustomerEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Payload shared by customer creation and in-place edits; both require a
/// name and a delivery zone.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CustomerPayload {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 1, message = "Customer zone is required"))]
    pub zone: String,
}

/// Service for the customer directory
#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Lists all customers ordered by name
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<customer::Model>, ServiceError> {
        let customers = CustomerEntity::find()
            .order_by_asc(customer::Column::Name)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list customers");
                ServiceError::DatabaseError(e)
            })?;
        Ok(customers)
    }

    /// Fetches a single customer by id
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_customer(&self, customer_id: Uuid) -> Result<customer::Model, ServiceError> {
        CustomerEntity::find_by_id(customer_id)
            .one(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, customer_id = %customer_id, "Failed to fetch customer");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer with ID {} not found", customer_id))
            })
    }

    /// Creates a new customer
    #[instrument(skip(self, payload), fields(name = %payload.name, zone = %payload.zone))]
    pub async fn create_customer(
        &self,
        payload: CustomerPayload,
    ) -> Result<customer::Model, ServiceError> {
        payload.validate()?;

        let customer_id = Uuid::new_v4();
        let active_model = CustomerActiveModel {
            id: Set(customer_id),
            name: Set(payload.name),
            phone: Set(payload.phone),
            email: Set(payload.email),
            tax_id: Set(payload.tax_id),
            address: Set(payload.address),
            zone: Set(payload.zone),
            ..Default::default()
        };

        let model = active_model.insert(&*self.db).await.map_err(|e| {
            error!(error = %e, customer_id = %customer_id, "Failed to create customer");
            ServiceError::DatabaseError(e)
        })?;

        info!(customer_id = %customer_id, "Customer created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::CustomerCreated(customer_id)).await {
                warn!(error = %e, customer_id = %customer_id, "Failed to send customer created event");
            }
        }

        Ok(model)
    }

    /// Replaces a customer's editable fields
    #[instrument(skip(self, payload), fields(customer_id = %customer_id))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        payload: CustomerPayload,
    ) -> Result<customer::Model, ServiceError> {
        payload.validate()?;

        let existing = self.get_customer(customer_id).await?;

        let mut active_model: CustomerActiveModel = existing.into();
        active_model.name = Set(payload.name);
        active_model.phone = Set(payload.phone);
        active_model.email = Set(payload.email);
        active_model.tax_id = Set(payload.tax_id);
        active_model.address = Set(payload.address);
        active_model.zone = Set(payload.zone);
        active_model.updated_at = Set(Some(Utc::now()));

        let model = active_model.update(&*self.db).await.map_err(|e| {
            error!(error = %e, customer_id = %customer_id, "Failed to update customer");
            ServiceError::DatabaseError(e)
        })?;

        info!(customer_id = %customer_id, "Customer updated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::CustomerUpdated(customer_id)).await {
                warn!(error = %e, customer_id = %customer_id, "Failed to send customer updated event");
            }
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_requires_name_and_zone() {
        let payload = CustomerPayload {
            name: "".into(),
            phone: None,
            email: None,
            tax_id: None,
            address: None,
            zone: "north".into(),
        };
        assert!(payload.validate().is_err());

        let payload = CustomerPayload {
            name: "Imprenta Central".into(),
            phone: None,
            email: None,
            tax_id: None,
            address: None,
            zone: "".into(),
        };
        assert!(payload.validate().is_err());

        let payload = CustomerPayload {
            name: "Imprenta Central".into(),
            phone: Some("555-0101".into()),
            email: None,
            tax_id: None,
            address: None,
            zone: "north".into(),
        };
        assert!(payload.validate().is_ok());
    }
}
