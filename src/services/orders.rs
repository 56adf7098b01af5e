use crate::{
    db::DbPool,
    entities::{
        custom_product::{self, Entity as ProductEntity},
        customer::{self, Entity as CustomerEntity},
        order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel},
        order_item::{self, Entity as OrderItemEntity},
        order_status_history::{self, Entity as HistoryEntity},
        payment::{self, Entity as PaymentEntity},
        quote::{self, Entity as QuoteEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Accepted payment methods. Stored lowercase in the `payments.method`
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Check,
    Card,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        match value {
            "cash" => Ok(Self::Cash),
            "transfer" => Ok(Self::Transfer),
            "check" => Ok(Self::Check),
            "card" => Ok(Self::Card),
            other => Err(ServiceError::InvalidInput(format!(
                "Unknown payment method '{}', expected one of: cash, transfer, check, card",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Check => "check",
            Self::Card => "card",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub items: Vec<OrderItemInput>,
    /// Caller-supplied order total. Stored as-is and never cross-checked
    /// against the item subtotals; when omitted the sum of subtotals is used.
    pub total: Option<Decimal>,
    pub notes: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub method: String,
    #[serde(default)]
    pub is_deferred: bool,
    pub accreditation_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: OrderModel,
    pub customer: Option<customer::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: order_item::Model,
    pub product: Option<custom_product::Model>,
}

/// Full order view: line items with their products, every payment, and the
/// status trail oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderModel,
    pub customer: Option<customer::Model>,
    pub items: Vec<OrderItemDetail>,
    pub payments: Vec<payment::Model>,
    pub status_history: Vec<order_status_history::Model>,
    pub quote: Option<quote::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerDebt {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub zone: String,
    pub total_balance: Decimal,
    pub orders: Vec<OrderModel>,
}

/// Service for the order ledger: creation, status workflow, payments and
/// quote conversion.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Creates an order with its line items, seeds `balance = total`, and
    /// writes the initial status row. All writes happen in one transaction.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderDetail, ServiceError> {
        if request.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "An order requires at least one item".to_string(),
            ));
        }
        for item in &request.items {
            if item.quantity <= 0 {
                return Err(ServiceError::ValidationError(
                    "Item quantity must be greater than 0".to_string(),
                ));
            }
            if item.unit_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Item unit price cannot be negative".to_string(),
                ));
            }
        }

        let txn = self.db.begin().await.map_err(ServiceError::DatabaseError)?;

        CustomerEntity::find_by_id(request.customer_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Order references an unknown customer ({})",
                    request.customer_id
                ))
            })?;

        let order_id = Uuid::new_v4();
        let mut items_total = Decimal::ZERO;

        for item in &request.items {
            ProductEntity::find_by_id(item.product_id)
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!(
                        "Order references an unknown product ({})",
                        item.product_id
                    ))
                })?;

            let subtotal = item.unit_price * Decimal::from(item.quantity);
            items_total += subtotal;

            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                subtotal: Set(subtotal),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        }

        // The stored total is the caller's figure when one is given; item
        // subtotals are not reconciled against it.
        let total = request.total.unwrap_or(items_total);

        let order_model = OrderActiveModel {
            id: Set(order_id),
            customer_id: Set(request.customer_id),
            quote_id: Set(None),
            total: Set(total),
            balance: Set(total),
            paid: Set(total <= Decimal::ZERO),
            status: Set(order::STATUS_REQUESTED.to_string()),
            notes: Set(request.notes),
            order_date: Set(request.order_date.unwrap_or_else(Utc::now)),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to create order");
            ServiceError::DatabaseError(e)
        })?;

        Self::append_history(&txn, order_id, order::STATUS_REQUESTED).await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, total = %total, "Order created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderCreated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "Failed to send order created event");
            }
        }

        self.build_detail(order_model).await
    }

    /// Lists orders newest first with their customer embedded
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderSummary>, ServiceError> {
        let rows = OrderEntity::find()
            .find_also_related(CustomerEntity)
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list orders");
                ServiceError::DatabaseError(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|(order, customer)| OrderSummary { order, customer })
            .collect())
    }

    /// Fetches one order with items, payments, history and the source quote
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetail, ServiceError> {
        let order_model = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        self.build_detail(order_model).await
    }

    /// Updates an order's status and/or notes. A status change appends
    /// exactly one history row; setting the same status again does not.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderDetail, ServiceError> {
        if let Some(status) = &request.status {
            if status.trim().is_empty() {
                return Err(ServiceError::InvalidStatus(
                    "Status cannot be empty".to_string(),
                ));
            }
        }

        let txn = self.db.begin().await.map_err(ServiceError::DatabaseError)?;

        let order_model = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        let old_status = order_model.status.clone();
        let status_changed = request
            .status
            .as_ref()
            .map(|s| *s != old_status)
            .unwrap_or(false);

        let mut active_model: OrderActiveModel = order_model.into();
        if let Some(status) = &request.status {
            active_model.status = Set(status.clone());
        }
        if let Some(notes) = request.notes {
            active_model.notes = Set(Some(notes));
        }
        active_model.updated_at = Set(Some(Utc::now()));

        let updated = active_model.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to update order");
            ServiceError::DatabaseError(e)
        })?;

        if status_changed {
            Self::append_history(&txn, order_id, &updated.status).await?;
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        if status_changed {
            info!(order_id = %order_id, old_status = %old_status, new_status = %updated.status, "Order status changed");
            if let Some(event_sender) = &self.event_sender {
                let event = Event::OrderStatusChanged {
                    order_id,
                    old_status,
                    new_status: updated.status.clone(),
                };
                if let Err(e) = event_sender.send(event).await {
                    warn!(error = %e, order_id = %order_id, "Failed to send status change event");
                }
            }
        }

        self.build_detail(updated).await
    }

    /// Records a payment and re-derives the order's balance from the full
    /// payment history: `balance = max(0, total - sum(payments))` and
    /// `paid = balance <= 0`. Overpayment clamps the balance at zero.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn record_payment(
        &self,
        order_id: Uuid,
        request: RecordPaymentRequest,
    ) -> Result<payment::Model, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Payment amount must be greater than 0".to_string(),
            ));
        }
        let method = PaymentMethod::parse(&request.method)?;

        let txn = self.db.begin().await.map_err(ServiceError::DatabaseError)?;

        let order_model = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        let payment_id = Uuid::new_v4();
        let mut payment_active = payment::ActiveModel {
            id: Set(payment_id),
            order_id: Set(order_id),
            amount: Set(request.amount),
            method: Set(method.as_str().to_string()),
            is_deferred: Set(request.is_deferred),
            accreditation_date: Set(request.accreditation_date),
            ..Default::default()
        };
        if let Some(payment_date) = request.payment_date {
            payment_active.payment_date = Set(payment_date);
        }
        let payment_model = payment_active
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let payments = PaymentEntity::find()
            .filter(payment::Column::OrderId.eq(order_id))
            .all(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let paid_total: Decimal = payments.iter().map(|p| p.amount).sum();
        let balance = (order_model.total - paid_total).max(Decimal::ZERO);
        let paid = balance <= Decimal::ZERO;

        let mut active_model: OrderActiveModel = order_model.into();
        active_model.balance = Set(balance);
        active_model.paid = Set(paid);
        active_model.updated_at = Set(Some(Utc::now()));
        active_model.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to update order balance");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            order_id = %order_id,
            payment_id = %payment_id,
            amount = %request.amount,
            balance = %balance,
            "Payment recorded"
        );

        if let Some(event_sender) = &self.event_sender {
            let event = Event::PaymentRecorded {
                order_id,
                payment_id,
                amount: request.amount,
            };
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, order_id = %order_id, "Failed to send payment event");
            }
        }

        Ok(payment_model)
    }

    /// Turns a quote into an order, at most once per quote. The order takes
    /// the quote's total as-is and gets a single line item priced from the
    /// quote; the quote flips to approved.
    #[instrument(skip(self), fields(quote_id = %quote_id))]
    pub async fn convert_quote(&self, quote_id: Uuid) -> Result<OrderDetail, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::DatabaseError)?;

        let quote_model = QuoteEntity::find_by_id(quote_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Quote with ID {} not found", quote_id))
            })?;

        let product_id = quote_model.product_id.ok_or_else(|| {
            ServiceError::InvalidOperation(
                "Quote has no product and cannot be converted".to_string(),
            )
        })?;

        let existing = OrderEntity::find()
            .filter(order::Column::QuoteId.eq(quote_id))
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Quote {} has already been converted to an order",
                quote_id
            )));
        }

        let order_id = Uuid::new_v4();
        let total = quote_model.total_price;
        let order_model = OrderActiveModel {
            id: Set(order_id),
            customer_id: Set(quote_model.customer_id),
            quote_id: Set(Some(quote_id)),
            total: Set(total),
            balance: Set(total),
            paid: Set(total <= Decimal::ZERO),
            status: Set(order::STATUS_REQUESTED.to_string()),
            notes: Set(quote_model.notes.clone()),
            order_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, quote_id = %quote_id, "Failed to create order from quote");
            ServiceError::DatabaseError(e)
        })?;

        order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(product_id),
            quantity: Set(quote_model.quantity),
            unit_price: Set(quote_model.unit_price),
            subtotal: Set(quote_model.total_price),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::DatabaseError)?;

        Self::append_history(&txn, order_id, order::STATUS_REQUESTED).await?;

        let mut quote_active: quote::ActiveModel = quote_model.into();
        quote_active.status = Set(quote::STATUS_APPROVED.to_string());
        quote_active.updated_at = Set(Some(Utc::now()));
        quote_active
            .update(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(quote_id = %quote_id, order_id = %order_id, "Quote converted to order");

        if let Some(event_sender) = &self.event_sender {
            let event = Event::QuoteConverted { quote_id, order_id };
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, quote_id = %quote_id, "Failed to send quote converted event");
            }
        }

        self.build_detail(order_model).await
    }

    /// Groups orders that still owe money by customer, with per-customer
    /// outstanding totals. Sorted by customer name.
    #[instrument(skip(self))]
    pub async fn debt_summary(&self) -> Result<Vec<CustomerDebt>, ServiceError> {
        let rows = OrderEntity::find()
            .filter(order::Column::Balance.gt(Decimal::ZERO))
            .find_also_related(CustomerEntity)
            .order_by_asc(order::Column::OrderDate)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load outstanding orders");
                ServiceError::DatabaseError(e)
            })?;

        let mut by_customer: HashMap<Uuid, CustomerDebt> = HashMap::new();
        for (order_model, customer) in rows {
            let Some(customer) = customer else {
                warn!(order_id = %order_model.id, "Outstanding order has no customer row");
                continue;
            };
            let entry = by_customer
                .entry(customer.id)
                .or_insert_with(|| CustomerDebt {
                    customer_id: customer.id,
                    customer_name: customer.name.clone(),
                    zone: customer.zone.clone(),
                    total_balance: Decimal::ZERO,
                    orders: Vec::new(),
                });
            entry.total_balance += order_model.balance;
            entry.orders.push(order_model);
        }

        let mut summary: Vec<CustomerDebt> = by_customer.into_values().collect();
        summary.sort_by(|a, b| a.customer_name.cmp(&b.customer_name));
        Ok(summary)
    }

    async fn append_history<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
        status: &str,
    ) -> Result<(), ServiceError> {
        order_status_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            status: Set(status.to_string()),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    async fn build_detail(&self, order_model: OrderModel) -> Result<OrderDetail, ServiceError> {
        let customer = CustomerEntity::find_by_id(order_model.customer_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let item_rows = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_model.id))
            .find_also_related(ProductEntity)
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let items = item_rows
            .into_iter()
            .map(|(item, product)| OrderItemDetail { item, product })
            .collect();

        let payments = PaymentEntity::find()
            .filter(payment::Column::OrderId.eq(order_model.id))
            .order_by_asc(payment::Column::PaymentDate)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let status_history = HistoryEntity::find()
            .filter(order_status_history::Column::OrderId.eq(order_model.id))
            .order_by_asc(order_status_history::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let quote = match order_model.quote_id {
            Some(quote_id) => QuoteEntity::find_by_id(quote_id)
                .one(&*self.db)
                .await
                .map_err(ServiceError::DatabaseError)?,
            None => None,
        };

        Ok(OrderDetail {
            order: order_model,
            customer,
            items,
            payments,
            status_history,
            quote,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_parses_known_values() {
        assert_eq!(PaymentMethod::parse("cash").unwrap(), PaymentMethod::Cash);
        assert_eq!(
            PaymentMethod::parse("transfer").unwrap(),
            PaymentMethod::Transfer
        );
        assert_eq!(PaymentMethod::parse("check").unwrap(), PaymentMethod::Check);
        assert_eq!(PaymentMethod::parse("card").unwrap(), PaymentMethod::Card);
    }

    #[test]
    fn payment_method_rejects_unknown_values() {
        let err = PaymentMethod::parse("barter").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
