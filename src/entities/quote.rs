use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Quote lifecycle tags. Stored as plain text; `draft` on creation,
/// `approved` when converted to an order.
pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_APPROVED: &str = "approved";

/// A priced proposal for a customer/product/quantity combination. The four
/// cost components, margin and derived prices are stored verbatim with no
/// rounding; the conversion link lives on `orders.quote_id`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Quote)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub customer_id: Uuid,
    pub product_id: Option<Uuid>,
    pub quantity: i32,

    pub paper_cost: Decimal,
    pub print_cost: Decimal,
    pub matrix_cost: Decimal,
    pub other_cost: Decimal,
    pub margin: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,

    pub notes: Option<String>,
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::custom_product::Entity",
        from = "Column::ProductId",
        to = "super::custom_product::Column::Id"
    )]
    Product,
    #[sea_orm(has_one = "super::order::Entity")]
    Order,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::custom_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
