use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A product defined per customer (business cards, letterheads, forms...).
/// Lookup references are nullable because paper types and matrix sizes can
/// be deleted without cascading; readers null-check them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema, Validate)]
#[schema(as = CustomProduct)]
#[sea_orm(table_name = "custom_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub customer_id: Uuid,

    #[validate(length(min = 1, message = "Internal name is required"))]
    pub internal_name: String,

    pub description: Option<String>,
    pub measures: Option<String>,
    pub paper_type_id: Option<Uuid>,
    pub matrix_size_id: Option<Uuid>,
    pub colors: Option<String>,
    pub observations: Option<String>,

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
        belongs_to = "super::paper_type::Entity",
        from = "Column::PaperTypeId",
        to = "super::paper_type::Column::Id"
    )]
    PaperType,
    #[sea_orm(
        belongs_to = "super::matrix_size::Entity",
        from = "Column::MatrixSizeId",
        to = "super::matrix_size::Column::Id"
    )]
    MatrixSize,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::quote::Entity")]
    Quotes,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::paper_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaperType.def()
    }
}

impl Related<super::matrix_size::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatrixSize.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::quote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotes.def()
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
