use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A product owned by a user. `hpp` (cost of goods) and `selling_price` are
/// materialized from cost lines and the price tier chain; they are never
/// written directly by API clients.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    #[serde(serialize_with = "super::serialize_opt_money")]
    pub hpp: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    #[serde(serialize_with = "super::serialize_opt_money")]
    pub selling_price: Option<Decimal>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::product_cost::Entity")]
    ProductCost,
    #[sea_orm(has_many = "super::price_scheme::Entity")]
    PriceScheme,
    #[sea_orm(has_many = "super::sales_record::Entity")]
    SalesRecord,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductCost.def()
    }
}

impl Related<super::price_scheme::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceScheme.def()
    }
}

impl Related<super::sales_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
