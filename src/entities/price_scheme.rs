use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One tier in a product's price chain. Tiers form a contiguous sequence by
/// `level_order`; each tier buys at the previous tier's selling price.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_schemes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub level_name: String,
    pub level_order: i32,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(serialize_with = "super::serialize_money")]
    pub discount_percentage: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(serialize_with = "super::serialize_money")]
    pub purchase_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(serialize_with = "super::serialize_money")]
    pub selling_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(serialize_with = "super::serialize_money")]
    pub profit_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
