use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One cost line of a product: a cost component applied with a unit price,
/// quantity, and unit conversion. `amount` is derived, never client-supplied.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_costs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_id: i64,
    pub cost_component_id: i64,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(serialize_with = "super::serialize_money")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(serialize_with = "super::serialize_money")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(serialize_with = "super::serialize_money")]
    pub conversion_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(serialize_with = "super::serialize_money")]
    pub amount: Decimal,
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
        belongs_to = "super::cost_component::Entity",
        from = "Column::CostComponentId",
        to = "super::cost_component::Column::Id"
    )]
    CostComponent,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::cost_component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostComponent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
