use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Classification of a cost component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    #[sea_orm(string_value = "direct_material")]
    DirectMaterial,
    #[sea_orm(string_value = "indirect_material")]
    IndirectMaterial,
    #[sea_orm(string_value = "direct_labor")]
    DirectLabor,
    #[sea_orm(string_value = "overhead")]
    Overhead,
    #[sea_orm(string_value = "packaging")]
    Packaging,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ComponentType {
    /// Parses a list-filter value. Returns `None` for unknown strings so the
    /// caller can reject the filter instead of silently matching nothing.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "direct_material" => Some(Self::DirectMaterial),
            "indirect_material" => Some(Self::IndirectMaterial),
            "direct_labor" => Some(Self::DirectLabor),
            "overhead" => Some(Self::Overhead),
            "packaging" => Some(Self::Packaging),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cost_components")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub component_type: ComponentType,
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

impl ActiveModelBehavior for ActiveModel {}
