use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    entities::{
        cost_component::{self, ComponentType, Entity as CostComponentEntity},
        product_cost::{self, Entity as ProductCostEntity},
    },
    errors::ServiceError,
};

/// Parsed list filters. The handler rejects malformed raw values before
/// they reach the service.
#[derive(Clone, Debug, Default)]
pub struct ComponentFilter {
    pub component_type: Option<ComponentType>,
    pub keyword: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewCostComponent {
    pub name: String,
    pub description: Option<String>,
    pub component_type: ComponentType,
}

#[derive(Clone, Debug, Default)]
pub struct CostComponentChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub component_type: Option<ComponentType>,
}

#[derive(Clone)]
pub struct CostComponentService {
    db: Arc<DatabaseConnection>,
}

impl CostComponentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list(
        &self,
        user_id: i64,
        filter: ComponentFilter,
    ) -> Result<Vec<cost_component::Model>, ServiceError> {
        let mut query = CostComponentEntity::find()
            .filter(cost_component::Column::UserId.eq(user_id))
            .order_by_asc(cost_component::Column::Id);

        if let Some(component_type) = filter.component_type {
            query = query.filter(cost_component::Column::ComponentType.eq(component_type));
        }
        if let Some(keyword) = filter.keyword {
            query = query.filter(cost_component::Column::Name.contains(&keyword));
        }

        Ok(query.all(&*self.db).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        user_id: i64,
        input: NewCostComponent,
    ) -> Result<cost_component::Model, ServiceError> {
        let created = cost_component::ActiveModel {
            user_id: Set(user_id),
            name: Set(input.name),
            description: Set(input.description),
            component_type: Set(input.component_type),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(component_id = created.id, "cost component created");
        Ok(created)
    }

    pub async fn get(
        &self,
        user_id: i64,
        component_id: i64,
    ) -> Result<cost_component::Model, ServiceError> {
        CostComponentEntity::find_by_id(component_id)
            .filter(cost_component::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cost component not found".to_string()))
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        user_id: i64,
        component_id: i64,
        changes: CostComponentChanges,
    ) -> Result<cost_component::Model, ServiceError> {
        let existing = self.get(user_id, component_id).await?;

        let mut active: cost_component::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(component_type) = changes.component_type {
            active.component_type = Set(component_type);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(component_id, "cost component updated");
        Ok(updated)
    }

    /// Deletes a catalog entry. Blocked while any product's cost line still
    /// references it, regardless of which product.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, component_id: i64) -> Result<(), ServiceError> {
        let existing = self.get(user_id, component_id).await?;

        let references = ProductCostEntity::find()
            .filter(product_cost::Column::CostComponentId.eq(component_id))
            .count(&*self.db)
            .await?;
        if references > 0 {
            return Err(ServiceError::Conflict(
                "Cost component is still used by product cost lines".to_string(),
            ));
        }

        existing.delete(&*self.db).await?;
        info!(component_id, "cost component deleted");
        Ok(())
    }
}
