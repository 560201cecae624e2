use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    entities::{
        price_scheme::{self, Entity as PriceSchemeEntity},
        product::{self, Entity as ProductEntity},
        product_cost::{self, Entity as ProductCostEntity},
        sales_record::{self, Entity as SalesRecordEntity},
    },
    errors::ServiceError,
};

#[derive(Clone, Debug)]
pub struct NewProduct {
    /// Optional explicit owner; must match the caller when present.
    pub user_id: Option<i64>,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<product::Model>, ServiceError> {
        Ok(ProductEntity::find()
            .filter(product::Column::UserId.eq(user_id))
            .order_by_asc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        user_id: i64,
        input: NewProduct,
    ) -> Result<product::Model, ServiceError> {
        if let Some(owner) = input.user_id {
            if owner != user_id {
                return Err(ServiceError::Forbidden(
                    "You cannot create a product for another user".to_string(),
                ));
            }
        }

        self.ensure_sku_free(&input.sku, None).await?;

        let created = product::ActiveModel {
            user_id: Set(user_id),
            name: Set(input.name),
            sku: Set(input.sku),
            description: Set(input.description),
            hpp: Set(None),
            selling_price: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(product_id = created.id, "product created");
        Ok(created)
    }

    pub async fn get(&self, user_id: i64, product_id: i64) -> Result<product::Model, ServiceError> {
        ProductEntity::find_by_id(product_id)
            .filter(product::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        user_id: i64,
        product_id: i64,
        changes: ProductChanges,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get(user_id, product_id).await?;

        if let Some(sku) = &changes.sku {
            if *sku != existing.sku {
                self.ensure_sku_free(sku, Some(product_id)).await?;
            }
        }

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(sku) = changes.sku {
            active.sku = Set(sku);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(product_id, "product updated");
        Ok(updated)
    }

    /// Deletes a product. Dependent rows block deletion; the caller removes
    /// cost lines, price levels, and sales records first.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, product_id: i64) -> Result<(), ServiceError> {
        let existing = self.get(user_id, product_id).await?;

        let cost_lines = ProductCostEntity::find()
            .filter(product_cost::Column::ProductId.eq(product_id))
            .count(&*self.db)
            .await?;
        if cost_lines > 0 {
            return Err(ServiceError::Conflict(
                "Product still has cost lines".to_string(),
            ));
        }

        let schemes = PriceSchemeEntity::find()
            .filter(price_scheme::Column::ProductId.eq(product_id))
            .count(&*self.db)
            .await?;
        if schemes > 0 {
            return Err(ServiceError::Conflict(
                "Product still has price schemes".to_string(),
            ));
        }

        let sales = SalesRecordEntity::find()
            .filter(sales_record::Column::ProductId.eq(product_id))
            .count(&*self.db)
            .await?;
        if sales > 0 {
            return Err(ServiceError::Conflict(
                "Product still has sales records".to_string(),
            ));
        }

        existing.delete(&*self.db).await?;
        info!(product_id, "product deleted");
        Ok(())
    }

    async fn ensure_sku_free(&self, sku: &str, exclude: Option<i64>) -> Result<(), ServiceError> {
        let mut query = ProductEntity::find().filter(product::Column::Sku.eq(sku));
        if let Some(id) = exclude {
            query = query.filter(product::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::validation(
                "sku",
                "The sku has already been taken",
            ));
        }
        Ok(())
    }
}
