use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    entities::{
        product::{self, Entity as ProductEntity},
        product_cost::{self, Entity as ProductCostEntity},
    },
    errors::ServiceError,
    services::money::round2,
};

/// One entry in a batch of cost lines.
#[derive(Clone, Debug)]
pub struct NewCostLine {
    pub cost_component_id: i64,
    pub unit: String,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub conversion_qty: Decimal,
}

/// Partial changes to one cost line.
#[derive(Clone, Debug, Default)]
pub struct CostLineChanges {
    pub cost_component_id: Option<i64>,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub conversion_qty: Option<Decimal>,
}

/// Result of listing cost lines.
pub enum CostListing {
    /// The caller owns no products at all.
    NoProducts,
    /// The product exists but has no cost lines yet.
    Empty { product: product::Model },
    Lines {
        product: product::Model,
        lines: Vec<product_cost::Model>,
    },
}

/// A line's contribution to the product's unit cost.
pub fn line_amount(unit_price: Decimal, quantity: Decimal, conversion_qty: Decimal) -> Decimal {
    round2(unit_price * quantity / conversion_qty)
}

#[derive(Clone)]
pub struct ProductCostService {
    db: Arc<DatabaseConnection>,
}

impl ProductCostService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn owned_product(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<product::Model, ServiceError> {
        ProductEntity::find_by_id(product_id)
            .filter(product::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    /// Looks up a cost line and checks its parent product's owner. A line
    /// whose product belongs to someone else is a 403, not a 404.
    async fn owned_line(
        &self,
        user_id: i64,
        line_id: i64,
    ) -> Result<(product_cost::Model, product::Model), ServiceError> {
        let line = ProductCostEntity::find_by_id(line_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cost line not found".to_string()))?;

        let prod = ProductEntity::find_by_id(line.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        if prod.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "You do not own this product".to_string(),
            ));
        }

        Ok((line, prod))
    }

    /// Creates a batch of cost lines for a product and recomputes its HPP.
    /// All-or-nothing: any duplicate component, in the payload or already
    /// persisted, rejects the whole batch.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn create_batch(
        &self,
        user_id: i64,
        product_id: i64,
        entries: Vec<NewCostLine>,
    ) -> Result<product::Model, ServiceError> {
        let product = self.owned_product(user_id, product_id).await?;

        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.cost_component_id) {
                return Err(ServiceError::Conflict(
                    "Duplicate cost component in payload".to_string(),
                ));
            }
        }

        let txn = self.db.begin().await?;

        let existing = ProductCostEntity::find()
            .filter(product_cost::Column::ProductId.eq(product.id))
            .all(&txn)
            .await?;
        for line in &existing {
            if seen.contains(&line.cost_component_id) {
                return Err(ServiceError::Conflict(
                    "Cost component already exists for this product".to_string(),
                ));
            }
        }

        let now = Utc::now();
        for entry in entries {
            let amount = line_amount(entry.unit_price, entry.quantity, entry.conversion_qty);
            product_cost::ActiveModel {
                product_id: Set(product.id),
                cost_component_id: Set(entry.cost_component_id),
                unit: Set(entry.unit),
                unit_price: Set(round2(entry.unit_price)),
                quantity: Set(round2(entry.quantity)),
                conversion_qty: Set(round2(entry.conversion_qty)),
                amount: Set(amount),
                created_at: Set(now),
                updated_at: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let updated = self.persist_hpp(&txn, product).await?;
        txn.commit().await?;

        info!(product_id, hpp = %updated.hpp.unwrap_or_default(), "cost lines created");
        Ok(updated)
    }

    /// Updates one cost line, recomputing its amount and the product's HPP.
    #[instrument(skip(self, changes))]
    pub async fn update_line(
        &self,
        user_id: i64,
        line_id: i64,
        changes: CostLineChanges,
    ) -> Result<product_cost::Model, ServiceError> {
        let (mut line, product) = self.owned_line(user_id, line_id).await?;

        if let Some(component_id) = changes.cost_component_id {
            if component_id != line.cost_component_id {
                let taken = ProductCostEntity::find()
                    .filter(product_cost::Column::ProductId.eq(line.product_id))
                    .filter(product_cost::Column::CostComponentId.eq(component_id))
                    .one(&*self.db)
                    .await?;
                if taken.is_some() {
                    return Err(ServiceError::Conflict(
                        "Cost component already exists for this product".to_string(),
                    ));
                }
                line.cost_component_id = component_id;
            }
        }
        if let Some(unit) = changes.unit {
            line.unit = unit;
        }
        if let Some(unit_price) = changes.unit_price {
            line.unit_price = round2(unit_price);
        }
        if let Some(quantity) = changes.quantity {
            line.quantity = round2(quantity);
        }
        if let Some(conversion_qty) = changes.conversion_qty {
            line.conversion_qty = round2(conversion_qty);
        }
        line.amount = line_amount(line.unit_price, line.quantity, line.conversion_qty);

        let txn = self.db.begin().await?;

        let now = Utc::now();
        let mut active: product_cost::ActiveModel = line.clone().into();
        active.cost_component_id = Set(line.cost_component_id);
        active.unit = Set(line.unit.clone());
        active.unit_price = Set(line.unit_price);
        active.quantity = Set(line.quantity);
        active.conversion_qty = Set(line.conversion_qty);
        active.amount = Set(line.amount);
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        self.persist_hpp(&txn, product).await?;
        txn.commit().await?;

        info!(line_id, "cost line updated");
        Ok(updated)
    }

    /// Deletes one cost line and recomputes the product's HPP from the
    /// remaining lines.
    #[instrument(skip(self))]
    pub async fn delete_line(&self, user_id: i64, line_id: i64) -> Result<(), ServiceError> {
        let (line, product) = self.owned_line(user_id, line_id).await?;

        let txn = self.db.begin().await?;
        line.delete(&txn).await?;
        self.persist_hpp(&txn, product).await?;
        txn.commit().await?;

        info!(line_id, "cost line deleted");
        Ok(())
    }

    /// Lists cost lines for the requested product, or for the caller's
    /// earliest-created product when none is specified.
    pub async fn list(
        &self,
        user_id: i64,
        product_id: Option<i64>,
    ) -> Result<CostListing, ServiceError> {
        let product = match product_id {
            Some(id) => self.owned_product(user_id, id).await?,
            None => {
                let first = ProductEntity::find()
                    .filter(product::Column::UserId.eq(user_id))
                    .order_by_asc(product::Column::CreatedAt)
                    .one(&*self.db)
                    .await?;
                match first {
                    Some(p) => p,
                    None => return Ok(CostListing::NoProducts),
                }
            }
        };

        let lines = ProductCostEntity::find()
            .filter(product_cost::Column::ProductId.eq(product.id))
            .order_by_asc(product_cost::Column::Id)
            .all(&*self.db)
            .await?;

        if lines.is_empty() {
            return Ok(CostListing::Empty { product });
        }
        Ok(CostListing::Lines { product, lines })
    }

    /// Fetches one cost line. Absent or cross-tenant ids yield an empty
    /// result rather than an error; this endpoint has always answered 200.
    pub async fn get(
        &self,
        user_id: i64,
        line_id: i64,
    ) -> Result<Option<product_cost::Model>, ServiceError> {
        match self.owned_line(user_id, line_id).await {
            Ok((line, _)) => Ok(Some(line)),
            Err(ServiceError::NotFound(_)) | Err(ServiceError::Forbidden(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Recomputes `Product.hpp` from all of the product's lines and
    /// persists it within the caller's transaction.
    async fn persist_hpp(
        &self,
        txn: &DatabaseTransaction,
        product: product::Model,
    ) -> Result<product::Model, ServiceError> {
        let lines = ProductCostEntity::find()
            .filter(product_cost::Column::ProductId.eq(product.id))
            .all(txn)
            .await?;

        let total: Decimal = lines.iter().map(|l| l.amount).sum();
        let hpp = if lines.is_empty() {
            Some(round2(Decimal::ZERO))
        } else {
            Some(round2(total))
        };

        let mut active: product::ActiveModel = product.into();
        active.hpp = Set(hpp);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(txn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_applies_the_unit_conversion() {
        // 25000 per kg, 200 g used, 1000 g per kg.
        assert_eq!(line_amount(dec!(25000), dec!(200), dec!(1000)), dec!(5000.00));
    }

    #[test]
    fn amount_rounds_to_two_decimals() {
        assert_eq!(line_amount(dec!(10), dec!(1), dec!(3)), dec!(3.33));
        assert_eq!(line_amount(dec!(10), dec!(2), dec!(3)), dec!(6.67));
    }
}
