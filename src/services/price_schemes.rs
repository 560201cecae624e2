use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    entities::{
        price_scheme::{self, Entity as PriceSchemeEntity},
        product::{self, Entity as ProductEntity},
    },
    errors::ServiceError,
    services::money::round2,
};

const HUNDRED: Decimal = dec!(100);

/// Input for appending a new level to a product's price chain.
#[derive(Clone, Debug)]
pub struct NewPriceLevel {
    pub product_id: i64,
    pub level_name: String,
    pub discount_percentage: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Partial changes to an existing level.
#[derive(Clone, Debug, Default)]
pub struct PriceLevelChanges {
    pub level_name: Option<String>,
    pub discount_percentage: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Result of listing a product's price chain.
pub enum SchemeListing {
    /// The caller owns no products at all.
    NoProducts,
    Chain {
        product: product::Model,
        levels: Vec<price_scheme::Model>,
    },
}

/// Derives a selling price from a purchase price and a discount percentage.
/// The discount expresses the margin: `selling = purchase / (1 - d/100)`.
pub fn derive_selling(purchase: Decimal, discount: Decimal) -> Result<Decimal, ServiceError> {
    if discount >= HUNDRED {
        return Err(ServiceError::validation(
            "discount_percentage",
            "The discount percentage must be less than 100",
        ));
    }
    let factor = Decimal::ONE - discount / HUNDRED;
    Ok(round2(purchase / factor))
}

/// Back-derives the discount percentage implied by an explicit selling
/// price, consistent with [`derive_selling`].
pub fn derive_discount(purchase: Decimal, selling: Decimal) -> Result<Decimal, ServiceError> {
    if selling <= Decimal::ZERO {
        return Err(ServiceError::validation(
            "selling_price",
            "The selling price must be greater than zero",
        ));
    }
    Ok(round2((Decimal::ONE - purchase / selling) * HUNDRED))
}

/// Resolved pricing for one level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedLevel {
    pub discount_percentage: Decimal,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub profit_amount: Decimal,
}

/// Resolves one level's prices from its purchase anchor and whichever of
/// discount/selling the caller supplied. An explicit selling price wins and
/// back-derives the discount; neither supplied means zero markup.
pub fn resolve_level(
    purchase: Decimal,
    discount: Option<Decimal>,
    selling: Option<Decimal>,
) -> Result<ResolvedLevel, ServiceError> {
    let purchase = round2(purchase);
    let (discount_percentage, selling_price) = match (discount, selling) {
        (_, Some(sell)) => {
            let sell = round2(sell);
            (derive_discount(purchase, sell)?, sell)
        }
        (Some(disc), None) => {
            let disc = round2(disc);
            (disc, derive_selling(purchase, disc)?)
        }
        (None, None) => (round2(Decimal::ZERO), purchase),
    };
    Ok(ResolvedLevel {
        discount_percentage,
        purchase_price: purchase,
        selling_price,
        profit_amount: round2(selling_price - purchase),
    })
}

/// Recomputes a chain in memory, in `level_order` order, from a starting
/// anchor price: the first slice element's purchase price becomes `anchor`,
/// every later element's purchase price becomes its predecessor's selling
/// price, and each selling price is re-derived from that level's own sticky
/// discount percentage.
pub fn recompute_chain(
    anchor: Decimal,
    levels: &mut [price_scheme::Model],
) -> Result<(), ServiceError> {
    let mut purchase = round2(anchor);
    for level in levels.iter_mut() {
        let selling = derive_selling(purchase, level.discount_percentage)?;
        level.purchase_price = purchase;
        level.selling_price = selling;
        level.profit_amount = round2(selling - purchase);
        purchase = selling;
    }
    Ok(())
}

#[derive(Clone)]
pub struct PriceSchemeService {
    db: Arc<DatabaseConnection>,
}

impl PriceSchemeService {
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

    async fn owned_scheme(
        &self,
        user_id: i64,
        scheme_id: i64,
    ) -> Result<price_scheme::Model, ServiceError> {
        PriceSchemeEntity::find_by_id(scheme_id)
            .filter(price_scheme::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Price scheme not found".to_string()))
    }

    /// Appends a new highest level to the product's chain and updates the
    /// product's current selling price.
    #[instrument(skip(self, input), fields(product_id = input.product_id))]
    pub async fn create(
        &self,
        user_id: i64,
        input: NewPriceLevel,
    ) -> Result<price_scheme::Model, ServiceError> {
        let product = self.owned_product(user_id, input.product_id).await?;

        let txn = self.db.begin().await?;

        let last = PriceSchemeEntity::find()
            .filter(price_scheme::Column::ProductId.eq(product.id))
            .order_by_desc(price_scheme::Column::LevelOrder)
            .one(&txn)
            .await?;

        let (level_order, purchase) = match &last {
            Some(prev) => (prev.level_order + 1, prev.selling_price),
            None => {
                let anchor = product.hpp.or(input.purchase_price).ok_or_else(|| {
                    ServiceError::validation(
                        "purchase_price",
                        "The purchase price is required for the first level",
                    )
                })?;
                (1, anchor)
            }
        };

        let resolved = resolve_level(purchase, input.discount_percentage, input.selling_price)?;

        let now = Utc::now();
        let created = price_scheme::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product.id),
            level_name: Set(input.level_name),
            level_order: Set(level_order),
            discount_percentage: Set(resolved.discount_percentage),
            purchase_price: Set(resolved.purchase_price),
            selling_price: Set(resolved.selling_price),
            profit_amount: Set(resolved.profit_amount),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // The chain's top level is always the product's current sale price.
        let mut product_active: product::ActiveModel = product.into();
        product_active.selling_price = Set(Some(resolved.selling_price));
        product_active.updated_at = Set(Some(now));
        product_active.update(&txn).await?;

        txn.commit().await?;

        info!(
            scheme_id = created.id,
            level_order = created.level_order,
            "price level created"
        );
        Ok(created)
    }

    /// Updates one level and cascades the recomputation through every
    /// subsequent level.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        user_id: i64,
        scheme_id: i64,
        changes: PriceLevelChanges,
    ) -> Result<price_scheme::Model, ServiceError> {
        let target = self.owned_scheme(user_id, scheme_id).await?;
        let product = self.owned_product(user_id, target.product_id).await?;

        let txn = self.db.begin().await?;

        let mut levels = PriceSchemeEntity::find()
            .filter(price_scheme::Column::ProductId.eq(product.id))
            .order_by_asc(price_scheme::Column::LevelOrder)
            .all(&txn)
            .await?;

        let idx = levels
            .iter()
            .position(|l| l.id == scheme_id)
            .ok_or_else(|| ServiceError::NotFound("Price scheme not found".to_string()))?;

        if let Some(name) = changes.level_name {
            levels[idx].level_name = name;
        }
        if let Some(notes) = changes.notes {
            levels[idx].notes = Some(notes);
        }

        // Anchor for the edited level: predecessor's selling price, or the
        // HPP / explicit purchase price when it is the first level.
        let purchase = if idx == 0 {
            product
                .hpp
                .or(changes.purchase_price)
                .unwrap_or(levels[0].purchase_price)
        } else {
            levels[idx - 1].selling_price
        };

        let resolved = match (changes.discount_percentage, changes.selling_price) {
            // Discounts are sticky: with no pricing input the level keeps its
            // own discount and re-derives the rest from the anchor.
            (None, None) => {
                let disc = levels[idx].discount_percentage;
                resolve_level(purchase, Some(disc), None)?
            }
            (discount, selling) => resolve_level(purchase, discount, selling)?,
        };
        apply_resolved(&mut levels[idx], resolved);

        recompute_chain(resolved.selling_price, &mut levels[idx + 1..])?;

        let now = Utc::now();
        for level in &levels[idx..] {
            let mut active: price_scheme::ActiveModel = level.clone().into();
            active.level_name = Set(level.level_name.clone());
            active.notes = Set(level.notes.clone());
            active.discount_percentage = Set(level.discount_percentage);
            active.purchase_price = Set(level.purchase_price);
            active.selling_price = Set(level.selling_price);
            active.profit_amount = Set(level.profit_amount);
            active.updated_at = Set(Some(now));
            active.update(&txn).await?;
        }

        let top_price = levels
            .last()
            .map(|l| l.selling_price)
            .unwrap_or(resolved.selling_price);
        let mut product_active: product::ActiveModel = product.into();
        product_active.selling_price = Set(Some(top_price));
        product_active.updated_at = Set(Some(now));
        product_active.update(&txn).await?;

        txn.commit().await?;

        let updated = levels[idx].clone();
        info!(scheme_id, "price level updated");
        Ok(updated)
    }

    /// Deletes one level, restores contiguous ordering, and cascades the
    /// recomputation through the remaining chain.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, scheme_id: i64) -> Result<(), ServiceError> {
        let target = self.owned_scheme(user_id, scheme_id).await?;
        let product = self.owned_product(user_id, target.product_id).await?;

        let txn = self.db.begin().await?;

        let mut levels = PriceSchemeEntity::find()
            .filter(price_scheme::Column::ProductId.eq(product.id))
            .order_by_asc(price_scheme::Column::LevelOrder)
            .all(&txn)
            .await?;

        let idx = levels
            .iter()
            .position(|l| l.id == scheme_id)
            .ok_or_else(|| ServiceError::NotFound("Price scheme not found".to_string()))?;
        let removed = levels.remove(idx);
        removed.clone().delete(&txn).await?;

        for (pos, level) in levels.iter_mut().enumerate() {
            level.level_order = (pos + 1) as i32;
        }

        let now = Utc::now();
        if levels.is_empty() {
            // The chain emptied; the product falls back to selling at cost.
            let mut product_active: product::ActiveModel = product.clone().into();
            product_active.selling_price = Set(product.hpp);
            product_active.updated_at = Set(Some(now));
            product_active.update(&txn).await?;
        } else {
            // A newly-first level re-anchors to HPP; without an HPP it keeps
            // the purchase price it already had.
            let anchor = product.hpp.unwrap_or(levels[0].purchase_price);
            recompute_chain(anchor, &mut levels)?;

            for level in &levels {
                let mut active: price_scheme::ActiveModel = level.clone().into();
                active.level_order = Set(level.level_order);
                active.purchase_price = Set(level.purchase_price);
                active.selling_price = Set(level.selling_price);
                active.profit_amount = Set(level.profit_amount);
                active.updated_at = Set(Some(now));
                active.update(&txn).await?;
            }

            let top_price = levels[levels.len() - 1].selling_price;
            let mut product_active: product::ActiveModel = product.into();
            product_active.selling_price = Set(Some(top_price));
            product_active.updated_at = Set(Some(now));
            product_active.update(&txn).await?;
        }

        txn.commit().await?;

        info!(scheme_id, "price level deleted");
        Ok(())
    }

    /// Lists the chain for the requested product, or for the caller's
    /// earliest-created product when none is specified.
    pub async fn list(
        &self,
        user_id: i64,
        product_id: Option<i64>,
    ) -> Result<SchemeListing, ServiceError> {
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
                    None => return Ok(SchemeListing::NoProducts),
                }
            }
        };

        let levels = PriceSchemeEntity::find()
            .filter(price_scheme::Column::ProductId.eq(product.id))
            .order_by_asc(price_scheme::Column::LevelOrder)
            .all(&*self.db)
            .await?;

        Ok(SchemeListing::Chain { product, levels })
    }

    pub async fn get(
        &self,
        user_id: i64,
        scheme_id: i64,
    ) -> Result<price_scheme::Model, ServiceError> {
        self.owned_scheme(user_id, scheme_id).await
    }
}

fn apply_resolved(level: &mut price_scheme::Model, resolved: ResolvedLevel) {
    level.discount_percentage = resolved.discount_percentage;
    level.purchase_price = resolved.purchase_price;
    level.selling_price = resolved.selling_price;
    level.profit_amount = resolved.profit_amount;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn chain_level(order: i32, discount: Decimal) -> price_scheme::Model {
        price_scheme::Model {
            id: order as i64,
            user_id: 1,
            product_id: 1,
            level_name: format!("Level {}", order),
            level_order: order,
            discount_percentage: discount,
            purchase_price: Decimal::ZERO,
            selling_price: Decimal::ZERO,
            profit_amount: Decimal::ZERO,
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn ten_percent_margin_on_a_100_cost() {
        let resolved = resolve_level(dec!(100), Some(dec!(10)), None).unwrap();
        assert_eq!(resolved.purchase_price, dec!(100.00));
        assert_eq!(resolved.selling_price, dec!(111.11));
        assert_eq!(resolved.profit_amount, dec!(11.11));
    }

    #[test]
    fn five_percent_margin_on_a_120_anchor() {
        let resolved = resolve_level(dec!(120), Some(dec!(5)), None).unwrap();
        assert_eq!(resolved.selling_price, dec!(126.32));
    }

    #[test]
    fn explicit_selling_price_back_derives_the_discount() {
        let resolved = resolve_level(dec!(120), None, Some(dec!(150))).unwrap();
        assert_eq!(resolved.discount_percentage, dec!(20.00));
        assert_eq!(resolved.selling_price, dec!(150.00));
        assert_eq!(resolved.profit_amount, dec!(30.00));
    }

    #[test]
    fn no_pricing_input_means_zero_markup() {
        let resolved = resolve_level(dec!(80), None, None).unwrap();
        assert_eq!(resolved.discount_percentage, dec!(0.00));
        assert_eq!(resolved.selling_price, dec!(80.00));
        assert_eq!(resolved.profit_amount, dec!(0.00));
    }

    #[test]
    fn full_discount_is_rejected() {
        assert!(derive_selling(dec!(100), dec!(100)).is_err());
        assert!(resolve_level(dec!(100), Some(dec!(150)), None).is_err());
    }

    #[test]
    fn cascade_links_each_purchase_to_the_previous_selling() {
        let mut levels = vec![
            chain_level(1, dec!(10)),
            chain_level(2, dec!(5)),
            chain_level(3, dec!(20)),
        ];
        recompute_chain(dec!(100), &mut levels).unwrap();

        assert_eq!(levels[0].purchase_price, dec!(100.00));
        assert_eq!(levels[0].selling_price, dec!(111.11));
        assert_eq!(levels[1].purchase_price, dec!(111.11));
        assert_eq!(levels[2].purchase_price, levels[1].selling_price);
        for level in &levels {
            assert_eq!(
                level.profit_amount,
                level.selling_price - level.purchase_price
            );
        }
    }

    #[test]
    fn cascade_over_an_empty_chain_is_a_no_op() {
        let mut levels: Vec<price_scheme::Model> = vec![];
        recompute_chain(dec!(100), &mut levels).unwrap();
        assert!(levels.is_empty());
    }
}
