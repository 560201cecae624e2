use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    entities::{
        product::{self, Entity as ProductEntity},
        sales_record::{self, Entity as SalesRecordEntity},
    },
    errors::ServiceError,
    services::{money::round2, operational_expenses::current_period},
};

#[derive(Clone, Debug)]
pub struct NewSalesRecord {
    pub product_id: i64,
    pub year: i32,
    pub month: i32,
    pub number_of_sales: i32,
    pub hpp: Decimal,
    pub selling_price: Decimal,
}

#[derive(Clone, Debug, Default)]
pub struct SalesRecordChanges {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub number_of_sales: Option<i32>,
    pub hpp: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

/// A record joined with its product name and its share of the period's
/// profit.
pub struct SalesRow {
    pub record: sales_record::Model,
    pub product_name: String,
    pub profit_contribution_percentage: f64,
}

pub struct SalesSummary {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_profit_percentage: f64,
    pub year: i32,
    pub month: i32,
}

pub struct SalesListing {
    pub rows: Vec<SalesRow>,
    pub summary: SalesSummary,
}

/// A single record with its derived per-unit and per-period figures.
pub struct SalesDetail {
    pub record: sales_record::Model,
    pub product_name: String,
    pub profit_unit: f64,
    pub profit_percentage: i64,
    pub sub_total: f64,
    pub total_profit: f64,
    pub profit_contribution_percentage: f64,
}

fn record_profit(record: &sales_record::Model) -> Decimal {
    (record.selling_price - record.hpp) * Decimal::from(record.number_of_sales)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn percentage(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        0.0
    } else {
        to_f64(round2(part / whole * Decimal::from(100)))
    }
}

#[derive(Clone)]
pub struct SalesRecordService {
    db: Arc<DatabaseConnection>,
}

impl SalesRecordService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists one period's records (defaulting to the current month) with
    /// revenue/profit totals and each record's profit contribution.
    pub async fn list(
        &self,
        user_id: i64,
        year: Option<i32>,
        month: Option<i32>,
    ) -> Result<SalesListing, ServiceError> {
        let (current_year, current_month) = current_period();
        let year = year.unwrap_or(current_year);
        let month = month.unwrap_or(current_month);

        let records = SalesRecordEntity::find()
            .filter(sales_record::Column::UserId.eq(user_id))
            .filter(sales_record::Column::Year.eq(year))
            .filter(sales_record::Column::Month.eq(month))
            .order_by_asc(sales_record::Column::Id)
            .all(&*self.db)
            .await?;

        let product_names = self.product_names(user_id).await?;

        let total_sales: Decimal = records
            .iter()
            .map(|r| r.selling_price * Decimal::from(r.number_of_sales))
            .sum();
        let total_profit: Decimal = records.iter().map(record_profit).sum();

        let rows = records
            .into_iter()
            .map(|record| {
                let contribution = percentage(record_profit(&record), total_profit);
                let product_name = product_names
                    .get(&record.product_id)
                    .cloned()
                    .unwrap_or_default();
                SalesRow {
                    record,
                    product_name,
                    profit_contribution_percentage: contribution,
                }
            })
            .collect();

        Ok(SalesListing {
            rows,
            summary: SalesSummary {
                total_sales: to_f64(total_sales),
                total_profit: to_f64(total_profit),
                total_profit_percentage: percentage(total_profit, total_sales),
                year,
                month,
            },
        })
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        user_id: i64,
        input: NewSalesRecord,
    ) -> Result<sales_record::Model, ServiceError> {
        self.owned_product(user_id, input.product_id).await?;

        let duplicate = SalesRecordEntity::find()
            .filter(sales_record::Column::ProductId.eq(input.product_id))
            .filter(sales_record::Column::Year.eq(input.year))
            .filter(sales_record::Column::Month.eq(input.month))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(
                "A sales record for this product already exists in the requested period"
                    .to_string(),
            ));
        }

        let created = sales_record::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(input.product_id),
            year: Set(input.year),
            month: Set(input.month),
            number_of_sales: Set(input.number_of_sales),
            hpp: Set(round2(input.hpp)),
            selling_price: Set(round2(input.selling_price)),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(record_id = created.id, "sales record created");
        Ok(created)
    }

    /// Fetches one record with its derived figures, including its profit
    /// contribution relative to all of the caller's sales in the same
    /// period.
    pub async fn get(&self, user_id: i64, record_id: i64) -> Result<SalesDetail, ServiceError> {
        let record = self.find_owned(user_id, record_id).await?;

        let peers = SalesRecordEntity::find()
            .filter(sales_record::Column::UserId.eq(user_id))
            .filter(sales_record::Column::Year.eq(record.year))
            .filter(sales_record::Column::Month.eq(record.month))
            .all(&*self.db)
            .await?;
        let period_profit: Decimal = peers.iter().map(record_profit).sum();

        let product_name = self
            .product_names(user_id)
            .await?
            .get(&record.product_id)
            .cloned()
            .unwrap_or_default();

        let profit_unit = record.selling_price - record.hpp;
        let profit_percentage = if record.selling_price.is_zero() {
            0
        } else {
            (profit_unit / record.selling_price * Decimal::from(100))
                .round()
                .to_i64()
                .unwrap_or(0)
        };
        let total_profit = record_profit(&record);

        Ok(SalesDetail {
            product_name,
            profit_unit: to_f64(profit_unit),
            profit_percentage,
            sub_total: to_f64(record.selling_price * Decimal::from(record.number_of_sales)),
            total_profit: to_f64(total_profit),
            profit_contribution_percentage: percentage(total_profit, period_profit),
            record,
        })
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        user_id: i64,
        record_id: i64,
        changes: SalesRecordChanges,
    ) -> Result<sales_record::Model, ServiceError> {
        let mut existing = self.find_owned(user_id, record_id).await?;

        if let Some(year) = changes.year {
            existing.year = year;
        }
        if let Some(month) = changes.month {
            existing.month = month;
        }

        let duplicate = SalesRecordEntity::find()
            .filter(sales_record::Column::ProductId.eq(existing.product_id))
            .filter(sales_record::Column::Year.eq(existing.year))
            .filter(sales_record::Column::Month.eq(existing.month))
            .filter(sales_record::Column::Id.ne(record_id))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(
                "A sales record for this product already exists in the requested period"
                    .to_string(),
            ));
        }

        if let Some(number_of_sales) = changes.number_of_sales {
            existing.number_of_sales = number_of_sales;
        }
        if let Some(hpp) = changes.hpp {
            existing.hpp = round2(hpp);
        }
        if let Some(selling_price) = changes.selling_price {
            existing.selling_price = round2(selling_price);
        }

        let mut active: sales_record::ActiveModel = existing.clone().into();
        active.year = Set(existing.year);
        active.month = Set(existing.month);
        active.number_of_sales = Set(existing.number_of_sales);
        active.hpp = Set(existing.hpp);
        active.selling_price = Set(existing.selling_price);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(record_id, "sales record updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, record_id: i64) -> Result<(), ServiceError> {
        let existing = self.find_owned(user_id, record_id).await?;
        existing.delete(&*self.db).await?;
        info!(record_id, "sales record deleted");
        Ok(())
    }

    async fn find_owned(
        &self,
        user_id: i64,
        record_id: i64,
    ) -> Result<sales_record::Model, ServiceError> {
        SalesRecordEntity::find_by_id(record_id)
            .filter(sales_record::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Sales record not found".to_string()))
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
            .ok_or_else(|| {
                ServiceError::NotFound("Product not found or not owned by you".to_string())
            })
    }

    async fn product_names(&self, user_id: i64) -> Result<HashMap<i64, String>, ServiceError> {
        let products = ProductEntity::find()
            .filter(product::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await?;
        Ok(products.into_iter().map(|p| (p.id, p.name)).collect())
    }
}
