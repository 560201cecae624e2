use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    entities::{
        expense_category::{self, Entity as ExpenseCategoryEntity},
        operational_expense::{self, Entity as OperationalExpenseEntity},
        sales_record::{self, Entity as SalesRecordEntity},
    },
    errors::ServiceError,
};

/// Profitability figures for one period. Aggregates are plain numbers, not
/// fixed-decimal strings.
pub struct ProfitabilityStats {
    pub total_sales: f64,
    pub total_cost: f64,
    pub total_variable_cost: f64,
    pub total_operational_cost: f64,
    pub total_salary_expenses: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub year: i32,
    pub month: i32,
    pub available_years: Vec<i32>,
    pub available_months: Vec<i32>,
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[derive(Clone)]
pub struct StatsService {
    db: Arc<DatabaseConnection>,
}

impl StatsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Computes revenue, variable cost, expense split, and profit for one
    /// period, plus the periods for which data exists.
    pub async fn profitability(
        &self,
        user_id: i64,
        year: i32,
        month: i32,
    ) -> Result<ProfitabilityStats, ServiceError> {
        let all_records = SalesRecordEntity::find()
            .filter(sales_record::Column::UserId.eq(user_id))
            .order_by_asc(sales_record::Column::Year)
            .all(&*self.db)
            .await?;

        let mut available_years: Vec<i32> = all_records.iter().map(|r| r.year).collect();
        available_years.sort_unstable();
        available_years.dedup();
        available_years.reverse();

        let mut available_months: Vec<i32> = all_records
            .iter()
            .filter(|r| r.year == year)
            .map(|r| r.month)
            .collect();
        available_months.sort_unstable();
        available_months.dedup();

        let period_records: Vec<_> = all_records
            .iter()
            .filter(|r| r.year == year && r.month == month)
            .collect();

        let total_sales: Decimal = period_records
            .iter()
            .map(|r| r.selling_price * Decimal::from(r.number_of_sales))
            .sum();
        let total_variable_cost: Decimal = period_records
            .iter()
            .map(|r| r.hpp * Decimal::from(r.number_of_sales))
            .sum();

        let (total_salary, total_operational) =
            self.expense_split(user_id, year, month).await?;

        let total_cost = total_variable_cost + total_operational + total_salary;
        let gross_profit = total_sales - total_variable_cost;
        let net_profit = gross_profit - total_operational - total_salary;

        Ok(ProfitabilityStats {
            total_sales: to_f64(total_sales),
            total_cost: to_f64(total_cost),
            total_variable_cost: to_f64(total_variable_cost),
            total_operational_cost: to_f64(total_operational),
            total_salary_expenses: to_f64(total_salary),
            gross_profit: to_f64(gross_profit),
            net_profit: to_f64(net_profit),
            year,
            month,
            available_years,
            available_months,
        })
    }

    /// Sums one period's expenses, split into salary and non-salary
    /// categories.
    async fn expense_split(
        &self,
        user_id: i64,
        year: i32,
        month: i32,
    ) -> Result<(Decimal, Decimal), ServiceError> {
        let categories = ExpenseCategoryEntity::find()
            .filter(expense_category::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await?;
        let salary_flags: HashMap<i64, bool> =
            categories.iter().map(|c| (c.id, c.is_salary)).collect();

        let expenses = OperationalExpenseEntity::find()
            .filter(operational_expense::Column::UserId.eq(user_id))
            .filter(operational_expense::Column::Year.eq(year))
            .filter(operational_expense::Column::Month.eq(month))
            .all(&*self.db)
            .await?;

        let mut salary = Decimal::ZERO;
        let mut operational = Decimal::ZERO;
        for expense in expenses {
            if salary_flags
                .get(&expense.expense_category_id)
                .copied()
                .unwrap_or(false)
            {
                salary += expense.total_amount;
            } else {
                operational += expense.total_amount;
            }
        }
        Ok((salary, operational))
    }
}
