use chrono::{Datelike, Utc};
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
        expense_category::{self, Entity as ExpenseCategoryEntity},
        operational_expense::{self, Entity as OperationalExpenseEntity},
    },
    errors::ServiceError,
    services::money::round2,
};

#[derive(Clone, Debug)]
pub struct NewExpense {
    pub expense_category_id: i64,
    pub name: Option<String>,
    pub unit: String,
    pub quantity: Decimal,
    pub amount: Decimal,
    /// Defaults to the current period when omitted.
    pub year: Option<i32>,
    pub month: Option<i32>,
}

#[derive(Clone, Debug, Default)]
pub struct ExpenseChanges {
    pub expense_category_id: Option<i64>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

/// One month's expenses with the salary/operational split for that period.
pub struct ExpenseListing {
    pub expenses: Vec<operational_expense::Model>,
    pub total_salary: Decimal,
    pub total_operational: Decimal,
    pub grand_total: Decimal,
    pub year: i32,
    pub month: i32,
}

pub fn current_period() -> (i32, i32) {
    let now = Utc::now();
    (now.year(), now.month() as i32)
}

#[derive(Clone)]
pub struct OperationalExpenseService {
    db: Arc<DatabaseConnection>,
}

impl OperationalExpenseService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists expenses for one period (defaulting to the current month).
    pub async fn list(
        &self,
        user_id: i64,
        year: Option<i32>,
        month: Option<i32>,
    ) -> Result<ExpenseListing, ServiceError> {
        let (current_year, current_month) = current_period();
        let year = year.unwrap_or(current_year);
        let month = month.unwrap_or(current_month);

        let expenses = OperationalExpenseEntity::find()
            .filter(operational_expense::Column::UserId.eq(user_id))
            .filter(operational_expense::Column::Year.eq(year))
            .filter(operational_expense::Column::Month.eq(month))
            .order_by_asc(operational_expense::Column::Id)
            .all(&*self.db)
            .await?;

        let categories = ExpenseCategoryEntity::find()
            .filter(expense_category::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await?;
        let salary_flags: HashMap<i64, bool> =
            categories.iter().map(|c| (c.id, c.is_salary)).collect();

        let mut total_salary = Decimal::ZERO;
        let mut total_operational = Decimal::ZERO;
        for expense in &expenses {
            if salary_flags
                .get(&expense.expense_category_id)
                .copied()
                .unwrap_or(false)
            {
                total_salary += expense.total_amount;
            } else {
                total_operational += expense.total_amount;
            }
        }

        Ok(ExpenseListing {
            expenses,
            total_salary: round2(total_salary),
            total_operational: round2(total_operational),
            grand_total: round2(total_salary + total_operational),
            year,
            month,
        })
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        user_id: i64,
        input: NewExpense,
    ) -> Result<operational_expense::Model, ServiceError> {
        self.owned_category(user_id, input.expense_category_id)
            .await?;

        let (current_year, current_month) = current_period();
        let year = input.year.unwrap_or(current_year);
        let month = input.month.unwrap_or(current_month);

        self.ensure_period_free(input.expense_category_id, year, month, None)
            .await?;

        let created = operational_expense::ActiveModel {
            user_id: Set(user_id),
            expense_category_id: Set(input.expense_category_id),
            name: Set(input.name),
            unit: Set(input.unit),
            quantity: Set(round2(input.quantity)),
            amount: Set(round2(input.amount)),
            total_amount: Set(round2(input.amount * input.quantity)),
            year: Set(year),
            month: Set(month),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(expense_id = created.id, "operational expense created");
        Ok(created)
    }

    pub async fn get(
        &self,
        user_id: i64,
        expense_id: i64,
    ) -> Result<operational_expense::Model, ServiceError> {
        self.find_owned(user_id, expense_id).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        user_id: i64,
        expense_id: i64,
        changes: ExpenseChanges,
    ) -> Result<operational_expense::Model, ServiceError> {
        let mut existing = self.find_owned(user_id, expense_id).await?;

        if let Some(category_id) = changes.expense_category_id {
            self.owned_category(user_id, category_id).await?;
            existing.expense_category_id = category_id;
        }
        if let Some(year) = changes.year {
            existing.year = year;
        }
        if let Some(month) = changes.month {
            existing.month = month;
        }
        self.ensure_period_free(
            existing.expense_category_id,
            existing.year,
            existing.month,
            Some(expense_id),
        )
        .await?;

        if let Some(name) = changes.name {
            existing.name = Some(name);
        }
        if let Some(unit) = changes.unit {
            existing.unit = unit;
        }
        if let Some(quantity) = changes.quantity {
            existing.quantity = round2(quantity);
        }
        if let Some(amount) = changes.amount {
            existing.amount = round2(amount);
        }
        let total = round2(existing.amount * existing.quantity);

        let mut active: operational_expense::ActiveModel = existing.clone().into();
        active.expense_category_id = Set(existing.expense_category_id);
        active.name = Set(existing.name.clone());
        active.unit = Set(existing.unit.clone());
        active.quantity = Set(existing.quantity);
        active.amount = Set(existing.amount);
        active.total_amount = Set(total);
        active.year = Set(existing.year);
        active.month = Set(existing.month);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(expense_id, "operational expense updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, expense_id: i64) -> Result<(), ServiceError> {
        let existing = self.find_owned(user_id, expense_id).await?;
        existing.delete(&*self.db).await?;
        info!(expense_id, "operational expense deleted");
        Ok(())
    }

    async fn find_owned(
        &self,
        user_id: i64,
        expense_id: i64,
    ) -> Result<operational_expense::Model, ServiceError> {
        OperationalExpenseEntity::find_by_id(expense_id)
            .filter(operational_expense::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Operational expense not found".to_string()))
    }

    async fn owned_category(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> Result<expense_category::Model, ServiceError> {
        ExpenseCategoryEntity::find_by_id(category_id)
            .filter(expense_category::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Expense category not found".to_string()))
    }

    /// One expense row per category per period.
    async fn ensure_period_free(
        &self,
        category_id: i64,
        year: i32,
        month: i32,
        exclude: Option<i64>,
    ) -> Result<(), ServiceError> {
        let mut query = OperationalExpenseEntity::find()
            .filter(operational_expense::Column::ExpenseCategoryId.eq(category_id))
            .filter(operational_expense::Column::Year.eq(year))
            .filter(operational_expense::Column::Month.eq(month));
        if let Some(id) = exclude {
            query = query.filter(operational_expense::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(
                "An expense for this category already exists in the requested period".to_string(),
            ));
        }
        Ok(())
    }
}
