use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
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
pub struct NewExpenseCategory {
    pub name: String,
    pub description: Option<String>,
    pub is_salary: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ExpenseCategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_salary: Option<bool>,
}

/// A category with its aggregated expense total. Salary categories also
/// report how many expense entries (employees) they carry.
pub struct CategoryOverview {
    pub category: expense_category::Model,
    pub total_amount: Decimal,
    pub total_employees: Option<u64>,
}

pub struct CategoryTotals {
    pub total_salary: Decimal,
    pub total_operational: Decimal,
    pub grand_total: Decimal,
}

#[derive(Clone)]
pub struct ExpenseCategoryService {
    db: Arc<DatabaseConnection>,
}

impl ExpenseCategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists the caller's categories with per-category totals and an
    /// overall salary/operational split.
    pub async fn list(
        &self,
        user_id: i64,
    ) -> Result<(Vec<CategoryOverview>, CategoryTotals), ServiceError> {
        let categories = ExpenseCategoryEntity::find()
            .filter(expense_category::Column::UserId.eq(user_id))
            .order_by_asc(expense_category::Column::Id)
            .all(&*self.db)
            .await?;

        let expenses = OperationalExpenseEntity::find()
            .filter(operational_expense::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await?;

        let mut total_salary = Decimal::ZERO;
        let mut total_operational = Decimal::ZERO;
        let mut overviews = Vec::with_capacity(categories.len());

        for category in categories {
            let own: Vec<_> = expenses
                .iter()
                .filter(|e| e.expense_category_id == category.id)
                .collect();
            let total_amount: Decimal = own.iter().map(|e| e.total_amount).sum();

            if category.is_salary {
                total_salary += total_amount;
            } else {
                total_operational += total_amount;
            }

            let total_employees = category.is_salary.then(|| own.len() as u64);
            overviews.push(CategoryOverview {
                category,
                total_amount: round2(total_amount),
                total_employees,
            });
        }

        let totals = CategoryTotals {
            total_salary: round2(total_salary),
            total_operational: round2(total_operational),
            grand_total: round2(total_salary + total_operational),
        };
        Ok((overviews, totals))
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        user_id: i64,
        input: NewExpenseCategory,
    ) -> Result<expense_category::Model, ServiceError> {
        let created = expense_category::ActiveModel {
            user_id: Set(user_id),
            name: Set(input.name),
            description: Set(input.description),
            is_salary: Set(input.is_salary),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(category_id = created.id, "expense category created");
        Ok(created)
    }

    pub async fn get(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> Result<CategoryOverview, ServiceError> {
        let category = self.find_owned(user_id, category_id).await?;

        let expenses = OperationalExpenseEntity::find()
            .filter(operational_expense::Column::UserId.eq(user_id))
            .filter(operational_expense::Column::ExpenseCategoryId.eq(category.id))
            .all(&*self.db)
            .await?;

        let total_amount: Decimal = expenses.iter().map(|e| e.total_amount).sum();
        let total_employees = category.is_salary.then(|| expenses.len() as u64);

        Ok(CategoryOverview {
            category,
            total_amount: round2(total_amount),
            total_employees,
        })
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        user_id: i64,
        category_id: i64,
        changes: ExpenseCategoryChanges,
    ) -> Result<expense_category::Model, ServiceError> {
        let existing = self.find_owned(user_id, category_id).await?;

        let mut active: expense_category::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(is_salary) = changes.is_salary {
            active.is_salary = Set(is_salary);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(category_id, "expense category updated");
        Ok(updated)
    }

    /// Deletes a category. Blocked while it still has expense items.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, category_id: i64) -> Result<(), ServiceError> {
        let existing = self.find_owned(user_id, category_id).await?;

        let expenses = OperationalExpenseEntity::find()
            .filter(operational_expense::Column::ExpenseCategoryId.eq(category_id))
            .count(&*self.db)
            .await?;
        if expenses > 0 {
            return Err(ServiceError::Conflict(
                "Expense category still has expense items".to_string(),
            ));
        }

        existing.delete(&*self.db).await?;
        info!(category_id, "expense category deleted");
        Ok(())
    }

    async fn find_owned(
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
}
