pub mod cost_components;
pub mod expense_categories;
pub mod money;
pub mod operational_expenses;
pub mod price_schemes;
pub mod product_costs;
pub mod products;
pub mod sales_records;
pub mod stats;
pub mod users;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// All domain services, sharing one connection pool.
#[derive(Clone)]
pub struct AppServices {
    pub users: users::UserService,
    pub products: products::ProductService,
    pub cost_components: cost_components::CostComponentService,
    pub product_costs: product_costs::ProductCostService,
    pub price_schemes: price_schemes::PriceSchemeService,
    pub expense_categories: expense_categories::ExpenseCategoryService,
    pub operational_expenses: operational_expenses::OperationalExpenseService,
    pub sales_records: sales_records::SalesRecordService,
    pub stats: stats::StatsService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            users: users::UserService::new(db.clone()),
            products: products::ProductService::new(db.clone()),
            cost_components: cost_components::CostComponentService::new(db.clone()),
            product_costs: product_costs::ProductCostService::new(db.clone()),
            price_schemes: price_schemes::PriceSchemeService::new(db.clone()),
            expense_categories: expense_categories::ExpenseCategoryService::new(db.clone()),
            operational_expenses: operational_expenses::OperationalExpenseService::new(db.clone()),
            sales_records: sales_records::SalesRecordService::new(db.clone()),
            stats: stats::StatsService::new(db),
        }
    }
}
