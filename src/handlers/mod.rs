pub mod auth;
pub mod common;
pub mod cost_components;
pub mod expense_categories;
pub mod operational_expenses;
pub mod price_schemes;
pub mod product_costs;
pub mod products;
pub mod sales_records;
pub mod stats;

use axum::{middleware, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::{
    auth::{require_auth, AuthService},
    services::AppServices,
};

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, auth: AuthService) -> Self {
        Self {
            services: AppServices::new(db.clone()),
            db,
            auth,
        }
    }
}

/// Builds the `/api` router: public auth endpoints plus every resource
/// route behind the token middleware.
pub fn api_routes(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/products", products::routes())
        .nest("/cost-components", cost_components::routes())
        .nest("/hpp", product_costs::routes())
        .nest("/price-schemes", price_schemes::routes())
        .nest("/expense-categories", expense_categories::routes())
        .nest("/operational-expenses", operational_expenses::routes())
        .nest("/sales", sales_records::routes())
        .nest("/stats", stats::routes())
        .merge(auth::protected_routes())
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_auth,
        ));

    Router::new()
        .nest("/api", auth::public_routes().merge(protected))
        .with_state(state)
}
