use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;

use super::common::{success_response, PeriodQuery};
use crate::{
    auth::AuthUser, errors::ServiceError, handlers::AppState,
    services::operational_expenses::current_period,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(stats))
}

async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    query.validate()?;

    let (current_year, current_month) = current_period();
    let year = query.year.unwrap_or(current_year);
    let month = query.month.unwrap_or(current_month);

    let stats = state
        .services
        .stats
        .profitability(user.user_id, year, month)
        .await?;

    Ok(success_response(json!({
        "success": true,
        "data": {
            "total_sales": stats.total_sales,
            "total_cost": stats.total_cost,
            "total_variable_cost": stats.total_variable_cost,
            "total_operational_cost": stats.total_operational_cost,
            "total_salary_expenses": stats.total_salary_expenses,
            "gross_profit": stats.gross_profit,
            "net_profit": stats.net_profit,
            "year": stats.year,
            "month": stats.month,
            "availableYears": stats.available_years,
            "availableMonths": stats.available_months,
        }
    })))
}
