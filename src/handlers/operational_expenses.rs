use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::common::{created_response, success_response, FieldErrors, PeriodQuery};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::AppState,
    services::operational_expenses::{ExpenseChanges, NewExpense},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses))
        .route("/", post(create_expense))
        .route("/:id", get(get_expense))
        .route("/:id", put(update_expense))
        .route("/:id", delete(delete_expense))
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub expense_category_id: Option<i64>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub expense_category_id: Option<i64>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

fn validate_create(payload: &CreateExpenseRequest) -> Result<(), ServiceError> {
    let mut errors = FieldErrors::new();
    if payload.expense_category_id.is_none() {
        errors.add(
            "expense_category_id",
            "The expense category field is required",
        );
    }
    match &payload.unit {
        Some(unit) if !unit.trim().is_empty() => {}
        _ => errors.add("unit", "The unit field is required"),
    }
    match payload.quantity {
        Some(q) if q > Decimal::ZERO => {}
        Some(_) => errors.add("quantity", "The quantity must be greater than zero"),
        None => errors.add("quantity", "The quantity field is required"),
    }
    match payload.amount {
        Some(a) if a >= Decimal::ZERO => {}
        Some(_) => errors.add("amount", "The amount must not be negative"),
        None => errors.add("amount", "The amount field is required"),
    }
    PeriodQuery {
        year: payload.year,
        month: payload.month,
    }
    .validate()
    .and(errors.into_result())
}

async fn list_expenses(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    query.validate()?;

    let listing = state
        .services
        .operational_expenses
        .list(user.user_id, query.year, query.month)
        .await?;

    Ok(success_response(json!({
        "success": true,
        "data": listing.expenses,
        "summary": {
            "total_salary": decimal_num(listing.total_salary),
            "total_operational": decimal_num(listing.total_operational),
            "grand_total": decimal_num(listing.grand_total),
            "year": listing.year,
            "month": listing.month,
        },
        "filters": {
            "current_year": listing.year,
            "current_month": listing.month,
        }
    })))
}

// Period summary totals are numbers; only entity money fields are strings.
fn decimal_num(value: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    value.to_f64().unwrap_or(0.0)
}

async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_create(&payload)?;

    let created = state
        .services
        .operational_expenses
        .create(
            user.user_id,
            NewExpense {
                expense_category_id: payload.expense_category_id.unwrap_or_default(),
                name: payload.name,
                unit: payload.unit.unwrap_or_default(),
                quantity: payload.quantity.unwrap_or_default(),
                amount: payload.amount.unwrap_or_default(),
                year: payload.year,
                month: payload.month,
            },
        )
        .await?;

    Ok(created_response(json!({
        "success": true,
        "message": "Operational expense created successfully",
        "data": created
    })))
}

async fn get_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let expense = state
        .services
        .operational_expenses
        .get(user.user_id, id)
        .await?;
    Ok(success_response(json!({
        "success": true,
        "data": expense
    })))
}

async fn update_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    if let Some(q) = payload.quantity {
        if q <= Decimal::ZERO {
            errors.add("quantity", "The quantity must be greater than zero");
        }
    }
    if let Some(a) = payload.amount {
        if a < Decimal::ZERO {
            errors.add("amount", "The amount must not be negative");
        }
    }
    errors.into_result()?;
    PeriodQuery {
        year: payload.year,
        month: payload.month,
    }
    .validate()?;

    let updated = state
        .services
        .operational_expenses
        .update(
            user.user_id,
            id,
            ExpenseChanges {
                expense_category_id: payload.expense_category_id,
                name: payload.name,
                unit: payload.unit,
                quantity: payload.quantity,
                amount: payload.amount,
                year: payload.year,
                month: payload.month,
            },
        )
        .await?;

    Ok(success_response(json!({
        "success": true,
        "message": "Operational expense updated successfully",
        "data": updated
    })))
}

async fn delete_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .operational_expenses
        .delete(user.user_id, id)
        .await?;
    Ok(success_response(json!({
        "success": true,
        "message": "Operational expense deleted successfully"
    })))
}
