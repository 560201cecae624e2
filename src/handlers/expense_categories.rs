use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::common::{created_response, money_str, success_response, validate_input};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::AppState,
    services::expense_categories::{
        CategoryOverview, ExpenseCategoryChanges, NewExpenseCategory,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/", post(create_category))
        .route("/:id", get(get_category))
        .route("/:id", put(update_category))
        .route("/:id", delete(delete_category))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required"))]
    pub name: String,
    pub description: Option<String>,
    pub is_salary: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_salary: Option<bool>,
}

/// Category plus its aggregate fields, flattened into one JSON object.
fn overview_json(overview: CategoryOverview) -> Value {
    let mut value = json!(overview.category);
    if let Value::Object(map) = &mut value {
        map.insert(
            "total_amount".to_string(),
            Value::String(money_str(overview.total_amount)),
        );
        if let Some(count) = overview.total_employees {
            map.insert("total_employees".to_string(), json!(count));
        }
    }
    value
}

async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let (overviews, totals) = state
        .services
        .expense_categories
        .list(user.user_id)
        .await?;

    let data: Vec<Value> = overviews.into_iter().map(overview_json).collect();

    Ok(success_response(json!({
        "success": true,
        "data": data,
        "summary": {
            "total_salary": money_str(totals.total_salary),
            "total_operational": money_str(totals.total_operational),
            "grand_total": money_str(totals.grand_total),
        }
    })))
}

async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let is_salary = payload.is_salary.ok_or_else(|| {
        ServiceError::validation("is_salary", "The is salary field is required")
    })?;

    let created = state
        .services
        .expense_categories
        .create(
            user.user_id,
            NewExpenseCategory {
                name: payload.name,
                description: payload.description,
                is_salary,
            },
        )
        .await?;

    Ok(created_response(json!({
        "success": true,
        "message": "Expense category created successfully",
        "data": created
    })))
}

async fn get_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let overview = state
        .services
        .expense_categories
        .get(user.user_id, id)
        .await?;
    Ok(success_response(json!({
        "success": true,
        "data": overview_json(overview)
    })))
}

async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .expense_categories
        .update(
            user.user_id,
            id,
            ExpenseCategoryChanges {
                name: payload.name,
                description: payload.description,
                is_salary: payload.is_salary,
            },
        )
        .await?;

    Ok(success_response(json!({
        "success": true,
        "message": "Expense category updated successfully",
        "data": updated
    })))
}

async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .expense_categories
        .delete(user.user_id, id)
        .await?;
    Ok(success_response(json!({
        "success": true,
        "message": "Expense category deleted successfully"
    })))
}
