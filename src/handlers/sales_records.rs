use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use super::common::{created_response, success_response, FieldErrors, PeriodQuery};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::AppState,
    services::sales_records::{NewSalesRecord, SalesRecordChanges, SalesRow},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_records))
        .route("/", post(create_record))
        .route("/:id", get(get_record))
        .route("/:id", put(update_record))
        .route("/:id", delete(delete_record))
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub product_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub number_of_sales: Option<i32>,
    pub hpp: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub number_of_sales: Option<i32>,
    pub hpp: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

fn row_json(row: SalesRow) -> Value {
    let mut value = json!(row.record);
    if let Value::Object(map) = &mut value {
        map.insert("product_name".to_string(), json!(row.product_name));
        map.insert(
            "profit_contribution_percentage".to_string(),
            json!(row.profit_contribution_percentage),
        );
    }
    value
}

async fn list_records(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    query.validate()?;

    let listing = state
        .services
        .sales_records
        .list(user.user_id, query.year, query.month)
        .await?;

    let data: Vec<Value> = listing.rows.into_iter().map(row_json).collect();
    let summary = listing.summary;

    Ok(success_response(json!({
        "success": true,
        "data": data,
        "summary": {
            "total_sales": summary.total_sales,
            "total_profit": summary.total_profit,
            "total_profit_percentage": summary.total_profit_percentage,
            "year": summary.year,
            "month": summary.month,
        },
        "filters": {
            "current_year": summary.year,
            "current_month": summary.month,
        }
    })))
}

async fn create_record(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRecordRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    if payload.product_id.is_none() {
        errors.add("product_id", "The product id field is required");
    }
    match payload.year {
        Some(year) if (2000..=2900).contains(&year) => {}
        Some(_) => errors.add("year", "The year must be between 2000 and 2900"),
        None => errors.add("year", "The year field is required"),
    }
    match payload.month {
        Some(month) if (1..=12).contains(&month) => {}
        Some(_) => errors.add("month", "The month must be between 1 and 12"),
        None => errors.add("month", "The month field is required"),
    }
    match payload.number_of_sales {
        Some(n) if n >= 0 => {}
        Some(_) => errors.add("number_of_sales", "The number of sales must not be negative"),
        None => errors.add("number_of_sales", "The number of sales field is required"),
    }
    if payload.hpp.is_none() {
        errors.add("hpp", "The hpp field is required");
    }
    if payload.selling_price.is_none() {
        errors.add("selling_price", "The selling price field is required");
    }
    errors.into_result()?;

    let created = state
        .services
        .sales_records
        .create(
            user.user_id,
            NewSalesRecord {
                product_id: payload.product_id.unwrap_or_default(),
                year: payload.year.unwrap_or_default(),
                month: payload.month.unwrap_or_default(),
                number_of_sales: payload.number_of_sales.unwrap_or_default(),
                hpp: payload.hpp.unwrap_or_default(),
                selling_price: payload.selling_price.unwrap_or_default(),
            },
        )
        .await?;

    Ok(created_response(json!({
        "success": true,
        "message": "Sales record created successfully",
        "data": created
    })))
}

async fn get_record(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.sales_records.get(user.user_id, id).await?;

    let mut value = json!(detail.record);
    if let Value::Object(map) = &mut value {
        map.insert("product_name".to_string(), json!(detail.product_name));
        map.insert("profit_unit".to_string(), json!(detail.profit_unit));
        map.insert(
            "profit_percentage".to_string(),
            json!(detail.profit_percentage),
        );
        map.insert("sub_total".to_string(), json!(detail.sub_total));
        map.insert("total_profit".to_string(), json!(detail.total_profit));
        map.insert(
            "profit_contribution_percentage".to_string(),
            json!(detail.profit_contribution_percentage),
        );
    }

    Ok(success_response(json!({
        "success": true,
        "data": value
    })))
}

async fn update_record(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRecordRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    PeriodQuery {
        year: payload.year,
        month: payload.month,
    }
    .validate()?;
    if let Some(n) = payload.number_of_sales {
        if n < 0 {
            return Err(ServiceError::validation(
                "number_of_sales",
                "The number of sales must not be negative",
            ));
        }
    }

    let updated = state
        .services
        .sales_records
        .update(
            user.user_id,
            id,
            SalesRecordChanges {
                year: payload.year,
                month: payload.month,
                number_of_sales: payload.number_of_sales,
                hpp: payload.hpp,
                selling_price: payload.selling_price,
            },
        )
        .await?;

    Ok(success_response(json!({
        "success": true,
        "message": "Sales record updated successfully",
        "data": updated
    })))
}

async fn delete_record(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .sales_records
        .delete(user.user_id, id)
        .await?;
    Ok(success_response(json!({
        "success": true,
        "message": "Sales record deleted successfully"
    })))
}
