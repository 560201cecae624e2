use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::common::{created_response, success_response, FieldErrors};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::AppState,
    services::product_costs::{CostLineChanges, CostListing, NewCostLine},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cost_lines))
        .route("/", post(create_cost_lines))
        .route("/:id", get(get_cost_line))
        .route("/:id", put(update_cost_line))
        .route("/:id", delete(delete_cost_line))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub product_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CostEntryRequest {
    pub cost_component_id: Option<i64>,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub conversion_qty: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCostLinesRequest {
    pub product_id: Option<i64>,
    #[serde(default)]
    pub costs: Vec<CostEntryRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCostLineRequest {
    pub cost_component_id: Option<i64>,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub conversion_qty: Option<Decimal>,
}

/// Checks the batch payload field by field, reporting entry errors under
/// dotted keys (`costs.0.unit_price`).
fn validate_batch(payload: &CreateCostLinesRequest) -> Result<Vec<NewCostLine>, ServiceError> {
    let mut errors = FieldErrors::new();

    if payload.product_id.is_none() {
        errors.add("product_id", "The product id field is required");
    }
    if payload.costs.is_empty() {
        errors.add("costs", "The costs field is required");
    }

    let mut entries = Vec::with_capacity(payload.costs.len());
    for (i, entry) in payload.costs.iter().enumerate() {
        let key = |field: &str| format!("costs.{}.{}", i, field);

        if entry.cost_component_id.is_none() {
            errors.add(key("cost_component_id"), "The cost component is required");
        }
        match &entry.unit {
            Some(unit) if !unit.trim().is_empty() => {}
            _ => errors.add(key("unit"), "The unit field is required"),
        }
        match entry.unit_price {
            Some(p) if p >= Decimal::ZERO => {}
            Some(_) => errors.add(key("unit_price"), "The unit price must not be negative"),
            None => errors.add(key("unit_price"), "The unit price field is required"),
        }
        match entry.quantity {
            Some(q) if q > Decimal::ZERO => {}
            Some(_) => errors.add(key("quantity"), "The quantity must be greater than zero"),
            None => errors.add(key("quantity"), "The quantity field is required"),
        }
        match entry.conversion_qty {
            Some(c) if c > Decimal::ZERO => {}
            Some(_) => errors.add(
                key("conversion_qty"),
                "The conversion quantity must be greater than zero",
            ),
            None => errors.add(key("conversion_qty"), "The conversion quantity is required"),
        }

        if let (Some(component), Some(unit), Some(price), Some(qty), Some(conv)) = (
            entry.cost_component_id,
            entry.unit.clone(),
            entry.unit_price,
            entry.quantity,
            entry.conversion_qty,
        ) {
            entries.push(NewCostLine {
                cost_component_id: component,
                unit,
                unit_price: price,
                quantity: qty,
                conversion_qty: conv,
            });
        }
    }

    errors.into_result()?;
    Ok(entries)
}

async fn list_cost_lines(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let listing = state
        .services
        .product_costs
        .list(user.user_id, query.product_id)
        .await?;

    let body = match listing {
        CostListing::NoProducts => json!({
            "success": false,
            "message": "You have no products yet"
        }),
        CostListing::Empty { product } => json!({
            "success": false,
            "message": "This product has no cost lines yet",
            "product": product
        }),
        CostListing::Lines { product, lines } => json!({
            "success": true,
            "data": lines,
            "product": product
        }),
    };
    Ok(success_response(body))
}

async fn create_cost_lines(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCostLinesRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let entries = validate_batch(&payload)?;
    let product_id = payload
        .product_id
        .ok_or_else(|| ServiceError::validation("product_id", "The product id field is required"))?;

    let product = state
        .services
        .product_costs
        .create_batch(user.user_id, product_id, entries)
        .await?;

    Ok(created_response(json!({
        "success": true,
        "message": "Cost lines created successfully",
        "data": product
    })))
}

async fn get_cost_line(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    // Absent ids answer 200 with an empty data array, not 404.
    let body = match state.services.product_costs.get(user.user_id, id).await? {
        Some(line) => json!({ "success": true, "data": line }),
        None => json!({ "success": true, "data": [] }),
    };
    Ok(success_response(body))
}

async fn update_cost_line(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCostLineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    if let Some(p) = payload.unit_price {
        if p < Decimal::ZERO {
            errors.add("unit_price", "The unit price must not be negative");
        }
    }
    if let Some(q) = payload.quantity {
        if q <= Decimal::ZERO {
            errors.add("quantity", "The quantity must be greater than zero");
        }
    }
    if let Some(c) = payload.conversion_qty {
        if c <= Decimal::ZERO {
            errors.add(
                "conversion_qty",
                "The conversion quantity must be greater than zero",
            );
        }
    }
    errors.into_result()?;

    let updated = state
        .services
        .product_costs
        .update_line(
            user.user_id,
            id,
            CostLineChanges {
                cost_component_id: payload.cost_component_id,
                unit: payload.unit,
                unit_price: payload.unit_price,
                quantity: payload.quantity,
                conversion_qty: payload.conversion_qty,
            },
        )
        .await?;

    Ok(success_response(json!({
        "success": true,
        "message": "Cost line updated successfully",
        "data": updated
    })))
}

async fn delete_cost_line(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .product_costs
        .delete_line(user.user_id, id)
        .await?;
    Ok(success_response(json!({
        "success": true,
        "message": "Cost line deleted successfully"
    })))
}
