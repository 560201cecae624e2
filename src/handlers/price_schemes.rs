use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::common::{created_response, success_response, validate_input, FieldErrors};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::AppState,
    services::price_schemes::{NewPriceLevel, PriceLevelChanges, SchemeListing},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_levels))
        .route("/", post(create_level))
        .route("/:id", get(get_level))
        .route("/:id", put(update_level))
        .route("/:id", delete(delete_level))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub product_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLevelRequest {
    pub product_id: i64,
    #[validate(length(min = 1, max = 255, message = "The level name field is required"))]
    pub level_name: String,
    pub discount_percentage: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLevelRequest {
    #[validate(length(min = 1, max = 255, message = "The level name field is required"))]
    pub level_name: Option<String>,
    pub discount_percentage: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub notes: Option<String>,
}

fn check_pricing_bounds(
    discount: Option<Decimal>,
    selling: Option<Decimal>,
    purchase: Option<Decimal>,
) -> Result<(), ServiceError> {
    let mut errors = FieldErrors::new();
    if let Some(d) = discount {
        if d < Decimal::ZERO || d >= Decimal::from(100) {
            errors.add(
                "discount_percentage",
                "The discount percentage must be between 0 and 100",
            );
        }
    }
    if let Some(s) = selling {
        if s <= Decimal::ZERO {
            errors.add("selling_price", "The selling price must be greater than zero");
        }
    }
    if let Some(p) = purchase {
        if p <= Decimal::ZERO {
            errors.add(
                "purchase_price",
                "The purchase price must be greater than zero",
            );
        }
    }
    errors.into_result()
}

async fn list_levels(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let listing = state
        .services
        .price_schemes
        .list(user.user_id, query.product_id)
        .await?;

    let body = match listing {
        SchemeListing::NoProducts => json!({
            "success": false,
            "message": "You have no products yet"
        }),
        SchemeListing::Chain { product, levels } => json!({
            "success": true,
            "data": levels,
            "product": product
        }),
    };
    Ok(success_response(body))
}

async fn create_level(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateLevelRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    check_pricing_bounds(
        payload.discount_percentage,
        payload.selling_price,
        payload.purchase_price,
    )?;

    let created = state
        .services
        .price_schemes
        .create(
            user.user_id,
            NewPriceLevel {
                product_id: payload.product_id,
                level_name: payload.level_name,
                discount_percentage: payload.discount_percentage,
                selling_price: payload.selling_price,
                purchase_price: payload.purchase_price,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(created_response(json!({
        "success": true,
        "message": "Price scheme created successfully",
        "data": created
    })))
}

async fn get_level(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let level = state.services.price_schemes.get(user.user_id, id).await?;
    Ok(success_response(json!({
        "success": true,
        "data": level
    })))
}

async fn update_level(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLevelRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    check_pricing_bounds(
        payload.discount_percentage,
        payload.selling_price,
        payload.purchase_price,
    )?;

    let updated = state
        .services
        .price_schemes
        .update(
            user.user_id,
            id,
            PriceLevelChanges {
                level_name: payload.level_name,
                discount_percentage: payload.discount_percentage,
                selling_price: payload.selling_price,
                purchase_price: payload.purchase_price,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(success_response(json!({
        "success": true,
        "message": "Price scheme updated successfully",
        "data": updated
    })))
}

async fn delete_level(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .price_schemes
        .delete(user.user_id, id)
        .await?;
    Ok(success_response(json!({
        "success": true,
        "message": "Price scheme deleted successfully"
    })))
}
