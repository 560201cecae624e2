use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::AppState,
    services::products::{NewProduct, ProductChanges},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    pub user_id: Option<i64>,
    #[validate(length(min = 1, message = "The name field is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "The sku field is required"))]
    pub sku: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "The name field is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "The sku field is required"))]
    pub sku: Option<String>,
    pub description: Option<String>,
}

async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.products.list(user.user_id).await?;
    let total = products.len();
    Ok(success_response(json!({
        "success": true,
        "data": products,
        "stats": { "total_products": total }
    })))
}

async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let created = state
        .services
        .products
        .create(
            user.user_id,
            NewProduct {
                user_id: payload.user_id,
                name: payload.name,
                sku: payload.sku,
                description: payload.description,
            },
        )
        .await?;

    Ok(created_response(json!({
        "success": true,
        "message": "Product created successfully",
        "data": created
    })))
}

async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.get(user.user_id, id).await?;
    Ok(success_response(json!({
        "success": true,
        "data": product
    })))
}

async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .products
        .update(
            user.user_id,
            id,
            ProductChanges {
                name: payload.name,
                sku: payload.sku,
                description: payload.description,
            },
        )
        .await?;

    Ok(success_response(json!({
        "success": true,
        "message": "Product updated successfully",
        "data": updated
    })))
}

async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete(user.user_id, id).await?;
    Ok(success_response(json!({
        "success": true,
        "message": "Product deleted successfully"
    })))
}
