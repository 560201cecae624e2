use axum::{
    extract::{Path, Query, State},
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
    entities::cost_component::ComponentType,
    errors::ServiceError,
    handlers::AppState,
    services::cost_components::{ComponentFilter, CostComponentChanges, NewCostComponent},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_components))
        .route("/", post(create_component))
        .route("/:id", get(get_component))
        .route("/:id", put(update_component))
        .route("/:id", delete(delete_component))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub component_type: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateComponentRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required"))]
    pub name: String,
    pub description: Option<String>,
    pub component_type: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateComponentRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub component_type: Option<String>,
}

fn parse_component_type(raw: &str) -> Result<ComponentType, ServiceError> {
    ComponentType::parse(raw).ok_or_else(|| {
        ServiceError::validation("component_type", "The selected component type is invalid")
    })
}

async fn list_components(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    // Malformed filters are a 400, not a silent empty result.
    let component_type = match &query.component_type {
        Some(raw) => Some(ComponentType::parse(raw).ok_or_else(|| {
            ServiceError::BadRequest("Invalid component type filter".to_string())
        })?),
        None => None,
    };
    let keyword = match &query.keyword {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(ServiceError::BadRequest(
                    "The keyword filter must not be empty".to_string(),
                ));
            }
            Some(trimmed.to_string())
        }
        None => None,
    };

    let components = state
        .services
        .cost_components
        .list(
            user.user_id,
            ComponentFilter {
                component_type,
                keyword: keyword.clone(),
            },
        )
        .await?;

    Ok(success_response(json!({
        "success": true,
        "data": components,
        "meta": {
            "total_count": components.len(),
            "type": query.component_type,
            "keyword": keyword,
        }
    })))
}

async fn create_component(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateComponentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let component_type = match &payload.component_type {
        Some(raw) => parse_component_type(raw)?,
        None => {
            return Err(ServiceError::validation(
                "component_type",
                "The component type field is required",
            ))
        }
    };

    let created = state
        .services
        .cost_components
        .create(
            user.user_id,
            NewCostComponent {
                name: payload.name,
                description: payload.description,
                component_type,
            },
        )
        .await?;

    Ok(created_response(json!({
        "success": true,
        "message": "Cost component created successfully",
        "data": created
    })))
}

async fn get_component(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let component = state.services.cost_components.get(user.user_id, id).await?;
    Ok(success_response(json!({
        "success": true,
        "data": component
    })))
}

async fn update_component(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateComponentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let component_type = match &payload.component_type {
        Some(raw) => Some(parse_component_type(raw)?),
        None => None,
    };

    let updated = state
        .services
        .cost_components
        .update(
            user.user_id,
            id,
            CostComponentChanges {
                name: payload.name,
                description: payload.description,
                component_type,
            },
        )
        .await?;

    Ok(success_response(json!({
        "success": true,
        "message": "Cost component updated successfully",
        "data": updated
    })))
}

async fn delete_component(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .cost_components
        .delete(user.user_id, id)
        .await?;
    Ok(success_response(json!({
        "success": true,
        "message": "Cost component deleted successfully"
    })))
}
