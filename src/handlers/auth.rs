use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{auth::AuthUser, errors::ServiceError, handlers::AppState};

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes behind the auth middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "The name field is required"))]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "The password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "The email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "The password field is required"))]
    pub password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let user = state
        .services
        .users
        .register(payload.name, payload.email, &payload.password)
        .await?;
    let token = state.auth.generate_token(&user)?;

    Ok(created_response(json!({
        "success": true,
        "message": "Registration successful",
        "data": {
            "user": user,
            "token": token,
            "token_type": "Bearer",
            "expires_in": state.auth.token_expiration_secs(),
        }
    })))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let user = state
        .services
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state.auth.generate_token(&user)?;

    Ok(success_response(json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "user": user,
            "token": token,
            "token_type": "Bearer",
            "expires_in": state.auth.token_expiration_secs(),
        }
    })))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("Unauthenticated".to_string()))?;

    state.auth.revoke_token(token.trim()).await?;

    Ok(success_response(json!({
        "success": true,
        "message": "Logged out"
    })))
}

async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state.services.users.get(user.user_id).await?;
    Ok(success_response(json!({
        "success": true,
        "data": profile
    })))
}
