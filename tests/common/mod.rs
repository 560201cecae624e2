use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use costbook_api::{
    auth::{AuthConfig, AuthService},
    db,
    entities::user,
    migrator::Migrator,
    services::AppServices,
    AppState,
};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

/// Test harness backed by an in-memory SQLite database.
pub struct TestApp {
    pub router: Router,
    pub services: AppServices,
    auth: AuthService,
}

impl TestApp {
    pub async fn new() -> Self {
        // A single connection keeps every query on the same in-memory db.
        let pool = db::establish_connection_with_config(&db::DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
        })
        .await
        .expect("in-memory database");
        Migrator::up(&pool, None).await.expect("migrations");

        let auth = AuthService::new(AuthConfig {
            jwt_secret: "t".repeat(64),
            jwt_issuer: "costbook-api".to_string(),
            jwt_audience: "costbook-clients".to_string(),
            token_expiration: Duration::from_secs(3600),
        });

        let state = AppState::new(Arc::new(pool), auth.clone());
        let services = state.services.clone();
        let router = costbook_api::app(state);

        Self {
            router,
            services,
            auth,
        }
    }

    /// Registers a user directly through the service layer and returns the
    /// user with a valid token.
    pub async fn register_user(&self, name: &str, email: &str) -> (user::Model, String) {
        let user = self
            .services
            .users
            .register(name.to_string(), email.to_string(), "password123")
            .await
            .expect("register user");
        let token = self.auth.generate_token(&user).expect("token");
        (user, token)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.router.clone().oneshot(request).await.expect("response")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    serde_json::from_slice(&bytes).expect("json body")
}
