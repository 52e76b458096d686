// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::panic_response,
    models::{
        AuthResponse, CreateExpenseRequest, DeletedExpense, LoginRequest, RegisterRequest,
        UpdateExpenseRequest, UserMeResponse,
    },
    state::AppState,
    storage::{StoredExpense, UserSummary},
};

pub mod dev;
pub mod expenses;
pub mod health;
pub mod users;

/// Request bodies carry base64 receipt images.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let mut api_routes = Router::new()
        .route(
            "/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route(
            "/expenses/{id}",
            put(expenses::update_expense).delete(expenses::delete_expense),
        )
        .route("/users", post(users::register_user))
        .route("/users/login", post(users::login_user))
        .route("/users/me", get(users::get_me));

    if state.dev_routes {
        tracing::warn!("development routes enabled: /api/seed, /api/debug/db");
        api_routes = api_routes
            .route("/seed", get(dev::seed_database))
            .route("/debug/db", get(dev::dump_database));
    }

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn root() -> &'static str {
    "API is running..."
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        expenses::list_expenses,
        expenses::create_expense,
        expenses::update_expense,
        expenses::delete_expense,
        users::register_user,
        users::login_user,
        users::get_me,
        health::health,
        health::liveness,
        health::readiness,
        dev::seed_database,
        dev::dump_database
    ),
    components(
        schemas(
            StoredExpense,
            CreateExpenseRequest,
            UpdateExpenseRequest,
            DeletedExpense,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserMeResponse,
            UserSummary,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            dev::SeedResponse,
            dev::DemoCredentials,
            dev::DbDump,
            dev::DbCounts
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Expenses", description = "Expense records of the authenticated user"),
        (name = "Users", description = "Registration, login and profile"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Dev", description = "Development-only data tools")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenIssuer;
    use crate::storage::DocumentStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(dir: &TempDir) -> AppState {
        AppState::new(
            DocumentStore::open(dir.path()).unwrap(),
            TokenIssuer::new("test", Duration::days(1)),
        )
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_banner_and_request_id() {
        let dir = TempDir::new().unwrap();
        let app = router(test_state(&dir));

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn expenses_require_a_token() {
        let dir = TempDir::new().unwrap();
        let app = router(test_state(&dir));

        let response = app
            .oneshot(Request::get("/api/expenses").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn dev_routes_are_hidden_unless_enabled() {
        let dir = TempDir::new().unwrap();

        let hidden = router(test_state(&dir))
            .oneshot(Request::get("/api/debug/db").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

        let shown = router(test_state(&dir).with_dev_routes(true))
            .oneshot(Request::get("/api/debug/db").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(shown.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn register_then_list_over_http() {
        let dir = TempDir::new().unwrap();
        let app = router(test_state(&dir));

        let register = Request::post("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"name":"Asha","email":"asha@example.com","password":"secret"}"#,
            ))
            .unwrap();
        let response = app.clone().oneshot(register).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let token = json_body(response).await["token"]
            .as_str()
            .unwrap()
            .to_string();

        let create = Request::post("/api/expenses")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(
                r#"{"title":"Lunch","amount":12.5,"date":"2024-03-01"}"#,
            ))
            .unwrap();
        let response = app.clone().oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["category"], "Misc");
        assert!(created["_id"].is_string());

        let list = Request::get("/api/expenses")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(list).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = json_body(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn openapi_documents_expense_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/expenses"));
        assert!(doc.paths.paths.contains_key("/api/expenses/{id}"));
    }
}
