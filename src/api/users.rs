// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration, login, and the current-user endpoint.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::{hash_password, normalize_email, verify_password, Auth, AuthError},
    error::ApiError,
    models::{AuthResponse, LoginRequest, RegisterRequest, UserMeResponse},
    state::AppState,
    storage::{StoredUser, UserRepository},
};

/// Run PBKDF2 off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, crate::auth::PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal("Password worker failed").with_detail(e.to_string()))?
        .map_err(|e| ApiError::internal("Password hashing failed").with_detail(e.to_string()))
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    tag = "Users",
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields or user already exists")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        required(request.name),
        required(request.email),
        required(request.password),
    ) else {
        return Err(ApiError::bad_request("Please add all fields"));
    };
    let email = normalize_email(&email);

    let password_hash = blocking(move || hash_password(&password)).await?;

    let storage = state.storage.write().await;
    let repo = UserRepository::new(&storage);
    if repo.find_by_email(&email)?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let now = Utc::now();
    let user = StoredUser {
        id: Uuid::new_v4().simple().to_string(),
        name: name.trim().to_string(),
        email,
        password_hash,
        created_at: now,
        updated_at: now,
    };
    repo.create(&user)?;
    tracing::info!(user_id = %user.id, "registered user");

    let token = state.tokens.issue(&user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (required(request.email), required(request.password))
    else {
        return Err(AuthError::InvalidCredentials.into());
    };
    let email = normalize_email(&email);

    let user = {
        let storage = state.storage.read().await;
        UserRepository::new(&storage).find_by_email(&email)?
    };
    let Some(user) = user else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let encoded = user.password_hash.clone();
    if !blocking(move || verify_password(&password, &encoded)).await? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.issue(&user.id)?;
    Ok(Json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    }))
}

/// Get the current authenticated user's information.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserMeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_me(Auth(user): Auth) -> Json<UserMeResponse> {
    Json(UserMeResponse {
        id: user.user_id,
        name: user.name,
        email: user.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenIssuer;
    use crate::storage::DocumentStore;
    use chrono::Duration;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = DocumentStore::open(dir.path()).unwrap();
        (
            AppState::new(storage, TokenIssuer::new("test", Duration::days(1))),
            dir,
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some("Demo User".into()),
            email: Some(email.into()),
            password: Some("123456".into()),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let (state, _dir) = test_state();

        let (status, Json(registered)) =
            register_user(State(state.clone()), Json(register_request("Demo@Example.com")))
                .await
                .expect("registration succeeds");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(registered.email, "demo@example.com");
        assert_eq!(state.tokens.verify(&registered.token).unwrap().sub, registered.id);

        let Json(logged_in) = login_user(
            State(state),
            Json(LoginRequest {
                email: Some("demo@example.com".into()),
                password: Some("123456".into()),
            }),
        )
        .await
        .expect("login succeeds");
        assert_eq!(logged_in.id, registered.id);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let (state, _dir) = test_state();
        register_user(State(state.clone()), Json(register_request("demo@example.com")))
            .await
            .unwrap();

        let err = register_user(State(state), Json(register_request("DEMO@example.com")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "User already exists");
    }

    #[tokio::test]
    async fn registration_requires_all_fields() {
        let (state, _dir) = test_state();
        let mut request = register_request("demo@example.com");
        request.password = None;

        let err = register_user(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Please add all fields");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (state, _dir) = test_state();
        register_user(State(state.clone()), Json(register_request("demo@example.com")))
            .await
            .unwrap();

        let err = login_user(
            State(state),
            Json(LoginRequest {
                email: Some("demo@example.com".into()),
                password: Some("wrong".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Invalid credentials");
    }

    #[tokio::test]
    async fn get_me_echoes_user() {
        let Json(me) = get_me(Auth(crate::auth::AuthenticatedUser {
            user_id: "u1".into(),
            name: "Demo".into(),
            email: "demo@example.com".into(),
        }))
        .await;
        assert_eq!(me.id, "u1");
        assert_eq!(me.email, "demo@example.com");
    }
}
