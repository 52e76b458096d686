// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;
use crate::storage::{StorageError, UserRepository};

/// Extractor for authenticated users.
///
/// Verifies the bearer token from the Authorization header, then loads the
/// account it names. A token for a deleted account is rejected.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = state.tokens.verify(token)?;

        let storage = state.storage.read().await;
        let user = match UserRepository::new(&storage).get(&claims.sub) {
            Ok(user) => user,
            Err(StorageError::NotFound(_)) => return Err(AuthError::UserNotFound),
            Err(e) => return Err(AuthError::InternalError(e.to_string())),
        };

        let user = AuthenticatedUser::from(&user);
        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}
