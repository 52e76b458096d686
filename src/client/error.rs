// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use reqwest::StatusCode;

use super::slots::SlotError;

/// Failures surfaced by the client core.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Draft or record rejected before (or by) the backend.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backend refused the credential.
    #[error("not authorized: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Network failure or an unexpected response.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("local storage error: {0}")]
    Storage(#[from] SlotError),
}

impl ClientError {
    /// Map a non-success HTTP status and the server's message.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::Validation(message),
            StatusCode::UNAUTHORIZED => Self::Auth(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            other => Self::Transport(format!("{other}: {message}")),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_taxonomy() {
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_REQUEST, "x".into()),
            ClientError::Validation(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, "x".into()),
            ClientError::Auth(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::NOT_FOUND, "Expense not found".into()),
            ClientError::NotFound(m) if m == "Expense not found"
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            ClientError::Transport(_)
        ));
    }
}
