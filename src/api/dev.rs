// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Development-only routes: reset the store to a demo account and dump its
//! contents. Only mounted when `ENABLE_DEV_ROUTES` is set outside production.

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::hash_password,
    error::ApiError,
    state::AppState,
    storage::{ExpenseRepository, StoredExpense, StoredUser, UserRepository, UserSummary},
};

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "123456";

#[derive(Debug, Serialize, ToSchema)]
pub struct DemoCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedResponse {
    pub message: String,
    pub credentials: DemoCredentials,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DbCounts {
    pub users: usize,
    pub expenses: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DbDump {
    pub timestamp: chrono::DateTime<Utc>,
    pub counts: DbCounts,
    pub users: Vec<UserSummary>,
    pub expenses: Vec<StoredExpense>,
}

/// Wipe all users and expenses, then create the demo account with three
/// sample expenses.
#[utoipa::path(
    get,
    path = "/api/seed",
    tag = "Dev",
    responses(
        (status = 200, description = "Store reset to demo data", body = SeedResponse)
    )
)]
pub async fn seed_database(State(state): State<AppState>) -> Result<Json<SeedResponse>, ApiError> {
    let password_hash = tokio::task::spawn_blocking(|| hash_password(DEMO_PASSWORD))
        .await
        .map_err(|e| ApiError::internal("Seed failed").with_detail(e.to_string()))?
        .map_err(|e| ApiError::internal("Seed failed").with_detail(e.to_string()))?;

    let storage = state.storage.write().await;
    let users = UserRepository::new(&storage);
    let expenses = ExpenseRepository::new(&storage);

    let removed_expenses = expenses.clear()?;
    let removed_users = users.clear()?;

    let now = Utc::now();
    let demo = StoredUser {
        id: Uuid::new_v4().simple().to_string(),
        name: "Demo User".to_string(),
        email: DEMO_EMAIL.to_string(),
        password_hash,
        created_at: now,
        updated_at: now,
    };
    users.create(&demo)?;

    let samples = [
        ("Welcome Coffee", 50.0, "Food", now, "First expense!"),
        ("Project Setup", 1200.0, "Work", now, "Hosting fees"),
        ("Groceries", 450.0, "Food", now - Duration::days(1), ""),
    ];
    for (title, amount, category, date, notes) in samples {
        expenses.create(&StoredExpense {
            id: Uuid::new_v4().simple().to_string(),
            user: demo.id.clone(),
            title: title.to_string(),
            amount,
            category: category.to_string(),
            date,
            notes: notes.to_string(),
            receipt: None,
            created_at: now,
            updated_at: now,
        })?;
    }

    tracing::info!(removed_users, removed_expenses, "database seeded with demo data");

    Ok(Json(SeedResponse {
        message: "Database seeded successfully!".to_string(),
        credentials: DemoCredentials {
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
        },
    }))
}

/// Dump every user (without password hashes) and expense.
#[utoipa::path(
    get,
    path = "/api/debug/db",
    tag = "Dev",
    responses(
        (status = 200, description = "Store contents", body = DbDump)
    )
)]
pub async fn dump_database(State(state): State<AppState>) -> Result<Json<DbDump>, ApiError> {
    let storage = state.storage.read().await;
    let users: Vec<UserSummary> = UserRepository::new(&storage)
        .list_all()?
        .iter()
        .map(UserSummary::from)
        .collect();
    let expenses = ExpenseRepository::new(&storage).list_all()?;

    tracing::debug!(users = users.len(), expenses = expenses.len(), "database dump");

    Ok(Json(DbDump {
        timestamp: Utc::now(),
        counts: DbCounts {
            users: users.len(),
            expenses: expenses.len(),
        },
        users,
        expenses,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{verify_password, TokenIssuer};
    use crate::storage::DocumentStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn seed_replaces_existing_data() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(
            DocumentStore::open(dir.path()).unwrap(),
            TokenIssuer::new("test", Duration::days(1)),
        );

        seed_database(State(state.clone())).await.unwrap();
        let Json(seeded) = seed_database(State(state.clone())).await.unwrap();
        assert_eq!(seeded.credentials.email, DEMO_EMAIL);

        let Json(dump) = dump_database(State(state.clone())).await.unwrap();
        assert_eq!(dump.counts.users, 1);
        assert_eq!(dump.counts.expenses, 3);
        assert!(dump.expenses.iter().all(|e| e.user == dump.users[0].id));

        let storage = state.storage.read().await;
        let demo = UserRepository::new(&storage)
            .find_by_email(DEMO_EMAIL)
            .unwrap()
            .unwrap();
        assert!(verify_password(DEMO_PASSWORD, &demo.password_hash).unwrap());
    }
}
