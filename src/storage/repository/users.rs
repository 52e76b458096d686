// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User account repository.
//!
//! Accounts live under `users/`, one JSON file per user. E-mail lookup is a
//! scan; callers pass an already-normalized address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStore, StorageError, StorageResult};

/// User account stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Normalized e-mail address (unique)
    pub email: String,
    /// PBKDF2 hash, never serialized into responses
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredUser> for UserSummary {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

pub struct UserRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> UserRepository<'a> {
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let path = self.storage.paths().user(user_id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new account. Fails if the id or the e-mail is already taken.
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        let path = self.storage.paths().user(&user.id)?;
        if self.storage.exists(&path) || self.find_by_email(&user.email)?.is_some() {
            return Err(StorageError::AlreadyExists(format!("User {}", user.email)));
        }
        self.storage.write_json(path, user)
    }

    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        Ok(self.list_all()?.into_iter().find(|user| user.email == email))
    }

    pub fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let ids = self
            .storage
            .list_ids(self.storage.paths().users_dir(), "json")?;

        let mut users = Vec::new();
        for id in ids {
            match self.get(&id) {
                Ok(user) => users.push(user),
                Err(e) => tracing::warn!("Failed to read user {}: {}", id, e),
            }
        }
        Ok(users)
    }

    pub fn clear(&self) -> StorageResult<usize> {
        self.storage.clear_dir(self.storage.paths().users_dir())
    }
}
