// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Expense repository for the document store.
//!
//! Each expense is stored as a separate JSON file under `expenses/`. The stored
//! shape is also the wire shape returned by the API, so the server identifier
//! is serialized as `_id` and timestamps use camelCase keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStore, OwnedResource, StorageError, StorageResult};

/// Category assigned when a request omits one.
pub const DEFAULT_CATEGORY: &str = "Misc";

/// Expense stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredExpense {
    /// Server-issued identifier (UUID)
    #[serde(rename = "_id")]
    pub id: String,
    /// Owner user ID
    pub user: String,
    pub title: String,
    /// Positive amount, currency agnostic
    pub amount: f64,
    pub category: String,
    /// Calendar date of the expense (local midnight, encoded as UTC)
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    /// Receipt image as a base64 data URL
    #[serde(default)]
    pub receipt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredExpense {
    fn owner_user_id(&self) -> &str {
        &self.user
    }

    fn resource_name(&self) -> String {
        format!("expense {}", self.id)
    }
}

/// Repository for expense operations on the document store.
pub struct ExpenseRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> ExpenseRepository<'a> {
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Get an expense by ID.
    pub fn get(&self, expense_id: &str) -> StorageResult<StoredExpense> {
        let path = self.storage.paths().expense(expense_id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Expense {expense_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new expense.
    pub fn create(&self, expense: &StoredExpense) -> StorageResult<()> {
        let expense_id = &expense.id;
        let path = self.storage.paths().expense(expense_id)?;
        if self.storage.exists(&path) {
            return Err(StorageError::AlreadyExists(format!("Expense {expense_id}")));
        }
        self.storage.write_json(path, expense)
    }

    /// Replace an existing expense.
    pub fn update(&self, expense: &StoredExpense) -> StorageResult<()> {
        let expense_id = &expense.id;
        let path = self.storage.paths().expense(expense_id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Expense {expense_id}")));
        }
        self.storage.write_json(path, expense)
    }

    pub fn delete(&self, expense_id: &str) -> StorageResult<()> {
        let path = self.storage.paths().expense(expense_id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Expense {expense_id}")));
        }
        self.storage.delete(path)
    }

    /// List every expense regardless of owner (debug dump).
    pub fn list_all(&self) -> StorageResult<Vec<StoredExpense>> {
        self.list_matching(|_| true)
    }

    /// List a user's expenses, newest date first.
    pub fn list_by_owner(&self, owner_user_id: &str) -> StorageResult<Vec<StoredExpense>> {
        self.list_matching(|expense| expense.user == owner_user_id)
    }

    /// Delete every expense. Returns how many were removed.
    pub fn clear(&self) -> StorageResult<usize> {
        self.storage.clear_dir(self.storage.paths().expenses_dir())
    }

    fn list_matching(
        &self,
        keep: impl Fn(&StoredExpense) -> bool,
    ) -> StorageResult<Vec<StoredExpense>> {
        let ids = self
            .storage
            .list_ids(self.storage.paths().expenses_dir(), "json")?;

        let mut expenses = Vec::new();
        for id in ids {
            match self.get(&id) {
                Ok(expense) if keep(&expense) => expenses.push(expense),
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to read expense {}: {}", id, e),
            }
        }

        expenses.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }
}
