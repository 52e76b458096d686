// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the document store layout.
//!
//! Document ids arrive percent-decoded from request paths. Only
//! `[A-Za-z0-9_-]` is accepted; anything else is reported as a missing
//! document so it can never address a file outside its collection.

use std::path::{Path, PathBuf};

use super::{StorageError, StorageResult};

/// Whether `id` is usable as a document file name.
pub fn is_document_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn document(dir: PathBuf, kind: &str, id: &str) -> StorageResult<PathBuf> {
    if !is_document_id(id) {
        return Err(StorageError::NotFound(format!("{kind} {id}")));
    }
    Ok(dir.join(format!("{id}.json")))
}

/// Storage path utilities for the document store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// Create a new StoragePaths rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user accounts.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user document.
    pub fn user(&self, user_id: &str) -> StorageResult<PathBuf> {
        document(self.users_dir(), "User", user_id)
    }

    // ========== Expense Paths ==========

    /// Directory containing all expense records.
    pub fn expenses_dir(&self) -> PathBuf {
        self.root.join("expenses")
    }

    /// Path to a specific expense document.
    pub fn expense(&self, expense_id: &str) -> StorageResult<PathBuf> {
        document(self.expenses_dir(), "Expense", expense_id)
    }
}
