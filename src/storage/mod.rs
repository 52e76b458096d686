// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Storage Module
//!
//! Server-side persistence as JSON documents on the local filesystem.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   users/
//!     {user_id}.json
//!   expenses/
//!     {expense_id}.json
//! ```

pub mod document_store;
pub mod ownership;
pub mod paths;
pub mod repository;

pub use document_store::{DocumentStore, StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipEnforcer};
pub use paths::StoragePaths;
pub use repository::{
    ExpenseRepository, StoredExpense, StoredUser, UserRepository, UserSummary, DEFAULT_CATEGORY,
};
