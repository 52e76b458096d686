// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Named text slots in an embedded redb file.
//!
//! ## Table Layout
//!
//! - `slots`: slot name → JSON text
//!
//! The database holds an exclusive file lock while open, so a second process
//! pointed at the same file fails to open instead of silently overwriting.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, TableDefinition};

const SLOTS: TableDefinition<&str, &str> = TableDefinition::new("slots");

/// Guest-mode expense list.
pub const EXPENSES_SLOT: &str = "savekaro_expenses_v1";
/// User preferences (theme, budgets, favorites).
pub const SETTINGS_SLOT: &str = "savekaro_settings_v1";
/// Session marker written at login and cleared at logout.
pub const SESSION_SLOT: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SlotResult<T> = Result<T, SlotError>;

/// Cloneable handle to the slot database.
#[derive(Clone)]
pub struct SlotStore {
    db: Arc<Database>,
}

impl SlotStore {
    /// Open (or create) the slot file at `path`.
    pub fn open(path: &Path) -> SlotResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so read transactions never see it missing
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SLOTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn get(&self, key: &str) -> SlotResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SLOTS)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    /// Replace the slot's contents.
    pub fn set(&self, key: &str, value: &str) -> SlotResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SLOTS)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove the slot. Returns whether it existed.
    pub fn remove(&self, key: &str) -> SlotResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(SLOTS)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }
}

impl std::fmt::Debug for SlotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn temp_slots() -> (SlotStore, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().unwrap();
    let slots = SlotStore::open(&dir.path().join("client.redb")).unwrap();
    (slots, dir)
}
