// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Expense Store
//!
//! The in-memory expense list for one session, newest first, and the only
//! place that mutates it. Every mutation goes to the backend first, then the
//! changed list is handed to [`ExpenseBackend::persist`] (a full-list save in
//! guest mode). A failed persist rolls the change back, so memory never holds
//! anything the backend has not kept.

use super::{
    backend::{Backend, ExpenseBackend},
    error::ClientError,
    record::{ExpenseRecord, NewExpense, RECEIPT_ADVISORY_BYTES},
};

#[derive(Debug)]
pub struct ExpenseStore<B: ExpenseBackend = Backend> {
    backend: B,
    records: Vec<ExpenseRecord>,
}

impl<B: ExpenseBackend> ExpenseStore<B> {
    /// An empty store; call [`initialize`](Self::initialize) to load.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            records: Vec::new(),
        }
    }

    /// Load the backend's records. On failure the list is left empty.
    pub async fn initialize(&mut self) -> Result<(), ClientError> {
        self.records.clear();
        self.records = self.backend.list().await?;
        tracing::debug!(count = self.records.len(), "expense store loaded");
        Ok(())
    }

    /// Swap in the backend for a new session and reload.
    pub async fn switch_backend(&mut self, backend: B) -> Result<(), ClientError> {
        self.backend = backend;
        self.initialize().await
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&ExpenseRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validate, store and prepend a new expense.
    pub async fn add(&mut self, draft: NewExpense) -> Result<&ExpenseRecord, ClientError> {
        draft.validate()?;
        if draft.receipt_exceeds_advisory() {
            tracing::warn!(
                limit_bytes = RECEIPT_ADVISORY_BYTES,
                "receipt is larger than recommended"
            );
        }

        let record = self.backend.create(draft).await?;
        self.records.insert(0, record);
        if let Err(e) = self.backend.persist(&self.records).await {
            self.records.remove(0);
            return Err(e);
        }
        tracing::debug!(expense_id = %self.records[0].id, "expense added");
        Ok(&self.records[0])
    }

    /// Replace the record with the same id.
    pub async fn update(&mut self, record: ExpenseRecord) -> Result<&ExpenseRecord, ClientError> {
        let Some(index) = self.records.iter().position(|r| r.id == record.id) else {
            return Err(ClientError::NotFound(format!("expense {}", record.id)));
        };
        record.validate()?;

        let updated = self.backend.update(&record).await?;
        let previous = std::mem::replace(&mut self.records[index], updated);
        if let Err(e) = self.backend.persist(&self.records).await {
            self.records[index] = previous;
            return Err(e);
        }
        Ok(&self.records[index])
    }

    /// Delete by id. In guest mode an unknown id is a no-op; remotely the
    /// server's 404 comes back as [`ClientError::NotFound`].
    pub async fn remove(&mut self, id: &str) -> Result<(), ClientError> {
        self.backend.delete(id).await?;
        let index = self.records.iter().position(|r| r.id == id);
        let removed = index.map(|index| (index, self.records.remove(index)));

        if let Err(e) = self.backend.persist(&self.records).await {
            if let Some((index, record)) = removed {
                self.records.insert(index, record);
            }
            return Err(e);
        }
        if removed.is_some() {
            tracing::debug!(expense_id = %id, "expense removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::local::LocalBackend;
    use crate::client::slots::{temp_slots, SlotStore, EXPENSES_SLOT};
    use chrono::Utc;
    use std::cell::RefCell;

    fn guest_store(slots: &SlotStore) -> ExpenseStore<LocalBackend> {
        ExpenseStore::new(LocalBackend::new(slots.clone()))
    }

    #[tokio::test]
    async fn guest_initialize_seeds_samples() {
        let (slots, _dir) = temp_slots();
        let mut store = guest_store(&slots);
        store.initialize().await.unwrap();
        assert_eq!(store.records().len(), 3);
    }

    #[tokio::test]
    async fn guest_add_survives_reload() {
        let (slots, _dir) = temp_slots();
        let mut store = guest_store(&slots);
        store.initialize().await.unwrap();

        let added = store
            .add(NewExpense::new("Lunch", 12.0, Utc::now()).with_category("Food"))
            .await
            .unwrap()
            .clone();
        assert_eq!(store.records()[0], added);

        let mut reloaded = guest_store(&slots);
        reloaded.initialize().await.unwrap();
        assert_eq!(reloaded.records(), store.records());
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_storage() {
        let (slots, _dir) = temp_slots();
        let mut store = guest_store(&slots);

        let err = store
            .add(NewExpense::new("Lunch", 0.0, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(store.records().is_empty());
        assert_eq!(slots.get(EXPENSES_SLOT).unwrap(), None);
    }

    #[tokio::test]
    async fn guest_update_replaces_and_persists() {
        let (slots, _dir) = temp_slots();
        let mut store = guest_store(&slots);
        store.initialize().await.unwrap();

        let mut edited = store.get("2").unwrap().clone();
        edited.amount = 50.0;
        store.update(edited.clone()).await.unwrap();
        assert_eq!(store.get("2"), Some(&edited));

        let mut reloaded = guest_store(&slots);
        reloaded.initialize().await.unwrap();
        assert_eq!(reloaded.get("2").unwrap().amount, 50.0);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let (slots, _dir) = temp_slots();
        let mut store = guest_store(&slots);
        store.initialize().await.unwrap();

        let mut ghost = store.records()[0].clone();
        ghost.id = "missing".into();
        assert!(matches!(
            store.update(ghost).await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn guest_remove_unknown_id_is_noop() {
        let (slots, _dir) = temp_slots();
        let mut store = guest_store(&slots);
        store.initialize().await.unwrap();

        store.remove("missing").await.unwrap();
        assert_eq!(store.records().len(), 3);

        store.remove("1").await.unwrap();
        let ids: Vec<_> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
    }

    /// Backend that fails every call, counting persists.
    #[derive(Default)]
    struct FailingBackend {
        persisted: RefCell<usize>,
    }

    impl ExpenseBackend for FailingBackend {
        async fn list(&self) -> Result<Vec<ExpenseRecord>, ClientError> {
            Err(ClientError::Transport("connection refused".into()))
        }
        async fn create(&self, _draft: NewExpense) -> Result<ExpenseRecord, ClientError> {
            Err(ClientError::Transport("connection refused".into()))
        }
        async fn update(&self, _record: &ExpenseRecord) -> Result<ExpenseRecord, ClientError> {
            Err(ClientError::Auth("Not authorized, token failed".into()))
        }
        async fn delete(&self, id: &str) -> Result<(), ClientError> {
            Err(ClientError::NotFound(id.to_string()))
        }
        async fn persist(&self, _records: &[ExpenseRecord]) -> Result<(), ClientError> {
            *self.persisted.borrow_mut() += 1;
            Ok(())
        }
    }

    /// Backend that accepts every call but cannot save.
    struct UnsavableBackend;

    impl ExpenseBackend for UnsavableBackend {
        async fn list(&self) -> Result<Vec<ExpenseRecord>, ClientError> {
            Ok(Vec::new())
        }
        async fn create(&self, draft: NewExpense) -> Result<ExpenseRecord, ClientError> {
            Ok(draft.into_record("new".into()))
        }
        async fn update(&self, record: &ExpenseRecord) -> Result<ExpenseRecord, ClientError> {
            Ok(record.clone())
        }
        async fn delete(&self, _id: &str) -> Result<(), ClientError> {
            Ok(())
        }
        async fn persist(&self, _records: &[ExpenseRecord]) -> Result<(), ClientError> {
            Err(ClientError::Transport("disk full".into()))
        }
    }

    #[tokio::test]
    async fn failed_save_rolls_back_every_mutation() {
        let mut store = ExpenseStore::new(UnsavableBackend);
        store.records = vec![
            NewExpense::new("Tea", 1.0, Utc::now()).into_record("r1".into()),
            NewExpense::new("Bus", 2.0, Utc::now()).into_record("r2".into()),
        ];
        let before = store.records().to_vec();

        assert!(matches!(
            store.add(NewExpense::new("Lunch", 5.0, Utc::now())).await,
            Err(ClientError::Transport(_))
        ));
        assert_eq!(store.records(), before.as_slice());

        let mut edited = before[1].clone();
        edited.amount = 9.0;
        assert!(store.update(edited).await.is_err());
        assert_eq!(store.records(), before.as_slice());

        assert!(store.remove("r2").await.is_err());
        assert_eq!(store.records(), before.as_slice());
    }

    #[tokio::test]
    async fn failed_backend_calls_leave_state_untouched() {
        let mut store = ExpenseStore::new(FailingBackend::default());
        assert!(store.initialize().await.is_err());
        assert!(store.records().is_empty());

        assert!(store
            .add(NewExpense::new("Lunch", 5.0, Utc::now()))
            .await
            .is_err());
        assert!(store.records().is_empty());

        store.records.push(NewExpense::new("Tea", 1.0, Utc::now()).into_record("r1".into()));
        let mut edited = store.records()[0].clone();
        edited.amount = 2.0;
        assert!(matches!(
            store.update(edited).await,
            Err(ClientError::Auth(_))
        ));
        assert_eq!(store.records()[0].amount, 1.0);

        assert!(matches!(
            store.remove("r1").await,
            Err(ClientError::NotFound(_))
        ));
        assert_eq!(store.records().len(), 1);
        assert_eq!(*store.backend().persisted.borrow(), 0);
    }
}
