// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Guest-mode persistence: the expense list and settings as JSON in the slot
//! file. Unreadable or corrupt slots load as empty/default and are logged.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Datelike, Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;

use super::{
    backend::ExpenseBackend,
    error::ClientError,
    record::{local_midnight, ExpenseRecord, NewExpense},
    settings::Settings,
    slots::{SlotStore, EXPENSES_SLOT, SETTINGS_SLOT},
};

#[derive(Debug, Clone)]
pub struct LocalPersistence {
    slots: SlotStore,
}

impl LocalPersistence {
    pub fn new(slots: SlotStore) -> Self {
        Self { slots }
    }

    fn load_slot<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.slots.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(slot = key, error = %e, "failed to read local slot");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(slot = key, error = %e, "discarding unparsable local slot");
                None
            }
        }
    }

    /// Last saved list, or empty.
    pub fn load_expenses(&self) -> Vec<ExpenseRecord> {
        self.load_slot(EXPENSES_SLOT).unwrap_or_default()
    }

    /// Replace the stored list.
    pub fn save_expenses(&self, records: &[ExpenseRecord]) -> Result<(), ClientError> {
        let json = serde_json::to_string(records)
            .map_err(|e| ClientError::Validation(format!("unserializable record: {e}")))?;
        self.slots.set(EXPENSES_SLOT, &json)?;
        Ok(())
    }

    /// Stored settings, or the defaults.
    pub fn load_settings(&self) -> Settings {
        self.load_slot::<Settings>(SETTINGS_SLOT)
            .unwrap_or_default()
            .normalized()
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), ClientError> {
        let normalized = settings.clone().normalized();
        let json = serde_json::to_string(&normalized)
            .map_err(|e| ClientError::Validation(format!("unserializable settings: {e}")))?;
        self.slots.set(SETTINGS_SLOT, &json)?;
        Ok(())
    }

    /// Write the sample records if the expense slot has never been written.
    /// Returns whether it seeded.
    pub fn seed_if_empty(&self) -> Result<bool, ClientError> {
        if self.slots.get(EXPENSES_SLOT)?.is_some() {
            return Ok(false);
        }
        self.save_expenses(&sample_expenses(Local::now().date_naive()))?;
        tracing::info!("seeded local expenses with sample data");
        Ok(true)
    }
}

/// Three starter records dated the 1st to 3rd of `today`'s month.
fn sample_expenses(today: NaiveDate) -> Vec<ExpenseRecord> {
    let day = |d: u32| {
        let date = NaiveDate::from_ymd_opt(today.year(), today.month(), d).unwrap_or(today);
        local_midnight(date)
    };
    [
        ("1", "Coffee", 3.5, "Coffee", day(1)),
        ("2", "Groceries", 45.2, "Groceries", day(2)),
        ("3", "Internet", 30.0, "Bills", day(3)),
    ]
    .into_iter()
    .map(|(id, title, amount, category, date)| ExpenseRecord {
        id: id.to_string(),
        user: None,
        title: title.to_string(),
        amount,
        category: category.to_string(),
        date,
        notes: String::new(),
        receipt: None,
    })
    .collect()
}

/// [`ExpenseBackend`] over [`LocalPersistence`]. Ids are millisecond
/// timestamps, bumped so two records created in the same millisecond differ.
#[derive(Debug)]
pub struct LocalBackend {
    persistence: LocalPersistence,
    last_id: AtomicI64,
}

impl LocalBackend {
    pub fn new(slots: SlotStore) -> Self {
        Self {
            persistence: LocalPersistence::new(slots),
            last_id: AtomicI64::new(0),
        }
    }

    pub fn persistence(&self) -> &LocalPersistence {
        &self.persistence
    }

    fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_id.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last_id.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate.to_string(),
                Err(actual) => last = actual,
            }
        }
    }

    /// Keep generated ids above any numeric id already stored.
    fn observe_ids(&self, records: &[ExpenseRecord]) {
        if let Some(max) = records.iter().filter_map(|r| r.id.parse::<i64>().ok()).max() {
            self.last_id.fetch_max(max, Ordering::Relaxed);
        }
    }
}

impl ExpenseBackend for LocalBackend {
    async fn list(&self) -> Result<Vec<ExpenseRecord>, ClientError> {
        if let Err(e) = self.persistence.seed_if_empty() {
            tracing::warn!(error = %e, "failed to seed local expenses");
        }
        let records = self.persistence.load_expenses();
        self.observe_ids(&records);
        Ok(records)
    }

    async fn create(&self, draft: NewExpense) -> Result<ExpenseRecord, ClientError> {
        Ok(draft.into_record(self.next_id()))
    }

    async fn update(&self, record: &ExpenseRecord) -> Result<ExpenseRecord, ClientError> {
        Ok(record.clone().normalized())
    }

    async fn delete(&self, _id: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn persist(&self, records: &[ExpenseRecord]) -> Result<(), ClientError> {
        self.persistence.save_expenses(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::record::DEFAULT_CATEGORY;
    use crate::client::settings::Theme;
    use crate::client::slots::temp_slots;

    #[test]
    fn missing_or_corrupt_slots_load_empty() {
        let (slots, _dir) = temp_slots();
        let local = LocalPersistence::new(slots.clone());
        assert!(local.load_expenses().is_empty());
        assert_eq!(local.load_settings(), Settings::default());

        slots.set(EXPENSES_SLOT, "{not json").unwrap();
        slots.set(SETTINGS_SLOT, r#"{"theme":7}"#).unwrap();
        assert!(local.load_expenses().is_empty());
        assert_eq!(local.load_settings(), Settings::default());
    }

    #[test]
    fn seeds_only_on_first_use() {
        let (slots, _dir) = temp_slots();
        let local = LocalPersistence::new(slots);

        assert!(local.seed_if_empty().unwrap());
        let seeded = local.load_expenses();
        let ids: Vec<_> = seeded.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(seeded[2].category, "Bills");

        local.save_expenses(&[]).unwrap();
        assert!(!local.seed_if_empty().unwrap());
        assert!(local.load_expenses().is_empty());
    }

    #[test]
    fn sample_dates_fall_in_current_month() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let samples = sample_expenses(today);
        for (i, record) in samples.iter().enumerate() {
            let local = record.date.with_timezone(&Local).date_naive();
            assert_eq!(local, NaiveDate::from_ymd_opt(2024, 2, i as u32 + 1).unwrap());
        }
    }

    #[test]
    fn settings_round_trip_normalized() {
        let (slots, _dir) = temp_slots();
        let local = LocalPersistence::new(slots);
        let settings = Settings {
            theme: Theme::Light,
            daily_budget: -1.0,
            monthly_budget: 900.0,
            favorites: vec!["Food".into()],
            ..Default::default()
        };
        local.save_settings(&settings).unwrap();

        let loaded = local.load_settings();
        assert_eq!(loaded.theme, Theme::Light);
        assert_eq!(loaded.daily_budget, 0.0);
        assert_eq!(loaded.monthly_budget, 900.0);
        assert_eq!(loaded.favorites, vec!["Food".to_string()]);
    }

    #[tokio::test]
    async fn edits_get_the_same_defaults_as_new_records() {
        let (slots, _dir) = temp_slots();
        let backend = LocalBackend::new(slots);
        let mut record = backend.list().await.unwrap().remove(0);
        record.title = "  Groceries ".into();
        record.category = "  ".into();
        record.receipt = Some(String::new());

        let updated = backend.update(&record).await.unwrap();
        assert_eq!(updated.title, "Groceries");
        assert_eq!(updated.category, DEFAULT_CATEGORY);
        assert_eq!(updated.receipt, None);
        assert_eq!(updated.id, record.id);
    }

    #[tokio::test]
    async fn generated_ids_are_unique_and_above_existing() {
        let (slots, _dir) = temp_slots();
        let backend = LocalBackend::new(slots);
        let far_future = (Utc::now().timestamp_millis() + 1_000_000).to_string();
        backend
            .persist(&[NewExpense::new("x", 1.0, Utc::now()).into_record(far_future.clone())])
            .await
            .unwrap();
        backend.list().await.unwrap();

        let a = backend.create(NewExpense::new("a", 1.0, Utc::now())).await.unwrap();
        let b = backend.create(NewExpense::new("b", 1.0, Utc::now())).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.parse::<i64>().unwrap() > far_future.parse::<i64>().unwrap());
    }
}
