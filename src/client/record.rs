// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Expense records as the client holds them, and drafts for new ones.

use base64ct::{Base64, Encoding};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::error::ClientError;

pub const DEFAULT_CATEGORY: &str = "Misc";

/// Receipts larger than this are accepted with a warning.
pub const RECEIPT_ADVISORY_BYTES: usize = 2 * 1024 * 1024;

/// Preset amounts offered by quick add.
pub const QUICK_AMOUNTS: [f64; 4] = [5.0, 10.0, 20.0, 50.0];

/// One expense. `user` is only set for records owned by a server account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub title: String,
    pub amount: f64,
    #[serde(default = "default_category")]
    pub category: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    /// Usually a `data:` URL.
    #[serde(default)]
    pub receipt: Option<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl ExpenseRecord {
    /// Same checks as [`NewExpense::validate`], for edits.
    pub fn validate(&self) -> Result<(), ClientError> {
        validate_fields(&self.title, self.amount)
    }

    /// Trimmed title, default category for a blank one, empty receipt dropped.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.category = category_or_default(&self.category).to_string();
        self.receipt = self.receipt.filter(|r| !r.is_empty());
        self
    }
}

/// An expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    /// Blank means [`DEFAULT_CATEGORY`].
    pub category: String,
    pub date: DateTime<Utc>,
    pub notes: String,
    pub receipt: Option<String>,
}

impl NewExpense {
    pub fn new(title: impl Into<String>, amount: f64, date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            amount,
            category: String::new(),
            date,
            notes: String::new(),
            receipt: None,
        }
    }

    /// One-tap expense dated today.
    pub fn quick(amount: f64) -> Self {
        Self::new("Quick", amount, local_midnight(Local::now().date_naive())).with_category("Quick")
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        validate_fields(&self.title, self.amount)
    }

    /// Category with the default applied.
    pub fn effective_category(&self) -> &str {
        category_or_default(&self.category)
    }

    /// Whether the attached receipt is over [`RECEIPT_ADVISORY_BYTES`].
    pub fn receipt_exceeds_advisory(&self) -> bool {
        self.receipt
            .as_deref()
            .is_some_and(|r| receipt_size(r) > RECEIPT_ADVISORY_BYTES)
    }

    /// Turn the draft into a record under `id`.
    pub fn into_record(self, id: String) -> ExpenseRecord {
        let category = self.effective_category().to_string();
        ExpenseRecord {
            id,
            user: None,
            title: self.title.trim().to_string(),
            amount: self.amount,
            category,
            date: self.date,
            notes: self.notes,
            receipt: self.receipt.filter(|r| !r.is_empty()),
        }
    }
}

fn category_or_default(category: &str) -> &str {
    match category.trim() {
        "" => DEFAULT_CATEGORY,
        category => category,
    }
}

fn validate_fields(title: &str, amount: f64) -> Result<(), ClientError> {
    if title.trim().is_empty() {
        return Err(ClientError::Validation("title is required".to_string()));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ClientError::Validation(
            "amount must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Decoded size of a receipt. Data URLs are measured by their base64 payload;
/// anything else by its raw length.
pub fn receipt_size(receipt: &str) -> usize {
    match receipt.split_once(";base64,") {
        Some((_, payload)) => Base64::decode_vec(payload.trim())
            .map(|bytes| bytes.len())
            .unwrap_or(payload.len() / 4 * 3),
        None => receipt.len(),
    }
}

/// Midnight of `date` in the local time zone, as a UTC instant.
pub fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
