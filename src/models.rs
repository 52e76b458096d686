// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures used by the REST API. The expense record
//! itself is [`StoredExpense`](crate::storage::StoredExpense), which doubles as
//! the response body.
//!
//! Request fields are optional at the serde level so that missing fields are
//! reported as a 400 with a readable message rather than a deserialization
//! rejection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Expense Models
// =============================================================================

/// Request to create an expense.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateExpenseRequest {
    pub title: Option<String>,
    pub amount: Option<f64>,
    /// Defaults to `Misc`.
    pub category: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub date: Option<String>,
    pub notes: Option<String>,
    /// Receipt image as a base64 data URL.
    pub receipt: Option<String>,
}

/// Partial update of an expense. Absent fields are left unchanged.
///
/// Unknown fields (`_id`, `user`, timestamps) are ignored, so clients may send
/// back the full record they received.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateExpenseRequest {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    /// `null` removes the receipt; omitting the field keeps it.
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<String>)]
    pub receipt: Option<Option<String>>,
}

/// Response for `DELETE /api/expenses/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeletedExpense {
    pub id: String,
}

/// Distinguish a field explicitly set to `null` from an absent one.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse an expense date sent by a client.
///
/// Accepts RFC 3339 timestamps (what the dashboard sends: local midnight as
/// UTC) and bare `YYYY-MM-DD` dates, which are taken as UTC midnight.
pub fn parse_expense_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A usable amount is finite and strictly positive.
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

// =============================================================================
// User Models
// =============================================================================

/// Request to register a new account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request to log in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Credential returned by registration and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Response for `GET /api/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserMeResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}
