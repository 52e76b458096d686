// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Core
//!
//! What a dashboard drives: the [`ExpenseStore`] holding the session's
//! expenses, the [`Aggregator`] that turns them into charts and budget
//! figures, and the two persistence backends.
//!
//! | Session | Backend | Where records live |
//! |---------|---------|--------------------|
//! | Authenticated | [`RemoteBackend`] | the SaveKaro server |
//! | Guest | [`LocalBackend`] | the local slot file (redb) |
//!
//! ```text
//! let slots = SlotStore::open(&config.local_db_path)?;
//! let session = match Session::restore(&slots) {
//!     Some(session) => session,
//!     None => Session::login(&remote, &slots, email, password).await?,
//! };
//! let mut store = ExpenseStore::new(Backend::for_session(&session, &config, &slots)?);
//! store.initialize().await?;
//! ```

pub mod aggregate;
pub mod backend;
pub mod error;
pub mod local;
pub mod record;
pub mod remote;
pub mod session;
pub mod settings;
pub mod slots;
pub mod store;

pub use aggregate::{
    budget_delta, category_breakdown, total, Aggregator, BudgetDelta, CategoryTotal, DayBucket,
    MonthSummary, WeekSummary, WeekWindow, WeekdayBucket, YearMonth,
};
pub use backend::{Backend, ExpenseBackend};
pub use error::ClientError;
pub use local::{LocalBackend, LocalPersistence};
pub use record::{ExpenseRecord, NewExpense, QUICK_AMOUNTS, RECEIPT_ADVISORY_BYTES};
pub use remote::{AuthGrant, Profile, RemoteBackend, RemoteClient};
pub use session::Session;
pub use settings::{Settings, Theme};
pub use slots::{SlotError, SlotStore};
pub use store::ExpenseStore;
