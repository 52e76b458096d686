// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SaveKaro - Personal Expense Tracker
//!
//! A REST backend for per-user expense records, and the client core a
//! dashboard runs on: an expense store that works against the backend or,
//! for guests, against a local slot file, plus the aggregation engine behind
//! the charts and budget figures.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, bearer tokens and the `Auth` extractor
//! - `client` - Expense store, aggregation engine and persistence backends
//! - `config` - Server and client configuration
//! - `storage` - JSON document store for users and expenses

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
