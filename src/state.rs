// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::TokenIssuer;
use crate::storage::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    /// Document store. Handlers take the write lock for every mutation.
    pub storage: Arc<RwLock<DocumentStore>>,
    pub tokens: TokenIssuer,
    /// Mount `/api/seed` and `/api/debug/db`.
    pub dev_routes: bool,
}

impl AppState {
    pub fn new(storage: DocumentStore, tokens: TokenIssuer) -> Self {
        Self {
            storage: Arc::new(RwLock::new(storage)),
            tokens,
            dev_routes: false,
        }
    }

    pub fn with_dev_routes(mut self, enabled: bool) -> Self {
        self.dev_routes = enabled;
        self
    }
}
