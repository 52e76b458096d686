// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::config::ClientConfig;

use super::{
    error::ClientError,
    local::LocalBackend,
    record::{ExpenseRecord, NewExpense},
    remote::{RemoteBackend, RemoteClient},
    session::Session,
    slots::SlotStore,
};

/// Where the expense store sends its mutations.
///
/// Each call either commits or fails; the store only changes its in-memory
/// list after a call succeeds. `persist` is invoked with the full list after
/// every successful mutation.
#[allow(async_fn_in_trait)]
pub trait ExpenseBackend {
    async fn list(&self) -> Result<Vec<ExpenseRecord>, ClientError>;

    /// Store a validated draft and return the canonical record.
    async fn create(&self, draft: NewExpense) -> Result<ExpenseRecord, ClientError>;

    async fn update(&self, record: &ExpenseRecord) -> Result<ExpenseRecord, ClientError>;

    async fn delete(&self, id: &str) -> Result<(), ClientError>;

    async fn persist(&self, records: &[ExpenseRecord]) -> Result<(), ClientError>;
}

/// Backend picked once per session.
#[derive(Debug)]
pub enum Backend {
    Remote(RemoteBackend),
    Local(LocalBackend),
}

impl Backend {
    /// Remote for an authenticated session, local for a guest.
    pub fn for_session(
        session: &Session,
        config: &ClientConfig,
        slots: &SlotStore,
    ) -> Result<Self, ClientError> {
        match session {
            Session::Authenticated { token, .. } => {
                let client = RemoteClient::new(&config.api_base_url)?.with_token(token.clone());
                Ok(Self::Remote(RemoteBackend::new(client)))
            }
            Session::Guest => Ok(Self::Local(LocalBackend::new(slots.clone()))),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl ExpenseBackend for Backend {
    async fn list(&self) -> Result<Vec<ExpenseRecord>, ClientError> {
        match self {
            Self::Remote(b) => b.list().await,
            Self::Local(b) => b.list().await,
        }
    }

    async fn create(&self, draft: NewExpense) -> Result<ExpenseRecord, ClientError> {
        match self {
            Self::Remote(b) => b.create(draft).await,
            Self::Local(b) => b.create(draft).await,
        }
    }

    async fn update(&self, record: &ExpenseRecord) -> Result<ExpenseRecord, ClientError> {
        match self {
            Self::Remote(b) => b.update(record).await,
            Self::Local(b) => b.update(record).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        match self {
            Self::Remote(b) => b.delete(id).await,
            Self::Local(b) => b.delete(id).await,
        }
    }

    async fn persist(&self, records: &[ExpenseRecord]) -> Result<(), ClientError> {
        match self {
            Self::Remote(b) => b.persist(records).await,
            Self::Local(b) => b.persist(records).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::slots::temp_slots;

    #[test]
    fn session_selects_backend() {
        let (slots, dir) = temp_slots();
        let config = ClientConfig::new(dir.path().join("client.redb"));

        let guest = Backend::for_session(&Session::Guest, &config, &slots).unwrap();
        assert!(!guest.is_remote());

        let session = Session::Authenticated {
            token: "t".into(),
            user_id: "u1".into(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
        };
        let remote = Backend::for_session(&session, &config, &slots).unwrap();
        assert!(remote.is_remote());
    }
}
