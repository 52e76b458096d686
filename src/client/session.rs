// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Who the client is acting for, and the marker that remembers it between
//! runs.
//!
//! The marker in the `user` slot is the login response itself
//! (`{"_id","name","email","token"}`) or `{"name":"Guest","isGuest":true}`.

use serde::{Deserialize, Serialize};

use super::{
    error::ClientError,
    remote::{AuthGrant, RemoteClient},
    slots::{SlotStore, SESSION_SLOT},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Authenticated {
        token: String,
        user_id: String,
        name: String,
        email: String,
    },
    Guest,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionMarker {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_guest: bool,
}

impl From<&Session> for SessionMarker {
    fn from(session: &Session) -> Self {
        match session {
            Session::Authenticated {
                token,
                user_id,
                name,
                email,
            } => Self {
                id: Some(user_id.clone()),
                name: name.clone(),
                email: Some(email.clone()),
                token: Some(token.clone()),
                is_guest: false,
            },
            Session::Guest => Self {
                name: "Guest".to_string(),
                is_guest: true,
                ..Default::default()
            },
        }
    }
}

impl SessionMarker {
    fn into_session(self) -> Option<Session> {
        if self.is_guest {
            return Some(Session::Guest);
        }
        Some(Session::Authenticated {
            token: self.token?,
            user_id: self.id?,
            email: self.email?,
            name: self.name,
        })
    }
}

impl From<AuthGrant> for Session {
    fn from(grant: AuthGrant) -> Self {
        Session::Authenticated {
            token: grant.token,
            user_id: grant.user_id,
            name: grant.name,
            email: grant.email,
        }
    }
}

impl Session {
    /// The session remembered from a previous run, if any. An unreadable
    /// marker counts as logged out.
    pub fn restore(slots: &SlotStore) -> Option<Session> {
        let raw = match slots.get(SESSION_SLOT) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session marker");
                return None;
            }
        };
        match serde_json::from_str::<SessionMarker>(&raw) {
            Ok(marker) => marker.into_session(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparsable session marker");
                None
            }
        }
    }

    pub async fn login(
        remote: &RemoteClient,
        slots: &SlotStore,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let session = Session::from(remote.login(email, password).await?);
        session.remember(slots)?;
        tracing::info!("logged in");
        Ok(session)
    }

    pub async fn register(
        remote: &RemoteClient,
        slots: &SlotStore,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let session = Session::from(remote.register(name, email, password).await?);
        session.remember(slots)?;
        tracing::info!("registered new account");
        Ok(session)
    }

    /// Continue without an account; data stays on this device.
    pub fn guest(slots: &SlotStore) -> Result<Session, ClientError> {
        let session = Session::Guest;
        session.remember(slots)?;
        Ok(session)
    }

    /// Forget the session marker.
    pub fn logout(slots: &SlotStore) -> Result<(), ClientError> {
        slots.remove(SESSION_SLOT)?;
        Ok(())
    }

    fn remember(&self, slots: &SlotStore) -> Result<(), ClientError> {
        let json = serde_json::to_string(&SessionMarker::from(self))
            .map_err(|e| ClientError::Validation(format!("unserializable session: {e}")))?;
        slots.set(SESSION_SLOT, &json)?;
        Ok(())
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Session::Guest)
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated { token, .. } => Some(token),
            Session::Guest => None,
        }
    }
}
