// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the SaveKaro backend.
//!
//! Server records carry `_id`; [`from_wire`] is the single place that maps
//! them onto [`ExpenseRecord`]. No retries, caching or offline queue: a
//! non-2xx response is returned as a [`ClientError`].

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use super::{
    backend::ExpenseBackend,
    error::ClientError,
    record::{ExpenseRecord, NewExpense},
};

/// Expense as the server serializes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireExpense {
    #[serde(rename = "_id")]
    id: String,
    user: Option<String>,
    title: String,
    amount: f64,
    category: String,
    date: DateTime<Utc>,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    receipt: Option<String>,
}

/// Body for create and update.
#[derive(Debug, Serialize)]
struct WirePayload<'a> {
    title: &'a str,
    amount: f64,
    category: &'a str,
    date: String,
    notes: &'a str,
    receipt: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct WireDeleted {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Credential and profile returned by login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthGrant {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub name: String,
    pub email: String,
}

fn from_wire(wire: WireExpense) -> ExpenseRecord {
    ExpenseRecord {
        id: wire.id,
        user: wire.user,
        title: wire.title,
        amount: wire.amount,
        category: wire.category,
        date: wire.date,
        notes: wire.notes,
        receipt: wire.receipt,
    }
}

fn wire_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    base: Url,
    token: Option<String>,
    http: Client,
}

impl RemoteClient {
    /// `base_url` should end with `/`; see [`ClientConfig`](crate::config::ClientConfig).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)
            .map_err(|e| ClientError::Transport(format!("invalid base URL {base_url}: {e}")))?;
        let http = Client::builder()
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base,
            token: None,
            http,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::Transport(format!("invalid endpoint {path}: {e}")))
    }

    /// `api/expenses/{id}` with `id` encoded as one path segment.
    fn expense_endpoint(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint("api/expenses")?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Transport(format!("base URL {} has no path", self.base)))?
            .push(id);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, ClientError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        self.send(self.http.post(self.endpoint("api/users")?).json(&body))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.send(self.http.post(self.endpoint("api/users/login")?).json(&body))
            .await
    }

    pub async fn me(&self) -> Result<Profile, ClientError> {
        self.send(self.http.get(self.endpoint("api/users/me")?))
            .await
    }

    pub async fn list_expenses(&self) -> Result<Vec<ExpenseRecord>, ClientError> {
        let wire: Vec<WireExpense> = self
            .send(self.http.get(self.endpoint("api/expenses")?))
            .await?;
        Ok(wire.into_iter().map(from_wire).collect())
    }

    pub async fn create_expense(&self, draft: &NewExpense) -> Result<ExpenseRecord, ClientError> {
        let payload = WirePayload {
            title: draft.title.trim(),
            amount: draft.amount,
            category: draft.effective_category(),
            date: wire_date(draft.date),
            notes: &draft.notes,
            receipt: draft.receipt.as_deref(),
        };
        let wire: WireExpense = self
            .send(self.http.post(self.endpoint("api/expenses")?).json(&payload))
            .await?;
        Ok(from_wire(wire))
    }

    pub async fn update_expense(
        &self,
        id: &str,
        record: &ExpenseRecord,
    ) -> Result<ExpenseRecord, ClientError> {
        let payload = WirePayload {
            title: &record.title,
            amount: record.amount,
            category: &record.category,
            date: wire_date(record.date),
            notes: &record.notes,
            receipt: record.receipt.as_deref(),
        };
        let url = self.expense_endpoint(id)?;
        let wire: WireExpense = self.send(self.http.put(url).json(&payload)).await?;
        Ok(from_wire(wire))
    }

    pub async fn delete_expense(&self, id: &str) -> Result<String, ClientError> {
        let url = self.expense_endpoint(id)?;
        let deleted: WireDeleted = self.send(self.http.delete(url)).await?;
        Ok(deleted.id)
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorMessage>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    };
    Err(ClientError::from_status(status, message))
}

/// [`ExpenseBackend`] that forwards every mutation to the server.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: RemoteClient,
}

impl RemoteBackend {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RemoteClient {
        &self.client
    }
}

impl ExpenseBackend for RemoteBackend {
    async fn list(&self) -> Result<Vec<ExpenseRecord>, ClientError> {
        self.client.list_expenses().await.inspect_err(|e| {
            tracing::warn!(error = %e, "failed to fetch expenses");
        })
    }

    async fn create(&self, draft: NewExpense) -> Result<ExpenseRecord, ClientError> {
        self.client.create_expense(&draft).await.inspect_err(|e| {
            tracing::warn!(error = %e, "failed to create expense");
        })
    }

    async fn update(&self, record: &ExpenseRecord) -> Result<ExpenseRecord, ClientError> {
        self.client
            .update_expense(&record.id, record)
            .await
            .inspect_err(|e| tracing::warn!(expense_id = %record.id, error = %e, "failed to update expense"))
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client
            .delete_expense(id)
            .await
            .map(|_| ())
            .inspect_err(|e| tracing::warn!(expense_id = %id, error = %e, "failed to delete expense"))
    }

    /// The server is the source of truth.
    async fn persist(&self, _records: &[ExpenseRecord]) -> Result<(), ClientError> {
        Ok(())
    }
}
