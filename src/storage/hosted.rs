//! Session store backed by a hosted PostgREST table.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{error, info};

use super::{SessionSnapshot, SessionStore, SessionSummary};
use crate::config::HostedTableConfig;
use crate::error::{StorageError, StorageResult};
use crate::llm::RetryPolicy;

/// Client for the hosted `sessions` table.
///
/// Store calls are not retried unless a policy is supplied with
/// [`with_retry_policy`](Self::with_retry_policy).
#[derive(Clone)]
pub struct HostedSessionStore {
    client: Client,
    table_url: String,
    api_key: String,
    retry: RetryPolicy<StorageError>,
}

#[derive(Serialize)]
struct NewSessionRow<'a> {
    name: &'a str,
    content: &'a SessionSnapshot,
}

#[derive(Deserialize)]
struct SummaryRow {
    #[serde(deserialize_with = "id_as_string")]
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ContentRow {
    content: SessionSnapshot,
}

/// Accept numeric (bigserial) or text (uuid) primary keys.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RowId {
        Number(i64),
        Text(String),
    }

    Ok(match RowId::deserialize(deserializer)? {
        RowId::Number(n) => n.to_string(),
        RowId::Text(s) => s,
    })
}

impl HostedSessionStore {
    /// Create a new client
    pub fn new(config: &HostedTableConfig, timeout_ms: u64) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            client,
            table_url: format!(
                "{}/rest/v1/{}",
                config.url.trim_end_matches('/'),
                config.table
            ),
            api_key: config.api_key.clone(),
            retry: RetryPolicy::none(),
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy<StorageError>) -> Self {
        self.retry = retry;
        self
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn check(operation: &str, response: Response) -> StorageResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        error!(
            operation,
            status = status.as_u16(),
            message = %message,
            "Hosted table request failed"
        );
        Err(StorageError::Hosted {
            status: status.as_u16(),
            message,
        })
    }

    async fn list_once(&self) -> StorageResult<Vec<SessionSummary>> {
        let response = self
            .authorized(self.client.get(&self.table_url))
            .query(&[("select", "id,name"), ("order", "created_at.desc")])
            .send()
            .await?;
        let rows: Vec<SummaryRow> = Self::check("list_sessions", response).await?.json().await?;

        Ok(rows
            .into_iter()
            .map(|r| SessionSummary {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn insert_once(
        &self,
        name: &str,
        content: &SessionSnapshot,
    ) -> StorageResult<SessionSummary> {
        let response = self
            .authorized(self.client.post(&self.table_url))
            .query(&[("select", "id,name")])
            .header("Prefer", "return=representation")
            .json(&NewSessionRow { name, content })
            .send()
            .await?;
        let rows: Vec<SummaryRow> = Self::check("insert_session", response).await?.json().await?;

        let row = rows.into_iter().next().ok_or_else(|| StorageError::Query {
            message: "Insert returned no rows".to_string(),
        })?;
        info!(session_id = %row.id, name = %row.name, "Session saved");
        Ok(SessionSummary {
            id: row.id,
            name: row.name,
        })
    }

    async fn fetch_once(&self, id: &str) -> StorageResult<SessionSnapshot> {
        let response = self
            .authorized(self.client.get(&self.table_url))
            .query(&[("select", "content".to_string()), ("id", format!("eq.{}", id))])
            .send()
            .await?;
        let rows: Vec<ContentRow> =
            Self::check("fetch_session_content", response).await?.json().await?;

        rows.into_iter()
            .next()
            .map(|r| r.content)
            .ok_or_else(|| StorageError::SessionNotFound {
                session_id: id.to_string(),
            })
    }

    async fn delete_once(&self, id: &str) -> StorageResult<()> {
        let response = self
            .authorized(self.client.delete(&self.table_url))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        Self::check("delete_session", response).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for HostedSessionStore {
    async fn list_sessions(&self) -> StorageResult<Vec<SessionSummary>> {
        self.retry.run("list_sessions", move || self.list_once()).await
    }

    async fn insert_session(
        &self,
        name: &str,
        content: &SessionSnapshot,
    ) -> StorageResult<SessionSummary> {
        self.retry
            .run("insert_session", move || self.insert_once(name, content))
            .await
    }

    async fn fetch_session_content(&self, id: &str) -> StorageResult<SessionSnapshot> {
        self.retry
            .run("fetch_session_content", move || self.fetch_once(id))
            .await
    }

    async fn delete_session(&self, id: &str) -> StorageResult<()> {
        self.retry
            .run("delete_session", move || self.delete_once(id))
            .await
    }
}
