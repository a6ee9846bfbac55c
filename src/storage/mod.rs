//! Saved facilitation sessions.
//!
//! A session is a named snapshot of the whole workflow. Two stores are
//! provided: [`SqliteStorage`] keeps sessions (and local preferences) in an
//! embedded database; [`HostedSessionStore`] talks to a hosted table API.

mod hosted;
mod sqlite;


pub use hosted::HostedSessionStore;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::StorageResult;
use crate::stages::{
    AiResponse, AiSuggestedSolution, Answer, ComplexityScore, FinalSolution, FrameworkGuidance,
};

/// A saved session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Name chosen when saving
    pub name: String,
    /// When the session was saved
    pub created_at: DateTime<Utc>,
    /// Workflow snapshot
    pub content: SessionSnapshot,
}

impl Session {
    /// Create a new session with a fresh id
    pub fn new(name: impl Into<String>, content: SessionSnapshot) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
            content,
        }
    }

    /// Listing entry for this session
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Listing entry of a saved session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
}

/// Everything needed to resume a facilitation.
///
/// Missing or `null` fields load as their empty value, so snapshots written
/// by older versions stay readable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub problem: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: String,
    #[serde(default)]
    pub ai_response: Option<AiResponse>,
    #[serde(default)]
    pub active_framework: Option<String>,
    #[serde(default)]
    pub framework_guidance: Option<FrameworkGuidance>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub final_solution: Option<FinalSolution>,
    #[serde(default)]
    pub complexity_score: Option<ComplexityScore>,
    #[serde(default)]
    pub ai_suggested_solutions: Option<Vec<AiSuggestedSolution>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Persistence of saved sessions.
///
/// No transactions and no concurrency token: the last write wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// List saved sessions, newest first.
    async fn list_sessions(&self) -> StorageResult<Vec<SessionSummary>>;

    /// Save a snapshot under `name`.
    async fn insert_session(
        &self,
        name: &str,
        content: &SessionSnapshot,
    ) -> StorageResult<SessionSummary>;

    /// Load the snapshot of one session.
    ///
    /// # Errors
    /// [`StorageError::SessionNotFound`](crate::error::StorageError::SessionNotFound)
    /// if no session has this id.
    async fn fetch_session_content(&self, id: &str) -> StorageResult<SessionSnapshot>;

    /// Delete a session. Deleting an unknown id is not an error.
    async fn delete_session(&self, id: &str) -> StorageResult<()>;
}
