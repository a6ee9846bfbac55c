use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use super::{Session, SessionSnapshot, SessionStore, SessionSummary};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed storage for sessions and local preferences
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Create a private in-memory database, mainly for tests
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            }
        })?;

        // One connection: every new connection would see its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get a full session, metadata included
    pub async fn get_session(&self, id: &str) -> StorageResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, name, created_at, content
            FROM sessions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Session::try_from).transpose()
    }

    /// Read a boolean preference; unset flags read as `false`
    pub async fn get_flag(&self, key: &str) -> StorageResult<bool> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.as_deref() == Some("true"))
    }

    /// Write a boolean preference
    pub async fn set_flag(&self, key: &str, value: bool) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(if value { "true" } else { "false" })
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        debug!(key, value, "Preference stored");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteStorage {
    async fn list_sessions(&self) -> StorageResult<Vec<SessionSummary>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT id, name
            FROM sessions
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| SessionSummary { id, name })
            .collect())
    }

    async fn insert_session(
        &self,
        name: &str,
        content: &SessionSnapshot,
    ) -> StorageResult<SessionSummary> {
        let session = Session::new(name, content.clone());
        let content = serde_json::to_string(&session.content)?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, name, created_at, content)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.name)
        .bind(timestamp(session.created_at))
        .bind(&content)
        .execute(&self.pool)
        .await?;

        info!(session_id = %session.id, name = %session.name, "Session saved");
        Ok(session.summary())
    }

    async fn fetch_session_content(&self, id: &str) -> StorageResult<SessionSnapshot> {
        let content: Option<String> =
            sqlx::query_scalar("SELECT content FROM sessions WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let content = content.ok_or_else(|| StorageError::SessionNotFound {
            session_id: id.to_string(),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn delete_session(&self, id: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(session_id = %id, deleted = result.rows_affected(), "Session delete");
        Ok(())
    }
}

/// RFC 3339 with fixed precision, so text order matches time order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// Internal row type for SQLx mapping
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    name: String,
    created_at: String,
    content: String,
}

impl TryFrom<SessionRow> for Session {
    type Error = StorageError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            content: serde_json::from_str(&row.content)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flags_default_to_false() {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        assert!(!storage.get_flag("tourHasRun").await.unwrap());

        storage.set_flag("tourHasRun", true).await.unwrap();
        assert!(storage.get_flag("tourHasRun").await.unwrap());

        storage.set_flag("tourHasRun", false).await.unwrap();
        assert!(!storage.get_flag("tourHasRun").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_session_includes_metadata() {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        let snapshot = SessionSnapshot {
            problem: "p".to_string(),
            ..Default::default()
        };
        let summary = storage.insert_session("First", &snapshot).await.unwrap();

        let session = storage.get_session(&summary.id).await.unwrap().unwrap();
        assert_eq!(session.name, "First");
        assert_eq!(session.content, snapshot);
        assert!(storage.get_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_missing_session() {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        let err = storage.fetch_session_content("nope").await.unwrap_err();
        assert!(matches!(err, StorageError::SessionNotFound { .. }));
    }

    #[test]
    fn test_timestamp_fixed_width() {
        let at = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp(at), "2025-01-01T00:00:00.000000Z");
    }
}
