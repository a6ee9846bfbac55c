//! Server module for MCP protocol handling.
//!
//! This module provides:
//! - MCP server implementation over stdio
//! - Tool call handlers and routing
//! - Shared application state management

mod handlers;
mod mcp;

pub use handlers::*;
pub use mcp::*;

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::llm::ModelBackend;
use crate::playbooks::PlaybookRegistry;
use crate::stages::{StageCore, Stages};
use crate::storage::SessionStore;
use crate::tour::Tour;
use crate::workflow::Facilitator;

/// Application state shared across handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// The single facilitation driven by this server.
    pub facilitator: Facilitator,
    /// Built-in and registered playbooks.
    pub playbooks: PlaybookRegistry,
    /// Onboarding tour progression.
    pub tour: Mutex<Tour>,
    /// Server start; drives the problem placeholder rotation.
    pub started: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Config,
        model: Arc<dyn ModelBackend>,
        sessions: Arc<dyn SessionStore>,
        tour: Tour,
    ) -> Self {
        tracing::info!(
            model = %config.model.model,
            base_url = %config.model.base_url,
            "AppState initializing"
        );

        let stages = Stages::new(StageCore::new(model));

        Self {
            config,
            facilitator: Facilitator::new(stages, sessions),
            playbooks: PlaybookRegistry::new(),
            tour: Mutex::new(tour),
            started: Instant::now(),
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{
        DatabaseConfig, LogFormat, LoggingConfig, ModelConfig, RequestConfig, SessionBackend,
    };
    use crate::llm::MockModelBackend;
    use crate::storage::SqliteStorage;
    use std::path::PathBuf;

    pub fn test_config() -> Config {
        Config {
            model: ModelConfig {
                api_key: "test-key".to_string(),
                base_url: "http://localhost:0".to_string(),
                model: "test-model".to_string(),
            },
            database: DatabaseConfig {
                path: PathBuf::from(":memory:"),
                max_connections: 1,
            },
            sessions: SessionBackend::Sqlite,
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
            request: RequestConfig::default(),
        }
    }

    pub async fn shared_state(model: MockModelBackend) -> SharedState {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        Arc::new(AppState::new(
            test_config(),
            Arc::new(model),
            Arc::new(storage),
            Tour::default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use crate::llm::MockModelBackend;
    use crate::tour::TourStatus;
    use crate::workflow::Stage;

    #[tokio::test]
    async fn test_app_state_new() {
        let state = shared_state(MockModelBackend::new()).await;

        assert_eq!(state.config.model.api_key, "test-key");
        assert_eq!(state.playbooks.count(), 3);
        assert_eq!(state.tour.lock().await.status(), TourStatus::Idle);
        assert_eq!(state.facilitator.state().await.stage, Stage::Idle);
    }
}
