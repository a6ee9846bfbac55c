//! # Strategy Facilitator
//!
//! Guides a user from a problem statement to an actionable plan with the
//! help of a hosted LLM, exposed as a Model Context Protocol (MCP) server.
//!
//! ## Workflow
//!
//! 1. **Define**: problem and context, typed, uploaded, or prefilled from a playbook
//! 2. **Suggestions**: a diagnosis and three candidate frameworks
//! 3. **Guidance**: steps, pitfalls and key questions for the chosen framework
//! 4. **Solution**: a final plan built from the answers, plus optional
//!    complexity scoring (Five Whys) and alternative solutions
//!
//! Sessions can be saved to the local SQLite database or a hosted table.
//!
//! ## Architecture
//!
//! ```text
//! MCP Client → MCP Server (Rust) → Gemini generateContent (HTTP)
//!                    ↓
//!       SQLite / hosted table (sessions)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use strategy_facilitator::{AppState, Config, McpServer};
//! use strategy_facilitator::llm::GeminiClient;
//! use strategy_facilitator::storage::SqliteStorage;
//! use strategy_facilitator::tour::Tour;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let storage = SqliteStorage::new(&config.database).await?;
//!     let model = GeminiClient::new(&config.model, config.request.clone())?;
//!     let state = Arc::new(AppState::new(config, Arc::new(model), Arc::new(storage), Tour::default()));
//!     McpServer::new(state).run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line interface.
pub mod cli;
/// Configuration loaded from the environment.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Problem/context intake: uploads, examples and the quality meter.
pub mod intake;
/// Model client, retry policy and wire types.
pub mod llm;
/// Consulting playbooks.
pub mod playbooks;
/// Prompt builders for each stage.
pub mod prompts;
/// MCP server implementation and request handling.
pub mod server;
/// LLM-backed workflow stages and their response schemas.
pub mod stages;
/// Session persistence.
pub mod storage;
/// Onboarding tour.
pub mod tour;
/// Workflow state machine and controller.
pub mod workflow;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, McpServer, SharedState};
pub use workflow::Facilitator;
