//! Command-line interface.
//!
//! Without a subcommand the binary serves MCP over stdio. The other
//! subcommands inspect playbooks and saved sessions and exit.

use clap::{Parser, Subcommand};

use crate::playbooks::{PlaybookRegistry, ProblemCategory};
use crate::storage::SessionStore;

/// Strategy facilitator.
#[derive(Parser, Debug)]
#[command(name = "strategy-facilitator", version, about)]
pub struct Cli {
    /// Command to run (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Serve MCP over stdio
    Serve,

    /// List playbooks
    Playbooks {
        /// Filter by problem category, e.g. digital or market-entry
        #[arg(long)]
        category: Option<String>,
    },

    /// Manage saved sessions
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

/// Session subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SessionCommands {
    /// List saved sessions, newest first
    List,
    /// Print a saved session as JSON
    Show {
        /// Session ID
        id: String,
    },
    /// Delete a saved session
    Delete {
        /// Session ID
        id: String,
    },
}

/// Result of CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute the `playbooks` command.
pub fn execute_playbooks(registry: &PlaybookRegistry, category: Option<&str>) -> CliResult {
    let category = match category.map(str::parse::<ProblemCategory>).transpose() {
        Ok(c) => c,
        Err(e) => return CliResult::error(e),
    };

    let playbooks = registry.list(category);
    if playbooks.is_empty() {
        return CliResult::success("No playbooks found.");
    }

    let mut output = String::new();
    for p in playbooks {
        output.push_str(&format!(
            "{:<12} {:<40} {} / {} ({} frameworks)\n",
            p.id,
            p.name,
            p.sector,
            p.problem_category.as_str(),
            p.framework_count
        ));
    }
    CliResult::success(output)
}

/// Execute a `sessions` subcommand.
pub async fn execute_sessions(command: SessionCommands, store: &dyn SessionStore) -> CliResult {
    match command {
        SessionCommands::List => match store.list_sessions().await {
            Ok(sessions) if sessions.is_empty() => CliResult::success("No saved sessions."),
            Ok(sessions) => {
                let mut output = String::new();
                for s in sessions {
                    output.push_str(&format!("{}  {}\n", s.id, s.name));
                }
                CliResult::success(output)
            }
            Err(e) => CliResult::error(format!("Failed to list sessions: {}", e)),
        },
        SessionCommands::Show { id } => match store.fetch_session_content(&id).await {
            Ok(snapshot) => match serde_json::to_string_pretty(&snapshot) {
                Ok(json) => CliResult::success(json),
                Err(e) => CliResult::error(format!("Failed to render session: {}", e)),
            },
            Err(e) => CliResult::error(e.to_string()),
        },
        SessionCommands::Delete { id } => match store.delete_session(&id).await {
            Ok(()) => CliResult::success(format!("Deleted session {}", id)),
            Err(e) => CliResult::error(format!("Failed to delete session: {}", e)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SessionSnapshot, SqliteStorage};

    #[test]
    fn test_parse_default_is_serve() {
        let cli = Cli::try_parse_from(["strategy-facilitator"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli =
            Cli::try_parse_from(["strategy-facilitator", "playbooks", "--category", "digital"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Playbooks {
                category: Some("digital".to_string())
            })
        );

        let cli = Cli::try_parse_from(["strategy-facilitator", "sessions", "show", "abc"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Sessions {
                command: SessionCommands::Show {
                    id: "abc".to_string()
                }
            })
        );

        assert!(Cli::try_parse_from(["strategy-facilitator", "sessions", "show"]).is_err());
    }

    #[test]
    fn test_playbooks_listing() {
        let registry = PlaybookRegistry::new();

        let all = execute_playbooks(&registry, None);
        assert_eq!(all.exit_code, 0);
        assert_eq!(all.message.lines().count(), 3);
        assert!(all.message.starts_with("playbook-1"));

        let bad = execute_playbooks(&registry, Some("astrology"));
        assert_eq!(bad.exit_code, 1);
    }

    #[tokio::test]
    async fn test_sessions_commands() {
        let storage = SqliteStorage::new_in_memory().await.unwrap();

        let empty = execute_sessions(SessionCommands::List, &storage).await;
        assert_eq!(empty.message, "No saved sessions.");

        let snapshot = SessionSnapshot {
            problem: "Churn".to_string(),
            ..Default::default()
        };
        let saved = storage.insert_session("First", &snapshot).await.unwrap();

        let listed = execute_sessions(SessionCommands::List, &storage).await;
        assert!(listed.message.contains("First"));

        let shown = execute_sessions(SessionCommands::Show { id: saved.id.clone() }, &storage).await;
        assert_eq!(shown.exit_code, 0);
        assert!(shown.message.contains("\"problem\": \"Churn\""));

        let deleted =
            execute_sessions(SessionCommands::Delete { id: saved.id.clone() }, &storage).await;
        assert_eq!(deleted.exit_code, 0);

        let missing = execute_sessions(SessionCommands::Show { id: saved.id }, &storage).await;
        assert_eq!(missing.exit_code, 1);
        assert!(missing.message.starts_with("Session not found"));
    }
}
