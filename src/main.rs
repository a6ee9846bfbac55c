use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strategy_facilitator::{
    cli::{execute_playbooks, execute_sessions, Cli, Command},
    config::{Config, LogFormat, SessionBackend},
    llm::{GeminiClient, ModelBackend},
    playbooks::PlaybookRegistry,
    server::{AppState, McpServer},
    storage::{HostedSessionStore, SessionStore, SqliteStorage},
    tour::{start_if_first_run, Tour},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    // Serving needs the model, so a missing API key stops here
    let loaded = match command {
        Command::Serve => Config::from_env(),
        _ => Config::from_env_offline(),
    };
    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    match command {
        Command::Serve => serve(config).await,
        Command::Playbooks { category } => {
            let result = execute_playbooks(&PlaybookRegistry::new(), category.as_deref());
            finish(result.exit_code, &result.message)
        }
        Command::Sessions { command } => {
            let storage = SqliteStorage::new(&config.database).await?;
            let store = session_store(&config, &storage)?;
            let result = execute_sessions(command, store.as_ref()).await;
            finish(result.exit_code, &result.message)
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Strategy facilitator starting..."
    );

    let storage = match SqliteStorage::new(&config.database).await {
        Ok(s) => {
            info!(path = %config.database.path.display(), "Database initialized");
            s
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            return Err(e.into());
        }
    };

    let model: Arc<dyn ModelBackend> =
        match GeminiClient::new(&config.model, config.request.clone()) {
            Ok(c) => {
                info!(base_url = %c.base_url(), model = %c.model(), "Model client initialized");
                Arc::new(c)
            }
            Err(e) => {
                error!(error = %e, "Failed to initialize model client");
                return Err(e.into());
            }
        };

    let sessions = session_store(&config, &storage)?;

    let mut tour = Tour::default();
    if let Err(e) = start_if_first_run(&storage, &mut tour).await {
        warn!(error = %e, "Could not read the tour flag, tour not started");
    }

    let state = Arc::new(AppState::new(config, model, sessions, tour));
    let server = McpServer::new(state);

    info!("Server ready, waiting for requests on stdin...");

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

fn session_store(
    config: &Config,
    storage: &SqliteStorage,
) -> anyhow::Result<Arc<dyn SessionStore>> {
    Ok(match &config.sessions {
        SessionBackend::Sqlite => Arc::new(storage.clone()),
        SessionBackend::Hosted(hosted) => {
            info!(url = %hosted.url, table = %hosted.table, "Using hosted session table");
            Arc::new(HostedSessionStore::new(hosted, config.request.timeout_ms)?)
        }
    })
}

fn finish(exit_code: i32, message: &str) -> anyhow::Result<()> {
    if exit_code == 0 {
        println!("{}", message.trim_end());
        Ok(())
    } else {
        eprintln!("{}", message.trim_end());
        std::process::exit(exit_code);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
