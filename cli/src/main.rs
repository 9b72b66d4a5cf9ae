// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Aula CLI
//!
//! The `aula` binary runs the academic registry service.
//!
//! ## Commands
//!
//! - `aula serve` - Run the HTTP service until Ctrl+C / SIGTERM
//! - `aula init-db --schema <FILE>` - Apply an operator-supplied SQL script
//!   (schema, triggers, seed rows) to the configured database

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use aula_core::infrastructure::config::{ServiceConfig, TokenConfig};
use aula_core::infrastructure::db::Database;
use aula_core::infrastructure::postgres::{
    PgAccountService, PgEnrollmentService, PgGradingService, PgReportingService,
};
use aula_core::infrastructure::token::{TokenIssuer, TokenVerifier};
use aula_core::presentation::{app, AppState};

/// Aula academic registry - enrollment, grading, and reporting service
#[derive(Parser)]
#[command(name = "aula")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Postgres DSN
    #[arg(long, global = true, env = "DATABASE_URL", value_name = "DSN")]
    database_url: Option<String>,

    /// HTTP host (default: 127.0.0.1)
    #[arg(long, global = true, env = "AULA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// HTTP port (default: 8080)
    #[arg(long, global = true, env = "AULA_PORT", default_value = "8080")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AULA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    #[command(name = "serve")]
    Serve {
        /// HMAC secret for bearer token signing
        #[arg(long, env = "AULA_TOKEN_SECRET", value_name = "SECRET")]
        token_secret: String,

        /// Token lifetime in hours
        #[arg(long, env = "AULA_TOKEN_TTL_HOURS", default_value = "24")]
        token_ttl_hours: i64,
    },

    /// Apply a SQL script to the configured database
    #[command(name = "init-db")]
    InitDb {
        /// Path to the SQL script
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let database_url = cli
        .database_url
        .context("DATABASE_URL (or --database-url) is required")?;

    match cli.command {
        Commands::Serve {
            token_secret,
            token_ttl_hours,
        } => {
            let config = ServiceConfig {
                database_url,
                host: cli.host,
                port: cli.port,
                token: TokenConfig {
                    secret: token_secret,
                    ttl_hours: token_ttl_hours,
                },
            };
            serve(config).await
        }
        Commands::InitDb { schema } => init_db(&database_url, &schema).await,
    }
}

async fn serve(config: ServiceConfig) -> Result<()> {
    config.validate()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to the database")?;

    let issuer = TokenIssuer::new(&config.token);
    let state = AppState {
        accounts: Arc::new(PgAccountService::new(db.clone(), issuer)),
        enrollment: Arc::new(PgEnrollmentService::new(db.clone())),
        grading: Arc::new(PgGradingService::new(db.clone())),
        reporting: Arc::new(PgReportingService::new(db)),
        verifier: TokenVerifier::new(&config.token),
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Aula listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Aula shutting down");

    Ok(())
}

async fn init_db(database_url: &str, schema: &PathBuf) -> Result<()> {
    let sql = tokio::fs::read_to_string(schema)
        .await
        .with_context(|| format!("Failed to read {}", schema.display()))?;

    let db = Database::connect(database_url)
        .await
        .context("Failed to connect to the database")?;

    db.execute_script(&sql)
        .await
        .context("Schema script failed")?;

    info!("Applied {}", schema.display());
    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
