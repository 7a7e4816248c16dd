//! HTTP server command
//!
//! Runs the student/course pages against PostgreSQL, or against the
//! in-memory store with `--in-memory`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use coursectl_core::{MemoryStore, RecordStore};
use coursectl_server::db::{create_pool_with_options, migrations, pool::DEFAULT_MAX_CONNECTIONS};
use coursectl_server::http::{run_server, AppState, ServerConfig};
use coursectl_server::PgStore;

use crate::config::CoursectlConfig;

const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[arg(long, short = 'b', env = "COURSECTL_BIND")]
    pub bind: Option<SocketAddr>,

    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep records in process memory instead of PostgreSQL (ignores DATABASE_URL)
    #[arg(long)]
    pub in_memory: bool,

    /// Skip creating tables at startup
    #[arg(long)]
    pub skip_migrations: bool,

    /// Per-request timeout in seconds (default: 30)
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

/// Flags first, then the config file, then built-in defaults.
fn server_config(args: &ServeArgs, file: &CoursectlConfig) -> Result<ServerConfig> {
    let bind_addr = match args.bind.or(file.server.bind) {
        Some(addr) => addr,
        None => DEFAULT_BIND.parse().context("invalid default bind address")?,
    };
    let timeout_secs = args
        .request_timeout
        .or(file.server.request_timeout_secs)
        .unwrap_or(30);

    Ok(ServerConfig {
        bind_addr,
        request_timeout: Duration::from_secs(timeout_secs),
        cors_permissive: args.cors_permissive || file.server.cors_permissive.unwrap_or(false),
    })
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, file: &CoursectlConfig) -> Result<()> {
    let config = server_config(&args, file)?;

    let (store, kind): (Arc<dyn RecordStore>, &'static str) = if args.in_memory {
        tracing::warn!("in-memory store selected, records are lost on exit");
        (Arc::new(MemoryStore::new()), "memory")
    } else {
        let database_url = args
            .database_url
            .or_else(|| file.database.url.clone())
            .context(
                "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env, \
                 or [database] url in the config file (or use --in-memory)",
            )?;
        let max_connections = file
            .database
            .max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let pool = create_pool_with_options(&database_url, max_connections)
            .await
            .context("Failed to create database pool")?;

        if !args.skip_migrations {
            migrations::run(&pool)
                .await
                .context("Failed to run migrations")?;
        }

        (Arc::new(PgStore::new(pool)), "postgres")
    };

    tracing::info!("Starting coursectl server on {}", config.bind_addr);

    run_server(AppState::new(store, kind), config)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> ServeArgs {
        let mut argv = vec!["serve"];
        argv.extend_from_slice(extra);
        ServeArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_file() {
        let mut file = CoursectlConfig::default();
        file.server.bind = Some("0.0.0.0:9000".parse().unwrap());
        file.server.request_timeout_secs = Some(5);

        let config = server_config(&args(&["--bind", "127.0.0.1:7000"]), &file).unwrap();
        assert_eq!(config.bind_addr.port(), 7000);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn defaults_without_file() {
        let config = server_config(&args(&[]), &CoursectlConfig::default()).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.cors_permissive);
    }

    #[test]
    fn in_memory_accepts_a_database_url() {
        let parsed = args(&["--in-memory", "--database-url", "postgres://x"]);
        assert!(parsed.in_memory);
        assert_eq!(parsed.database_url.as_deref(), Some("postgres://x"));
    }
}
