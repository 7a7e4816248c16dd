//! Schema creation command

use anyhow::{Context, Result};
use clap::Parser;

use coursectl_server::db::{create_pool, migrations};

use crate::config::CoursectlConfig;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Create the students, courses, and enrollment tables if missing.
pub async fn run_migrate(args: MigrateArgs, file: &CoursectlConfig) -> Result<()> {
    let database_url = args
        .database_url
        .or_else(|| file.database.url.clone())
        .context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env, \
             or [database] url in the config file",
        )?;

    let pool = create_pool(&database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!("schema is up to date");
    println!("Migrations applied");
    Ok(())
}
