//! coursectl CLI - academic records manager
//!
//! Entry point for the coursectl command-line tool, which provides:
//! - The student/course web interface (`serve`)
//! - PostgreSQL schema setup (`migrate`)
//! - Configuration file helpers (`config`)

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use config::CoursectlConfig;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "coursectl",
    author,
    version,
    about = "Manage students, courses, and enrollments through a small web interface",
    long_about = "Serve server-rendered student and course pages backed by PostgreSQL \
                  (or an in-memory store), keeping each course's student count in step \
                  with its enrollments."
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Create the database tables if they do not exist
    Migrate(commands::migrate::MigrateArgs),
    /// Inspect or create the configuration file (path, show, init)
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; values may come from the real environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let file_config = load_config(cli.debug)?;
            commands::run_serve(args, &file_config).await?
        }
        Commands::Migrate(args) => {
            let file_config = load_config(cli.debug)?;
            commands::run_migrate(args, &file_config).await?
        }
        // Must keep working when the file itself is broken
        Commands::Config(args) => {
            init_tracing(cli.debug, None);
            config::run_config(args)?
        }
    }
    Ok(())
}

/// Read the config file and start tracing with its log level.
fn load_config(debug: bool) -> Result<CoursectlConfig> {
    let file_config = CoursectlConfig::load()?;
    init_tracing(debug, file_config.log_level.clone());
    Ok(file_config)
}

fn init_tracing(debug: bool, default_level: Option<String>) {
    tracing_setup::init(&TracingConfig {
        debug,
        default_level,
    })
    .ok();
}
