//! coursectl-server: PostgreSQL store and server-rendered web interface
//!
//! `db` implements [`coursectl_core::RecordStore`] on top of sqlx/PostgreSQL;
//! `http` exposes the student and course pages through axum.

pub mod db;
pub mod http;

pub use db::{create_pool, PgStore};
pub use http::{build_router, run_server, AppState, ServerConfig};
