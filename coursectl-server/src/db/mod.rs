//! Database layer - connection pool, migrations, repositories
//!
//! # Design Principles
//!
//! - Connection pool, never a shared connection behind a mutex
//! - List operations fetch enrollments in one extra query (no N+1)
//! - Rely on DB constraints for uniqueness and references
//! - Enrollment changes run in a transaction together with the counter

pub mod migrations;
pub mod pool;
pub mod repos;
pub mod store;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::DbError;
pub use store::PgStore;
