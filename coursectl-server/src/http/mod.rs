//! HTTP server layer
//!
//! Axum server with:
//! - Server-rendered HTML pages for students and courses
//! - Form posts answered with 303 redirects
//! - Request tracing and timeout
//! - Graceful shutdown

pub mod error;
pub mod extractors;
pub mod forms;
pub mod routes;
pub mod server;
pub mod views;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig};
