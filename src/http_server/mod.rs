//! HTTP surface.
//!
//! External boundary only: handlers parse requests, call the ingestion
//! coordinator, and map outcomes to responses. The core never depends
//! on this module.

mod config;
mod errors;
mod routes;
mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use routes::{api_routes, AppState};
pub use server::HttpServer;
