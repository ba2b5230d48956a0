//! HTTP API: routes, extractors, error mapping

pub mod extractors;
pub mod middleware;
pub mod routes;
mod server;
pub mod types;

pub use routes::QueryApiState;
pub use server::{ApiServer, build_router};
