//! HTTP API exposing the lookup pipeline.

pub mod handlers;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
