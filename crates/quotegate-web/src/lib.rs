//! Axum adapter for the quote gateway: routing table, handlers and the
//! error-to-status translation. The operation semantics live in
//! `quotegate-core`; this crate only binds them to HTTP.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
