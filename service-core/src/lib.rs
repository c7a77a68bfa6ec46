//! service-core: shared web infrastructure for the admin front-end.
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use tracing;
