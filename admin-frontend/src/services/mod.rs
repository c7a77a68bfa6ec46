pub mod backend_client;
pub mod metrics;

pub use backend_client::{AccessToken, ApiError, BackendClient, Download};
