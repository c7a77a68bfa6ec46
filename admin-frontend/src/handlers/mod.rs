pub mod app;
pub mod auth;
pub mod documents;
pub mod metrics;
pub mod users;
