//! Page controllers: one generic list controller per page plus the
//! page's own mutations.

pub mod documents;
pub mod users;

pub use documents::{DocumentsEndpoint, DocumentsPage};
pub use users::{UsersEndpoint, UsersPage};
