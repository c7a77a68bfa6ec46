//! List query controller shared by the documents and users pages.

pub mod list;
pub mod mutation;
pub mod outcome;
pub mod pagination;
pub mod query;
pub mod registry;

pub use list::{ControllerOptions, ListController, ListEndpoint, ListIntent, ListResult, ListSnapshot};
pub use mutation::{Confirmation, MutationError};
pub use outcome::{MutationOutcome, OutcomeSlot};
pub use pagination::{page_window, PageLink, PaginationView, DEFAULT_WINDOW};
pub use query::{ListQuery, SortConfig, SortDirection};
pub use registry::ControllerRegistry;
