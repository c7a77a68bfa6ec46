pub mod document;
pub mod user;

pub use document::{
    Document, DocumentEdit, DocumentMetadata, FileUpload, NewDocument, SetActiveRequest,
    DOCUMENT_FILE_TYPES,
};
pub use user::{AuthUser, NewUser, User, UserUpdate, USER_SORT_KEYS};
