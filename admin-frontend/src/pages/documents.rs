use crate::controller::{
    Confirmation, ControllerOptions, ListController, ListEndpoint, MutationError,
};
use crate::models::{Document, DocumentEdit, NewDocument};
use crate::services::{AccessToken, ApiError, BackendClient};
use std::sync::{Arc, Mutex};

pub const UPLOAD_SUCCESS: &str = "Document uploaded successfully!";
pub const UPDATE_SUCCESS: &str = "Document updated successfully!";
pub const DELETE_SUCCESS: &str = "Document deleted successfully!";
pub const SET_ACTIVE_SUCCESS: &str = "Active documents updated successfully!";

pub struct DocumentsEndpoint;

impl ListEndpoint for DocumentsEndpoint {
    type Item = Document;

    const PATH: &'static str = "/documents";
    const NAME: &'static str = "documents";
    const FETCH_ERROR: &'static str = "Failed to fetch documents";
    const FILTERS: &'static [&'static str] = &["type", "isActive"];

    fn item_id(item: &Document) -> &str {
        &item.id
    }
}

/// Documents list plus the "active documents" strip shown above it.
pub struct DocumentsPage {
    list: ListController<DocumentsEndpoint>,
    active: Mutex<Vec<Document>>,
}

impl DocumentsPage {
    pub fn new(backend: Arc<BackendClient>, options: ControllerOptions) -> Self {
        Self {
            list: ListController::new(backend, options),
            active: Mutex::new(Vec::new()),
        }
    }

    pub fn list(&self) -> &ListController<DocumentsEndpoint> {
        &self.list
    }

    pub fn active_documents(&self) -> Vec<Document> {
        self.active
            .lock()
            .map(|active| active.clone())
            .unwrap_or_default()
    }

    /// Reloads the current page and the active strip.
    pub async fn refresh(&self, token: &AccessToken) {
        let (list, active) = tokio::join!(self.list.fetch(token), self.refresh_active(token));
        if list.is_err() || active.is_err() {
            tracing::debug!("Documents page refreshed with errors");
        }
    }

    /// A failure keeps the previous strip and is only logged; the table's
    /// banner belongs to the list and mutations.
    pub async fn refresh_active(&self, token: &AccessToken) -> Result<(), ApiError> {
        match self.list.backend().active_documents(token).await {
            Ok(documents) => {
                if let Ok(mut active) = self.active.lock() {
                    *active = documents;
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch active documents");
                Err(err)
            }
        }
    }

    pub async fn upload(
        &self,
        token: &AccessToken,
        document: NewDocument,
    ) -> Result<(), MutationError> {
        let result = self
            .list
            .mutate(token, UPLOAD_SUCCESS, || async {
                let title = document.title.trim();
                let file = match (&document.file, title.is_empty()) {
                    (Some(file), false) => file,
                    _ => {
                        return Err(MutationError::Invalid(
                            "Please provide a title and select a file.".to_string(),
                        ))
                    }
                };

                let document = NewDocument {
                    title: title.to_string(),
                    description: document.description.trim().to_string(),
                    file: None,
                };
                self.list
                    .backend()
                    .upload_document(token, &document, file)
                    .await
                    .map_err(|e| MutationError::rejected(e, "Failed to upload document"))
            })
            .await;

        self.after_mutation(token, &result).await;
        result
    }

    /// Saves metadata, then the replacement file if one was picked.
    ///
    /// A file failure after saved metadata is a [`MutationError::Partial`];
    /// nothing is rolled back.
    pub async fn edit(
        &self,
        token: &AccessToken,
        id: &str,
        edit: DocumentEdit,
    ) -> Result<(), MutationError> {
        let result = self
            .list
            .mutate(token, UPDATE_SUCCESS, || async {
                let mut metadata = edit.metadata.clone();
                metadata.title = metadata.title.trim().to_string();
                if metadata.title.is_empty() {
                    return Err(MutationError::Invalid("Title is required.".to_string()));
                }

                let backend = self.list.backend();
                backend
                    .update_document(token, id, &metadata)
                    .await
                    .map_err(|e| MutationError::rejected(e, "Failed to update document"))?;

                if let Some(file) = &edit.replacement {
                    backend
                        .replace_document_file(token, id, file)
                        .await
                        .map_err(|e| {
                            let reason = e.user_message("Failed to upload document file");
                            MutationError::partial(
                                e,
                                format!(
                                    "Document details were saved, but the file upload failed: {}",
                                    reason
                                ),
                            )
                        })?;
                }

                Ok(())
            })
            .await;

        self.after_mutation(token, &result).await;
        result
    }

    /// Returns `Ok(false)` when the operator declined; nothing is sent then.
    pub async fn delete(
        &self,
        token: &AccessToken,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<bool, MutationError> {
        if !confirmation.is_confirmed() {
            tracing::debug!(document_id = %id, "Document delete declined");
            return Ok(false);
        }

        let result = self
            .list
            .mutate(token, DELETE_SUCCESS, || async {
                self.list
                    .backend()
                    .delete_document(token, id)
                    .await
                    .map_err(|e| MutationError::rejected(e, "Failed to delete document"))
            })
            .await;

        self.after_mutation(token, &result).await;
        result.map(|()| true)
    }

    /// Marks exactly the selected documents as active.
    pub async fn set_active(
        &self,
        token: &AccessToken,
        document_ids: Vec<String>,
    ) -> Result<(), MutationError> {
        let result = self
            .list
            .mutate(token, SET_ACTIVE_SUCCESS, || async {
                let ids: Vec<String> = document_ids
                    .into_iter()
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect();
                if ids.is_empty() {
                    return Err(MutationError::Invalid(
                        "Select at least one document.".to_string(),
                    ));
                }

                self.list
                    .backend()
                    .set_active_documents(token, ids)
                    .await
                    .map_err(|e| MutationError::rejected(e, "Failed to set active documents"))
            })
            .await;

        self.after_mutation(token, &result).await;
        result
    }

    async fn after_mutation(&self, token: &AccessToken, result: &Result<(), MutationError>) {
        // A refused duplicate never ran, so there is nothing new to show.
        if !matches!(result, Err(MutationError::InProgress)) {
            let _ = self.refresh_active(token).await;
        }
    }
}
