use crate::controller::{Confirmation, ListIntent, PaginationView};
use crate::models::{
    AuthUser, Document, DocumentEdit, DocumentMetadata, FileUpload, NewDocument,
    DOCUMENT_FILE_TYPES,
};
use crate::pages::DocumentsPage;
use crate::views::{render, select_options, status_options, AlertView, SelectOption};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;

const ALERT_URL: &str = "/documents/alert";

#[derive(Template)]
#[template(path = "documents.html")]
pub struct DocumentsTemplate {
    pub display_name: String,
    pub current_page: &'static str,
    pub region: String,
    pub active: String,
}

#[derive(Template)]
#[template(path = "documents_region.html")]
pub struct DocumentsRegionTemplate {
    pub documents: Vec<Document>,
    pub loaded: bool,
    pub search: String,
    pub type_options: Vec<SelectOption>,
    pub status_options: Vec<SelectOption>,
    pub pagination: PaginationView,
    pub table_url: &'static str,
    pub alert: AlertView,
    pub alert_url: &'static str,
    pub alert_id: &'static str,
}

#[derive(Template)]
#[template(path = "active_documents.html")]
pub struct ActiveDocumentsTemplate {
    pub documents: Vec<Document>,
    pub oob: bool,
}

#[derive(Template)]
#[template(path = "document_edit.html")]
pub struct DocumentEditTemplate {
    pub document: Document,
}

#[derive(Template)]
#[template(path = "alert.html")]
pub struct AlertTemplate {
    pub alert: AlertView,
    pub alert_url: &'static str,
    pub alert_id: &'static str,
}

/// Intents sent by the table controls. Absent fields leave the query alone;
/// an empty `type`/`is_active` clears that filter.
#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    pub page: Option<u32>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub is_active: Option<String>,
    #[serde(default)]
    pub reset: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    pub confirm: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveForm {
    #[serde(default)]
    pub document_ids: Vec<String>,
}

fn region(page: &DocumentsPage) -> Result<String, AppError> {
    let snapshot = page.list().snapshot();
    let query = &snapshot.query;

    let type_choices: Vec<(&str, &str)> = std::iter::once(("", "All types"))
        .chain(DOCUMENT_FILE_TYPES.iter().map(|t| (*t, *t)))
        .collect();

    render(&DocumentsRegionTemplate {
        documents: snapshot.items,
        loaded: snapshot.loaded,
        search: query.search().unwrap_or_default().to_string(),
        type_options: select_options(&type_choices, query.filter("type")),
        status_options: status_options(query.filter("isActive")),
        pagination: snapshot.pagination,
        table_url: "/documents/table",
        alert: AlertView::from_outcome(snapshot.outcome, snapshot.message_ttl_secs),
        alert_url: ALERT_URL,
        alert_id: "documents-alert",
    })
}

fn active_strip(page: &DocumentsPage, oob: bool) -> Result<String, AppError> {
    render(&ActiveDocumentsTemplate {
        documents: page.active_documents(),
        oob,
    })
}

/// Region plus an out-of-band refresh of the active strip.
fn mutation_response(page: &DocumentsPage) -> Result<Response, AppError> {
    let body = format!("{}{}", region(page)?, active_strip(page, true)?);
    Ok(Html(body).into_response())
}

pub async fn documents_page(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let page = state.documents_for(&user);
    page.refresh(&user.access_token).await;

    Ok(DocumentsTemplate {
        display_name: user.display_name.clone(),
        current_page: "documents",
        region: region(&page)?,
        active: active_strip(&page, false)?,
    })
}

pub async fn documents_table(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<TableParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.documents_for(&user);
    let list = page.list();

    if params.reset {
        list.apply(ListIntent::Reset);
    }
    if let Some(value) = params.file_type {
        list.apply(ListIntent::Filter {
            name: "type".to_string(),
            value,
        });
    }
    if let Some(value) = params.is_active {
        list.apply(ListIntent::Filter {
            name: "isActive".to_string(),
            value,
        });
    }
    if let Some(number) = params.page {
        list.apply(ListIntent::Page(number));
    }

    let _ = list.fetch(&user.access_token).await;
    Ok(Html(region(&page)?))
}

pub async fn search_documents(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<SearchForm>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.documents_for(&user);
    page.list().apply(ListIntent::Search(form.search));
    let _ = page.list().fetch(&user.access_token).await;
    Ok(Html(region(&page)?))
}

pub async fn active_documents(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let page = state.documents_for(&user);
    let _ = page.refresh_active(&user.access_token).await;
    Ok(Html(active_strip(&page, false)?))
}

pub async fn upload_document(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = DocumentForm::read(multipart).await?;
    let page = state.documents_for(&user);

    let result = page
        .upload(
            &user.access_token,
            NewDocument {
                title: form.title,
                description: form.description,
                file: form.file,
            },
        )
        .await;
    log_result("upload", None, &result);

    mutation_response(&page)
}

pub async fn edit_form(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.documents_for(&user);
    let document = page
        .list()
        .find(&id)
        .ok_or_else(|| AppError::NotFound("Document is no longer on this page".to_string()))?;

    Ok(DocumentEditTemplate { document })
}

pub async fn update_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = DocumentForm::read(multipart).await?;
    let page = state.documents_for(&user);

    let result = page
        .edit(
            &user.access_token,
            &id,
            DocumentEdit {
                metadata: DocumentMetadata {
                    title: form.title,
                    description: form.description,
                    is_active: form.is_active,
                },
                replacement: form.file,
            },
        )
        .await;
    log_result("update", Some(&id), &result);

    mutation_response(&page)
}

pub async fn delete_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Result<Response, AppError> {
    let page = state.documents_for(&user);
    let confirmation = Confirmation::from_flag(form.confirm.as_deref());

    let result = page.delete(&user.access_token, &id, confirmation).await;
    if matches!(result, Ok(false)) {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    log_result("delete", Some(&id), &result.map(|_| ()));

    mutation_response(&page)
}

pub async fn set_active_documents(
    State(state): State<AppState>,
    user: AuthUser,
    axum_extra::extract::Form(form): axum_extra::extract::Form<SetActiveForm>,
) -> Result<Response, AppError> {
    let page = state.documents_for(&user);
    let count = form.document_ids.len();

    let result = page.set_active(&user.access_token, form.document_ids).await;
    if result.is_ok() {
        tracing::info!(count, "Active documents replaced");
    }
    log_result("set_active", None, &result);

    mutation_response(&page)
}

/// Streams the file back through this server so the bearer token never
/// reaches the browser.
pub async fn download_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let page = state.documents_for(&user);

    let download = state
        .backend
        .download_document(&user.access_token, &id)
        .await
        .map_err(|e| match e.status() {
            Some(StatusCode::NOT_FOUND) => AppError::NotFound("Document not found".to_string()),
            _ => AppError::BadGateway(
                e.user_message("Error downloading document. Please try again."),
            ),
        })?;

    let disposition = download.content_disposition.unwrap_or_else(|| {
        let file_name = page
            .list()
            .find(&id)
            .or_else(|| page.active_documents().into_iter().find(|d| d.id == id))
            .map(|d| d.fallback_file_name())
            .unwrap_or_else(|| format!("document_{}", id));
        format!("attachment; filename=\"{}\"", file_name)
    });

    tracing::info!(document_id = %id, bytes = download.bytes.len(), "Document downloaded");

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

pub async fn alert(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let page = state.documents_for(&user);
    let ttl = page.list().message_ttl().as_secs();

    Ok(AlertTemplate {
        alert: AlertView::from_outcome(page.list().outcome(), ttl),
        alert_url: ALERT_URL,
        alert_id: "documents-alert",
    })
}

pub async fn dismiss_alert(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let page = state.documents_for(&user);
    page.list().dismiss_outcome();

    Ok(AlertTemplate {
        alert: AlertView::default(),
        alert_url: ALERT_URL,
        alert_id: "documents-alert",
    })
}

fn log_result<E: std::fmt::Display>(action: &str, id: Option<&str>, result: &Result<(), E>) {
    if let Err(err) = result {
        tracing::warn!(action, document_id = id.unwrap_or("-"), error = %err, "Document change not applied");
    }
}

/// Fields shared by the upload and edit forms.
#[derive(Debug, Default)]
struct DocumentForm {
    title: String,
    description: String,
    is_active: bool,
    file: Option<FileUpload>,
}

impl DocumentForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = DocumentForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read uploaded file: {}", e))
                    })?;

                    // Browsers send a part with no file name when no file was picked
                    if !file_name.is_empty() {
                        form.file = Some(FileUpload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                "title" | "description" | "is_active" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?;
                    match name.as_str() {
                        "title" => form.title = value,
                        "description" => form.description = value,
                        _ => form.is_active = matches!(value.as_str(), "on" | "true"),
                    }
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}
