use serde::{Deserialize, Serialize};

/// File types offered by the type filter on the documents page.
pub const DOCUMENT_FILE_TYPES: &[&str] = &["pdf", "doc", "docx", "txt", "jpg", "png", "zip"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub uploaded_by: Option<Uploader>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub original_file_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Uploader {
    #[serde(default)]
    pub username: Option<String>,
}

impl Document {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Size in megabytes with two decimals, e.g. `1.50 MB`.
    pub fn size_label(&self) -> String {
        match self.size {
            Some(bytes) => format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0),
            None => "-".to_string(),
        }
    }

    pub fn uploader_name(&self) -> &str {
        self.uploaded_by
            .as_ref()
            .and_then(|u| u.username.as_deref())
            .unwrap_or("Admin")
    }

    pub fn file_type_label(&self) -> String {
        self.file_type
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn file_name_text(&self) -> &str {
        self.original_file_name.as_deref().unwrap_or("")
    }

    /// Download name used when the backend sends no `Content-Disposition`.
    pub fn fallback_file_name(&self) -> String {
        match &self.file_type {
            Some(ext) if !ext.is_empty() => format!("document_{}.{}", self.id, ext.to_lowercase()),
            _ => format!("document_{}", self.id),
        }
    }
}

/// File received from the browser, forwarded as a multipart part.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Upload form: title and file are required.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub description: String,
    pub file: Option<FileUpload>,
}

/// Edit form: metadata plus an optional replacement file.
#[derive(Debug, Clone)]
pub struct DocumentEdit {
    pub metadata: DocumentMetadata,
    pub replacement: Option<FileUpload>,
}

/// JSON body of `PUT /documents/:id`.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

/// JSON body of `POST /documents/set-active`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub document_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_backend_payload_with_missing_optionals() {
        let doc: Document = serde_json::from_value(json!({
            "id": "d1",
            "title": "Handbook",
            "isActive": true
        }))
        .unwrap();

        assert_eq!(doc.title, "Handbook");
        assert!(doc.is_active);
        assert_eq!(doc.size_label(), "-");
        assert_eq!(doc.uploader_name(), "Admin");
        assert_eq!(doc.description_text(), "");
    }

    #[test]
    fn size_is_shown_in_megabytes() {
        let doc: Document = serde_json::from_value(json!({
            "id": "d2",
            "title": "Scan",
            "size": 1572864,
            "uploadedBy": {"username": "alice"},
            "fileType": "PDF"
        }))
        .unwrap();

        assert_eq!(doc.size_label(), "1.50 MB");
        assert_eq!(doc.uploader_name(), "alice");
        assert_eq!(doc.fallback_file_name(), "document_d2.pdf");
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let body = serde_json::to_value(DocumentMetadata {
            title: "T".to_string(),
            description: String::new(),
            is_active: true,
        })
        .unwrap();
        assert_eq!(body, json!({"title": "T", "description": "", "isActive": true}));
    }
}
