use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub lists: ListSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
    /// Idle time after which a signed-in session is dropped.
    #[serde(default = "default_session_idle_hours")]
    pub session_idle_hours: i64,
    /// Largest multipart body accepted for document uploads.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_session_idle_hours() -> i64 {
    24
}

fn default_max_upload_mb() -> usize {
    50
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(u64::try_from(self.session_idle_hours).unwrap_or(0) * 3600)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    /// Base URL of the document/user management REST API (e.g. http://localhost:3000).
    pub url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl BackendSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Shape of the paginated list pages.
#[derive(Deserialize, Clone, Debug)]
pub struct ListSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Number of page buttons shown around the current page.
    #[serde(default = "default_pagination_window")]
    pub pagination_window: u32,
    /// How long a success/error banner stays on the documents page.
    #[serde(default = "default_document_message_secs")]
    pub document_message_secs: u64,
    /// How long a success/error banner stays on the users page.
    #[serde(default = "default_user_message_secs")]
    pub user_message_secs: u64,
}

fn default_page_size() -> u32 {
    10
}

fn default_pagination_window() -> u32 {
    5
}

fn default_document_message_secs() -> u64 {
    3
}

fn default_user_message_secs() -> u64 {
    5
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            pagination_window: default_pagination_window(),
            document_message_secs: default_document_message_secs(),
            user_message_secs: default_user_message_secs(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ObservabilitySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC collector (e.g. http://tempo:4317). Spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_service_name() -> String {
    "admin-frontend".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

/// The admin-frontend directory, whether started from the workspace root or
/// from inside admin-frontend/.
fn crate_directory() -> std::io::Result<PathBuf> {
    let base_path = std::env::current_dir()?;
    if base_path.ends_with("admin-frontend") {
        Ok(base_path)
    } else {
        Ok(base_path.join("admin-frontend"))
    }
}

/// Directory served under `/static`.
pub fn static_directory() -> PathBuf {
    crate_directory()
        .map(|dir| dir.join("static"))
        .unwrap_or_else(|_| PathBuf::from("admin-frontend/static"))
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let configuration_directory = crate_directory()
        .map_err(|e| {
            config::ConfigError::Message(format!(
                "Failed to determine the current directory: {}",
                e
            ))
        })?
        .join("config");

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
