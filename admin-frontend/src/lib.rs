pub mod config;
pub mod controller;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pages;
pub mod services;
pub mod startup;
pub mod views;

use config::Settings;
use controller::{ControllerOptions, ControllerRegistry};
use models::AuthUser;
use pages::{DocumentsPage, UsersPage};
use services::{ApiError, BackendClient};
use std::sync::Arc;

/// Shared application state: the backend client and the per-session page
/// controllers built on top of it.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub backend: Arc<BackendClient>,
    pub documents: Arc<ControllerRegistry<DocumentsPage>>,
    pub users: Arc<ControllerRegistry<UsersPage>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, ApiError> {
        let backend = Arc::new(BackendClient::new(settings.backend.clone())?);
        let idle = settings.server.session_idle();

        let documents = {
            let backend = backend.clone();
            let options = ControllerOptions::documents(&settings.lists);
            ControllerRegistry::new(idle, move || DocumentsPage::new(backend.clone(), options))
        };
        let users = {
            let backend = backend.clone();
            let options = ControllerOptions::users(&settings.lists);
            ControllerRegistry::new(idle, move || UsersPage::new(backend.clone(), options))
        };

        Ok(Self {
            settings: Arc::new(settings),
            backend,
            documents: Arc::new(documents),
            users: Arc::new(users),
        })
    }

    pub fn documents_for(&self, user: &AuthUser) -> Arc<DocumentsPage> {
        self.documents.get_or_create(&user.workspace_id)
    }

    pub fn users_for(&self, user: &AuthUser) -> Arc<UsersPage> {
        self.users.get_or_create(&user.workspace_id)
    }

    /// Drops every controller owned by a signed-out session.
    pub fn forget_workspace(&self, workspace_id: &str) {
        self.documents.remove(workspace_id);
        self.users.remove(workspace_id);
    }
}
