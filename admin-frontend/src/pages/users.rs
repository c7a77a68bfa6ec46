use crate::controller::{
    Confirmation, ControllerOptions, ListController, ListEndpoint, MutationError, SortConfig,
    SortDirection,
};
use crate::models::{NewUser, User, UserUpdate, USER_SORT_KEYS};
use crate::services::{AccessToken, BackendClient};
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

pub const CREATE_SUCCESS: &str = "User created successfully!";
pub const UPDATE_SUCCESS: &str = "User updated successfully!";
pub const DELETE_SUCCESS: &str = "User deleted successfully!";

pub struct UsersEndpoint;

impl ListEndpoint for UsersEndpoint {
    type Item = User;

    const PATH: &'static str = "/users";
    const NAME: &'static str = "users";
    const FETCH_ERROR: &'static str = "Failed to fetch users";
    const FILTERS: &'static [&'static str] = &["isActive"];
    const SORT_KEYS: &'static [&'static str] = USER_SORT_KEYS;

    /// Newest accounts first.
    fn default_sort() -> Option<SortConfig> {
        Some(SortConfig::new("createdAt", SortDirection::Desc))
    }

    fn item_id(item: &User) -> &str {
        &item.id
    }
}

pub struct UsersPage {
    list: ListController<UsersEndpoint>,
}

impl UsersPage {
    pub fn new(backend: Arc<BackendClient>, options: ControllerOptions) -> Self {
        Self {
            list: ListController::new(backend, options),
        }
    }

    pub fn list(&self) -> &ListController<UsersEndpoint> {
        &self.list
    }

    pub async fn create(&self, token: &AccessToken, user: NewUser) -> Result<(), MutationError> {
        self.list
            .mutate(token, CREATE_SUCCESS, || async {
                user.validate().map_err(|errors| {
                    invalid(&errors, "All fields except status are required.")
                })?;

                self.list
                    .backend()
                    .create_user(token, &user)
                    .await
                    .map_err(|e| MutationError::rejected(e, "Failed to create user"))
            })
            .await
    }

    pub async fn update(
        &self,
        token: &AccessToken,
        id: &str,
        update: UserUpdate,
    ) -> Result<(), MutationError> {
        self.list
            .mutate(token, UPDATE_SUCCESS, || async {
                update.validate().map_err(|errors| {
                    invalid(&errors, "First Name, Last Name, and Email are required.")
                })?;

                self.list
                    .backend()
                    .update_user(token, id, &update)
                    .await
                    .map_err(|e| MutationError::rejected(e, "Failed to update user"))
            })
            .await
    }

    /// Returns `Ok(false)` when the operator declined; nothing is sent then.
    pub async fn delete(
        &self,
        token: &AccessToken,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<bool, MutationError> {
        if !confirmation.is_confirmed() {
            tracing::debug!(user_id = %id, "User delete declined");
            return Ok(false);
        }

        self.list
            .mutate(token, DELETE_SUCCESS, || async {
                self.list
                    .backend()
                    .delete_user(token, id)
                    .await
                    .map_err(|e| MutationError::rejected(e, "Failed to delete user"))
            })
            .await
            .map(|()| true)
    }
}

/// Empty required fields get the form's summary message; anything else
/// (e.g. a malformed email) the first field message.
fn invalid(errors: &ValidationErrors, summary: &str) -> MutationError {
    let field_errors = errors.field_errors();
    let missing = field_errors
        .values()
        .flat_map(|errors| errors.iter())
        .any(|error| error.code == "length");

    if missing {
        return MutationError::Invalid(summary.to_string());
    }

    let message = field_errors
        .values()
        .flat_map(|errors| errors.iter())
        .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| summary.to_string());

    MutationError::Invalid(message)
}
