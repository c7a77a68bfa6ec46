use crate::controller::{Confirmation, ListIntent, PaginationView};
use crate::models::{AuthUser, NewUser, User, UserUpdate};
use crate::pages::UsersPage;
use crate::views::{render, sort_headers, status_options, AlertView, SelectOption, SortHeader};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;

const ALERT_URL: &str = "/users/alert";

const COLUMNS: &[(&str, &str)] = &[
    ("firstName", "User"),
    ("email", "Email"),
    ("createdAt", "Joined"),
];

#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub display_name: String,
    pub current_page: &'static str,
    pub region: String,
}

#[derive(Template)]
#[template(path = "users_region.html")]
pub struct UsersRegionTemplate {
    pub users: Vec<User>,
    pub loaded: bool,
    pub search: String,
    pub headers: Vec<SortHeader>,
    pub status_options: Vec<SelectOption>,
    pub pagination: PaginationView,
    pub show_pagination: bool,
    pub table_url: &'static str,
    pub alert: AlertView,
    pub alert_url: &'static str,
    pub alert_id: &'static str,
}

#[derive(Template)]
#[template(path = "user_edit.html")]
pub struct UserEditTemplate {
    pub user: User,
}

#[derive(Template)]
#[template(path = "alert.html")]
pub struct UserAlertTemplate {
    pub alert: AlertView,
    pub alert_url: &'static str,
    pub alert_id: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    pub page: Option<u32>,
    pub sort: Option<String>,
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

/// Unchecked checkboxes are simply absent from the submitted form.
#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub is_active: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub is_active: Option<String>,
    pub is_admin: Option<String>,
}

fn checked(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("on") | Some("true"))
}

fn region(page: &UsersPage) -> Result<String, AppError> {
    let snapshot = page.list().snapshot();
    let query = &snapshot.query;

    render(&UsersRegionTemplate {
        users: snapshot.items,
        loaded: snapshot.loaded,
        search: query.search().unwrap_or_default().to_string(),
        headers: sort_headers(COLUMNS, query.sort()),
        status_options: status_options(query.filter("isActive")),
        show_pagination: snapshot.pagination.is_multi_page(),
        pagination: snapshot.pagination,
        table_url: "/users/table",
        alert: AlertView::from_outcome(snapshot.outcome, snapshot.message_ttl_secs),
        alert_url: ALERT_URL,
        alert_id: "users-alert",
    })
}

pub async fn users_page(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let page = state.users_for(&user);
    let _ = page.list().fetch(&user.access_token).await;

    Ok(UsersTemplate {
        display_name: user.display_name.clone(),
        current_page: "users",
        region: region(&page)?,
    })
}

pub async fn users_table(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<TableParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.users_for(&user);
    let list = page.list();

    if params.reset {
        list.apply(ListIntent::Reset);
    }
    if let Some(value) = params.is_active {
        list.apply(ListIntent::Filter {
            name: "isActive".to_string(),
            value,
        });
    }
    if let Some(key) = params.sort {
        list.apply(ListIntent::Sort(key));
    }
    if let Some(number) = params.page {
        list.apply(ListIntent::Page(number));
    }

    let _ = list.fetch(&user.access_token).await;
    Ok(Html(region(&page)?))
}

pub async fn search_users(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<SearchForm>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.users_for(&user);
    page.list().apply(ListIntent::Search(form.search));
    let _ = page.list().fetch(&user.access_token).await;
    Ok(Html(region(&page)?))
}

pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<CreateUserForm>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.users_for(&user);

    let new_user = NewUser {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password,
        is_active: checked(&form.is_active),
    };
    if let Err(err) = page.create(&user.access_token, new_user).await {
        tracing::warn!(error = %err, "User not created");
    }

    Ok(Html(region(&page)?))
}

pub async fn edit_form(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.users_for(&user);
    let target = page
        .list()
        .find(&id)
        .ok_or_else(|| AppError::NotFound("User is no longer on this page".to_string()))?;

    Ok(UserEditTemplate { user: target })
}

pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Form(form): Form<UpdateUserForm>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.users_for(&user);

    let update = UserUpdate {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        is_active: checked(&form.is_active),
        is_admin: checked(&form.is_admin),
    };
    if let Err(err) = page.update(&user.access_token, &id, update).await {
        tracing::warn!(user_id = %id, error = %err, "User not updated");
    }

    Ok(Html(region(&page)?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Result<Response, AppError> {
    let page = state.users_for(&user);
    let confirmation = Confirmation::from_flag(form.confirm.as_deref());

    match page.delete(&user.access_token, &id, confirmation).await {
        Ok(false) => return Ok(StatusCode::NO_CONTENT.into_response()),
        Ok(true) => tracing::info!(user_id = %id, "User deleted"),
        Err(err) => tracing::warn!(user_id = %id, error = %err, "User not deleted"),
    }

    Ok(Html(region(&page)?).into_response())
}

pub async fn alert(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let page = state.users_for(&user);
    let ttl = page.list().message_ttl().as_secs();

    Ok(UserAlertTemplate {
        alert: AlertView::from_outcome(page.list().outcome(), ttl),
        alert_url: ALERT_URL,
        alert_id: "users-alert",
    })
}

pub async fn dismiss_alert(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.users_for(&user).list().dismiss_outcome();

    Ok(UserAlertTemplate {
        alert: AlertView::default(),
        alert_url: ALERT_URL,
        alert_id: "users-alert",
    })
}
