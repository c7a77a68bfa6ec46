//! Small render-ready structs shared by the page templates.
//!
//! Templates only see plain fields and bools; every decision is made here.

use crate::controller::{MutationOutcome, SortConfig, SortDirection};
use askama::Template;
use axum::http::HeaderMap;
use service_core::error::AppError;

/// Success or error banner above a table.
#[derive(Debug, Clone, Default)]
pub struct AlertView {
    pub visible: bool,
    pub succeeded: bool,
    pub message: String,
    /// Seconds until the banner asks the server whether it has expired.
    pub ttl_secs: u64,
}

impl AlertView {
    pub fn from_outcome(outcome: Option<MutationOutcome>, ttl_secs: u64) -> Self {
        match outcome {
            Some(outcome) => Self {
                visible: true,
                succeeded: outcome.succeeded,
                message: outcome.message,
                ttl_secs,
            },
            None => Self {
                ttl_secs,
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub fn select_options(options: &[(&str, &str)], current: Option<&str>) -> Vec<SelectOption> {
    let current = current.unwrap_or("");
    options
        .iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            selected: *value == current,
        })
        .collect()
}

/// Active-status filter shared by both tables.
pub fn status_options(current: Option<&str>) -> Vec<SelectOption> {
    select_options(
        &[("", "All statuses"), ("true", "Active"), ("false", "Inactive")],
        current,
    )
}

/// Clickable column header of a sortable table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortHeader {
    pub key: String,
    pub label: String,
    pub active: bool,
    pub indicator: &'static str,
    /// Value for `aria-sort`.
    pub aria: &'static str,
}

pub fn sort_headers(columns: &[(&str, &str)], current: Option<&SortConfig>) -> Vec<SortHeader> {
    columns
        .iter()
        .map(|(key, label)| {
            let direction = current
                .filter(|sort| sort.key == *key)
                .map(|sort| sort.direction);

            let (indicator, aria) = match direction {
                Some(SortDirection::Asc) => ("▲", "ascending"),
                Some(SortDirection::Desc) => ("▼", "descending"),
                None => ("↕", "none"),
            };

            SortHeader {
                key: key.to_string(),
                label: label.to_string(),
                active: direction.is_some(),
                indicator,
                aria,
            }
        })
        .collect()
}

pub fn render<T: Template>(template: &T) -> Result<String, AppError> {
    template
        .render()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to render template: {}", e)))
}

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_current_value_selects_the_all_option() {
        let options = status_options(None);
        assert!(options[0].selected);
        assert!(!options[1].selected);

        let options = status_options(Some("false"));
        assert!(options[2].selected);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn only_the_active_column_shows_a_direction() {
        let sort = SortConfig::new("email", SortDirection::Desc);
        let headers = sort_headers(&[("firstName", "Name"), ("email", "Email")], Some(&sort));

        assert!(!headers[0].active);
        assert_eq!(headers[0].indicator, "↕");
        assert!(headers[1].active);
        assert_eq!(headers[1].indicator, "▼");
        assert_eq!(headers[1].aria, "descending");
    }

    #[test]
    fn missing_outcome_renders_hidden_alert() {
        let alert = AlertView::from_outcome(None, 3);
        assert!(!alert.visible);
        assert_eq!(alert.ttl_secs, 3);

        let alert = AlertView::from_outcome(Some(MutationOutcome::error("nope")), 5);
        assert!(alert.visible && !alert.succeeded);
        assert_eq!(alert.message, "nope");
    }
}
