use crate::services::ApiError;
use thiserror::Error;

/// Answer to a "really delete?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    /// `hx-confirm` requests carry `confirm=true`; anything else is a decline.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("true") => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        }
    }

    pub fn is_confirmed(self) -> bool {
        self == Confirmation::Confirmed
    }
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Another change is still in progress")]
    InProgress,

    /// Rejected locally before any request went out.
    #[error("{0}")]
    Invalid(String),

    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },

    /// An earlier step reached the backend, a later one failed.
    #[error("{message}")]
    Partial {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl MutationError {
    pub fn rejected(source: ApiError, fallback: &str) -> Self {
        MutationError::Rejected {
            message: source.user_message(fallback),
            source,
        }
    }

    pub fn partial(source: ApiError, message: impl Into<String>) -> Self {
        MutationError::Partial {
            message: message.into(),
            source,
        }
    }

    /// Whether backend state may have changed, so the list must be refetched.
    pub fn touched_backend(&self) -> bool {
        matches!(self, MutationError::Partial { .. })
    }
}
