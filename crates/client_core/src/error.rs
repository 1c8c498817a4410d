use reqwest::StatusCode;
use shared::domain::ActionKind;
use thiserror::Error;

pub const EMPTY_COMMENT_MESSAGE: &str = "Please enter a comment";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Server returned an invalid response. Please try again.";

// Display is the text shown to the user.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{message}")]
    Validation { action: ActionKind, message: String },
    #[error("{}", transport_message(.status))]
    Transport {
        action: ActionKind,
        status: Option<StatusCode>,
        #[source]
        source: Option<reqwest::Error>,
    },
    #[error("{}", MALFORMED_RESPONSE_MESSAGE)]
    MalformedResponse { action: ActionKind, reason: String },
    #[error("{}{message}", .action.failure_prefix())]
    Application {
        action: ActionKind,
        message: String,
        field_errors: Vec<String>,
    },
    #[error("page element #{element} is missing")]
    MissingElement { action: ActionKind, element: String },
    #[error("{action} was cancelled before it completed")]
    Cancelled { action: ActionKind },
}

fn transport_message(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => format!(
            "An error occurred (HTTP {}). Please try again.",
            status.as_u16()
        ),
        None => "An error occurred. Please try again.".to_string(),
    }
}

impl ActionError {
    pub fn action(&self) -> ActionKind {
        match self {
            ActionError::Validation { action, .. }
            | ActionError::Transport { action, .. }
            | ActionError::MalformedResponse { action, .. }
            | ActionError::Application { action, .. }
            | ActionError::MissingElement { action, .. }
            | ActionError::Cancelled { action } => *action,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ActionError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            ActionError::MissingElement { .. } | ActionError::Cancelled { .. }
        )
    }

    pub(crate) fn validation(action: ActionKind, message: impl Into<String>) -> Self {
        ActionError::Validation {
            action,
            message: message.into(),
        }
    }

    pub(crate) fn malformed(action: ActionKind, reason: impl Into<String>) -> Self {
        ActionError::MalformedResponse {
            action,
            reason: reason.into(),
        }
    }
}
