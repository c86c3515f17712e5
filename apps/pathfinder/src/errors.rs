use thiserror::Error;

use crate::controller::ActionKind;
use crate::gateway::GatewayError;

/// Problems caught on the client before any request goes out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a target job role.")]
    MissingRole,

    #[error("Please select a valid job role ('{0}' is not supported).")]
    UnknownRole(String),

    #[error("Please add some skills first!")]
    NoSkills,

    #[error("Please upload a resume first!")]
    NoSession,

    #[error("No file selected")]
    EmptyFile,

    #[error("Unsupported file type '{0}'. Please upload a PDF or DOCX.")]
    UnsupportedFile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Transport,
    Application,
}

/// Error returned by every controller action.
/// None of these are fatal: the user may always repeat the action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A manual session was needed but could not be created; the action did not proceed.
    #[error("Failed to create session for manual skills: {0}")]
    NoSession(#[source] GatewayError),

    #[error("{0} is already in progress")]
    Busy(ActionKind),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ActionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ActionError::Validation(_) | ActionError::NoSession(_) | ActionError::Busy(_) => {
                ErrorCategory::Validation
            }
            ActionError::Gateway(e) if e.is_transport() => ErrorCategory::Transport,
            ActionError::Gateway(_) => ErrorCategory::Application,
        }
    }

    /// Transport failures are worth repeating as-is; the rest need the user to change something.
    pub fn is_retryable(&self) -> bool {
        match self {
            ActionError::NoSession(e) | ActionError::Gateway(e) => e.is_transport(),
            ActionError::Busy(_) => true,
            ActionError::Validation(_) => false,
        }
    }
}
