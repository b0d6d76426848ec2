use thiserror::Error;

use crate::status::{ErrorCategory, GpaStatus};

pub const DEFAULT_ERROR_CONTEXT: &str = "An error occurred";

/// Error raised for a negative [`GpaStatus`].
///
/// Constructed only by [`GpaStatus`] (`check`, `check_with`, `fail_with`),
/// so every error carries the status it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} ({})", context_or_default(.context), .status)]
pub struct GpaError {
    status: GpaStatus,
    context: Option<String>,
}

fn context_or_default(context: &Option<String>) -> &str {
    context.as_deref().unwrap_or(DEFAULT_ERROR_CONTEXT)
}

pub type Result<T, E = GpaError> = std::result::Result<T, E>;

impl GpaError {
    pub(crate) fn from_status(status: GpaStatus, context: Option<String>) -> Self {
        debug_assert!(status.is_error());
        Self { status, context }
    }

    pub fn status(&self) -> GpaStatus {
        self.status
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn category(&self) -> ErrorCategory {
        self.status.category().unwrap_or(ErrorCategory::Unexpected)
    }
}
