//! Dispatch error taxonomy and its mapping onto HTTP outcomes.
//!
//! Four categories are recovered at the entrypoint boundary, each bound to a
//! fixed fallback unit. Configuration failures are deliberately outside the
//! taxonomy: a process with no configuration cannot render its own error
//! page, so they propagate past the catch boundary instead.

use serde_json::{json, Value};

/// Errors raised while dispatching an action or resolving a dependency.
///
/// `BadRequest`, `Security`, and `Unavailable` are raised by application
/// units, never by the dispatch core itself.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Action syntactically invalid, action unit missing, or a route-mapped
    /// absent resource.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed input detected by application code.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Policy-violating input detected by application code.
    #[error("security violation: {0}")]
    Security(String),
    /// Transient upstream or resource exhaustion signalled by application code.
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// A named dependency could not be resolved or loaded. Carries the
    /// symbolic name. Not a category of its own: it classifies as
    /// `Internal`, so a missing dependency surfaces through the generic
    /// handler rather than as an absent route.
    #[error("dependency not found: {0}")]
    DependencyMissing(String),
    /// Catch-all for any other failure.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DispatchError {
    /// The category this error is recovered under.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::BadRequest(_) | Self::Security(_) => ErrorCategory::BadRequest,
            Self::Unavailable(_) => ErrorCategory::Unavailable,
            Self::DependencyMissing(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// The error detail placed in the fallback dispatch params.
    ///
    /// The internal category exposes only the human-readable message; the
    /// other categories carry a structured object.
    #[must_use]
    pub fn detail(&self) -> Value {
        let category = self.category();
        match category {
            ErrorCategory::Internal => Value::String(self.to_string()),
            _ => json!({
                "kind": category.as_str(),
                "message": self.to_string(),
            }),
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.into())
    }
}

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// The four recoverable categories, in catch-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    BadRequest,
    Unavailable,
    Internal,
}

impl ErrorCategory {
    /// The unit id the entrypoint re-dispatches to for this category.
    #[must_use]
    pub fn fallback_unit_id(self) -> &'static str {
        match self {
            Self::NotFound => "error.http404",
            Self::BadRequest => "error.http400",
            Self::Unavailable => "error.http503",
            Self::Internal => "error.http500",
        }
    }

    /// The HTTP status a host should emit when even the fallback fails.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::BadRequest => 400,
            Self::Unavailable => 503,
            Self::Internal => 500,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Unavailable => "service_unavailable",
            Self::Internal => "internal",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
