//! Runway Core — action-name grammar, dispatch targets, and the error taxonomy.

pub mod action;
pub mod error;

pub use action::{validate, DispatchTarget, InvalidActionName, ACTION_SEPARATOR, DEFAULT_SEGMENT};
pub use error::{DispatchError, ErrorCategory};

/// Request parameters handed to action units: field name to JSON value.
pub type Params = std::collections::HashMap<String, serde_json::Value>;
