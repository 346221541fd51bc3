//! Startup registration table mapping unit ids to action handlers.

use std::collections::HashMap;

use runway_core::DispatchError;

use super::context::ActionContext;

/// An action unit: opaque application code invoked with the dispatch
/// context. May raise any error category and may finish the response early.
pub type ActionHandler =
    Box<dyn Fn(&mut ActionContext<'_>) -> Result<(), DispatchError> + Send + Sync>;

/// Mapping from unit id (`index`, `user.show`, `error.http404`) to handler.
/// Populated once at startup, immutable afterwards.
#[derive(Default)]
pub struct ActionTable {
    entries: HashMap<String, ActionHandler>,
}

impl ActionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a unit id. Ids are stored lowercased, the
    /// same normalization the dispatcher applies when deriving them.
    pub fn register<F>(&mut self, unit_id: &str, handler: F)
    where
        F: Fn(&mut ActionContext<'_>) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        self.entries.insert(unit_id.to_lowercase(), Box::new(handler));
    }

    pub(crate) fn get(&self, unit_id: &str) -> Option<&ActionHandler> {
        self.entries.get(unit_id)
    }

    #[must_use]
    pub fn contains(&self, unit_id: &str) -> bool {
        self.entries.contains_key(unit_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
