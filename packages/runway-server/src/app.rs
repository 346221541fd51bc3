//! Application entrypoint: builds the dispatch graph and runs one request.
//!
//! `AppBuilder` collects the startup registrations (actions, model and
//! service factories), `build` loads configuration and wires the namespace
//! table, and `App::handle` runs one complete dispatch cycle: forward the
//! requested action, and on failure perform exactly one fallback dispatch
//! to the error category's fixed unit.

use std::path::Path;
use std::sync::Arc;

use runway_core::{DispatchError, Params};
use tracing::{error, warn};

use crate::config::{ConfigError, ConfigStore};
use crate::dispatch::{ActionContext, ActionTable, Dispatcher};
use crate::http::{Request, Response};
use crate::registry::{
    Model, ModelCtx, ModelFactoryTable, Service, ServiceCtx, ServiceFactoryTable,
    MODELS_NAMESPACE, SERVICES_NAMESPACE,
};
use crate::resolver::{NameResolver, NamespaceTable};

/// Request field the action string is read from.
const ACTION_FIELD: &str = "action";

// ---------------------------------------------------------------------------
// AppBuilder
// ---------------------------------------------------------------------------

/// Collects startup registrations and builds an [`App`].
#[derive(Default)]
pub struct AppBuilder {
    actions: ActionTable,
    models: ModelFactoryTable,
    services: ServiceFactoryTable,
}

impl AppBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action handler under a unit id.
    #[must_use]
    pub fn action<F>(mut self, unit_id: &str, handler: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        self.actions.register(unit_id, handler);
        self
    }

    /// Registers a model factory under a case-insensitive name.
    #[must_use]
    pub fn model<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&ModelCtx) -> Arc<dyn Model> + Send + Sync + 'static,
    {
        self.models.register(name, factory);
        self
    }

    /// Registers a service factory under a case-insensitive name.
    #[must_use]
    pub fn service<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&ServiceCtx) -> Arc<dyn Service> + Send + Sync + 'static,
    {
        self.services.register(name, factory);
        self
    }

    /// Loads configuration for `env` and wires the dispatch graph rooted at
    /// `base_dir` (`actions/`, `models/`, `services/`, `configs/`).
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the environment has no loadable configuration.
    /// This is the one unrecoverable failure: it is never converted into a
    /// fallback dispatch.
    pub fn build(self, env: &str, base_dir: &Path) -> Result<App, ConfigError> {
        let config = Arc::new(ConfigStore::load(env, base_dir)?);

        let mut namespaces = NamespaceTable::new();
        namespaces.register(MODELS_NAMESPACE, base_dir.join("models"));
        namespaces.register(SERVICES_NAMESPACE, base_dir.join("services"));
        let resolver = Arc::new(NameResolver::new(namespaces));

        let dispatcher = Dispatcher::new(
            base_dir.join("actions"),
            Arc::new(self.actions),
            Arc::new(self.models),
            Arc::new(self.services),
            resolver,
            Arc::clone(&config),
        );
        Ok(App { dispatcher, config })
    }

    /// One-shot convenience: build for `env` under `base_dir` and handle a
    /// single request.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] from [`build`](Self::build).
    pub fn run(
        self,
        env: &str,
        base_dir: &Path,
        request: &Request,
        response: &mut Response,
    ) -> Result<(), ConfigError> {
        let app = self.build(env, base_dir)?;
        app.handle(request, response);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// A built application: shared, immutable dispatch state. One `handle` call
/// is one complete request cycle; concurrent calls each get their own
/// registries.
pub struct App {
    dispatcher: Dispatcher,
    config: Arc<ConfigStore>,
}

impl App {
    /// Handles one request: dispatch the action named in the request's
    /// `action` field (default action when absent), converting any failure
    /// into exactly one fallback dispatch.
    pub fn handle(&self, request: &Request, response: &mut Response) {
        let action = request.get_or(ACTION_FIELD, "");
        if let Err(err) = self
            .dispatcher
            .forward(&action, Params::new(), request, response)
        {
            self.fallback(&err, request, response);
        }
    }

    /// Re-dispatches to the error category's fixed unit, with the error
    /// detail in the params. Errors raised while rendering the fallback are
    /// logged and answered with a bare status; there is no second fallback.
    fn fallback(&self, err: &DispatchError, request: &Request, response: &mut Response) {
        let category = err.category();
        let unit_id = category.fallback_unit_id();
        warn!(%err, unit = unit_id, "dispatch failed, forwarding to fallback unit");

        let mut params = Params::new();
        params.insert("error".to_string(), err.detail());

        if let Err(fallback_err) = self.dispatcher.forward(unit_id, params, request, response) {
            error!(%fallback_err, unit = unit_id, "fallback dispatch failed");
            if !response.is_finished() {
                response.status(category.http_status());
                response.finish();
            }
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
