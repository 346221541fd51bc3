//! Single-pass action routing: validate, parse, gate, execute.

use std::path::PathBuf;
use std::sync::Arc;

use runway_core::{validate, DispatchError, DispatchTarget, Params};
use tracing::debug;

use super::context::ActionContext;
use super::table::ActionTable;
use crate::config::ConfigStore;
use crate::http::{Request, Response};
use crate::registry::{ModelFactoryTable, ModelRegistry, ServiceFactoryTable, ServiceRegistry};
use crate::resolver::{NameResolver, UNIT_EXTENSION};

/// Routes action strings to registered action units.
///
/// Holds only startup-built shared state; every `forward` call constructs a
/// fresh dispatch context, so the dispatcher itself is safe to share across
/// concurrent request cycles.
pub struct Dispatcher {
    actions_dir: PathBuf,
    actions: Arc<ActionTable>,
    model_factories: Arc<ModelFactoryTable>,
    service_factories: Arc<ServiceFactoryTable>,
    resolver: Arc<NameResolver>,
    config: Arc<ConfigStore>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        actions_dir: PathBuf,
        actions: Arc<ActionTable>,
        model_factories: Arc<ModelFactoryTable>,
        service_factories: Arc<ServiceFactoryTable>,
        resolver: Arc<NameResolver>,
        config: Arc<ConfigStore>,
    ) -> Self {
        Self {
            actions_dir,
            actions,
            model_factories,
            service_factories,
            resolver,
            config,
        }
    }

    /// Dispatches one action string: validate, parse, gate, execute.
    ///
    /// The empty string dispatches the default action. The dispatcher does
    /// not interpret the unit's outcome beyond propagating its error.
    ///
    /// # Errors
    ///
    /// `NotFound` for an invalid or unregistered action; otherwise whatever
    /// the executed unit raises.
    pub fn forward(
        &self,
        action: &str,
        params: Params,
        request: &Request,
        response: &mut Response,
    ) -> Result<(), DispatchError> {
        Self::check_action_name(action)?;
        let unit_id = DispatchTarget::parse(action).unit_id();
        self.run_unit(&unit_id, params, request, response)
    }

    /// Grammar check. Invalid syntax reads as an absent route on purpose:
    /// a security-violation rejection would leak the grammar to probes.
    fn check_action_name(action: &str) -> Result<(), DispatchError> {
        validate(action).map_err(|err| DispatchError::NotFound(err.0))
    }

    fn run_unit(
        &self,
        unit_id: &str,
        params: Params,
        request: &Request,
        response: &mut Response,
    ) -> Result<(), DispatchError> {
        let unit_path = self.actions_dir.join(format!("{unit_id}{UNIT_EXTENSION}"));
        if !self.resolver.load(&unit_path) {
            return Err(DispatchError::NotFound(format!("no action: {unit_id}")));
        }
        let handler = self
            .actions
            .get(unit_id)
            .ok_or_else(|| DispatchError::NotFound(format!("no action: {unit_id}")))?;

        let models = ModelRegistry::new(Arc::clone(&self.model_factories), Arc::clone(&self.resolver));
        let services = ServiceRegistry::new(
            Arc::clone(&self.service_factories),
            Arc::clone(&self.resolver),
            models.handle(),
        );
        let mut ctx = ActionContext {
            params,
            models,
            services,
            config: Arc::clone(&self.config),
            request,
            response,
        };

        debug!(unit = %unit_id, "dispatching action unit");
        handler(&mut ctx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use runway_core::ErrorCategory;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::resolver::NamespaceTable;

    fn touch_action(base: &Path, unit_id: &str) {
        let dir = base.join("actions");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{unit_id}.unit")), "").unwrap();
    }

    fn write_config(base: &Path) {
        let dir = base.join("configs");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("test.json"), "{}").unwrap();
    }

    fn dispatcher(base: &Path, actions: ActionTable) -> Dispatcher {
        write_config(base);
        let config = Arc::new(ConfigStore::load("test", base).unwrap());
        let resolver = Arc::new(NameResolver::new(NamespaceTable::new()));
        Dispatcher::new(
            base.join("actions"),
            Arc::new(actions),
            Arc::new(ModelFactoryTable::new()),
            Arc::new(ServiceFactoryTable::new()),
            resolver,
            config,
        )
    }

    /// Table with one counting handler, so tests can assert whether and how
    /// often a unit actually ran.
    fn counting_table(unit_id: &'static str, hits: Arc<AtomicUsize>) -> ActionTable {
        let mut table = ActionTable::new();
        table.register(unit_id, move |_ctx| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        table
    }

    #[test]
    fn empty_action_dispatches_the_default_unit() {
        let base = TempDir::new().unwrap();
        touch_action(base.path(), "index");
        let hits = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(base.path(), counting_table("index", Arc::clone(&hits)));

        let request = Request::default();
        let mut response = Response::new();
        for action in ["", "index", "index.index"] {
            dispatcher
                .forward(action, Params::new(), &request, &mut response)
                .unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn two_segment_action_reaches_its_unit() {
        let base = TempDir::new().unwrap();
        touch_action(base.path(), "user.show");
        let hits = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(base.path(), counting_table("user.show", Arc::clone(&hits)));

        let request = Request::default();
        let mut response = Response::new();
        dispatcher
            .forward("user.show", Params::new(), &request, &mut response)
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalid_syntax_is_not_found_and_never_executes() {
        let base = TempDir::new().unwrap();
        touch_action(base.path(), "index");
        let hits = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(base.path(), counting_table("index", Arc::clone(&hits)));

        let request = Request::default();
        let mut response = Response::new();
        // Last entry is a 21-character segment, one over the limit.
        for action in ["bad name!", "User.show", "1user", "a.b.c", "aaaaaaaaaaaaaaaaaaaaa"] {
            let err = dispatcher
                .forward(action, Params::new(), &request, &mut response)
                .unwrap_err();
            assert_eq!(err.category(), ErrorCategory::NotFound, "action {action:?}");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_unit_file_is_not_found() {
        let base = TempDir::new().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        // Handler registered, but no actions/ping.unit on disk.
        let dispatcher = dispatcher(base.path(), counting_table("ping", Arc::clone(&hits)));

        let request = Request::default();
        let mut response = Response::new();
        let err = dispatcher
            .forward("ping", Params::new(), &request, &mut response)
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotFound(msg) if msg == "no action: ping"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unregistered_handler_is_not_found() {
        let base = TempDir::new().unwrap();
        touch_action(base.path(), "orphan");
        let dispatcher = dispatcher(base.path(), ActionTable::new());

        let request = Request::default();
        let mut response = Response::new();
        let err = dispatcher
            .forward("orphan", Params::new(), &request, &mut response)
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotFound(_)));
    }

    #[test]
    fn unit_errors_propagate_uninterpreted() {
        let base = TempDir::new().unwrap();
        touch_action(base.path(), "strict");
        let mut table = ActionTable::new();
        table.register("strict", |_ctx| {
            Err(DispatchError::BadRequest("missing field: id".into()))
        });
        let dispatcher = dispatcher(base.path(), table);

        let request = Request::default();
        let mut response = Response::new();
        let err = dispatcher
            .forward("strict", Params::new(), &request, &mut response)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
    }

    #[test]
    fn params_reach_the_unit() {
        let base = TempDir::new().unwrap();
        touch_action(base.path(), "echo");
        let mut table = ActionTable::new();
        table.register("echo", |ctx| {
            assert_eq!(ctx.params.get("error"), Some(&json!("detail")));
            Ok(())
        });
        let dispatcher = dispatcher(base.path(), table);

        let mut params = Params::new();
        params.insert("error".into(), json!("detail"));
        let request = Request::default();
        let mut response = Response::new();
        dispatcher
            .forward("echo", params, &request, &mut response)
            .unwrap();
    }
}
