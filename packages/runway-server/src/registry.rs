//! Lazy service-locator registries for request-scoped models and services.
//!
//! Dependencies are named, not declared: an action unit asks the registry
//! for `"widget"` and gets a constructed instance back. Construction is
//! deferred to first access, goes through a startup-populated factory table
//! (no runtime reflection), and happens at most once per name per registry.
//! Registries live and die with the dispatch context that created them and
//! are never shared across concurrent requests.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use runway_core::DispatchError;

use crate::resolver::{NameResolver, NAMESPACE_SEPARATOR};

/// Symbolic namespace under which model units are resolved.
pub const MODELS_NAMESPACE: &str = "app::models";

/// Symbolic namespace under which service units are resolved.
pub const SERVICES_NAMESPACE: &str = "app::services";

/// A named model instance. `as_any` enables callers to recover the concrete
/// type from the trait object the registry hands out.
pub trait Model: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// A named service instance.
pub trait Service: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Case-normalizes a dependency name to its symbolic class form: first
/// letter uppercased, remainder lowercased.
fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// FactoryTable
// ---------------------------------------------------------------------------

type Factory<C, T> = Box<dyn Fn(&C) -> Arc<T> + Send + Sync>;

/// Startup-populated mapping from a normalized dependency name to its
/// constructor. Immutable once the application is built; shared by every
/// request-scoped registry via `Arc`.
pub struct FactoryTable<C, T: ?Sized> {
    entries: HashMap<String, Factory<C, T>>,
}

impl<C, T: ?Sized> FactoryTable<C, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a factory under a case-insensitive name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&C) -> Arc<T> + Send + Sync + 'static,
    {
        self.entries.insert(normalize(name), Box::new(factory));
    }

    fn get(&self, key: &str) -> Option<&Factory<C, T>> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C, T: ?Sized> Default for FactoryTable<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory table for model constructors.
pub type ModelFactoryTable = FactoryTable<ModelCtx, dyn Model>;

/// Factory table for service constructors.
pub type ServiceFactoryTable = FactoryTable<ServiceCtx, dyn Service>;

// ---------------------------------------------------------------------------
// LazyRegistry (shared logic for both roles)
// ---------------------------------------------------------------------------

/// Request-scoped lazy instantiation cache.
///
/// On a miss the registry resolves and loads the named unit, looks up its
/// factory, constructs the instance, and caches it under the normalized
/// name. Either failure — no resolvable unit file, or no registered
/// factory — surfaces as [`DispatchError::DependencyMissing`] carrying the
/// symbolic name.
struct LazyRegistry<C, T: ?Sized> {
    namespace: &'static str,
    factories: Arc<FactoryTable<C, T>>,
    resolver: Arc<NameResolver>,
    instances: Mutex<HashMap<String, Arc<T>>>,
}

impl<C, T: ?Sized> LazyRegistry<C, T> {
    fn new(
        namespace: &'static str,
        factories: Arc<FactoryTable<C, T>>,
        resolver: Arc<NameResolver>,
    ) -> Self {
        Self {
            namespace,
            factories,
            resolver,
            instances: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, name: &str, ctx: &C) -> Result<Arc<T>, DispatchError> {
        let key = normalize(name);
        if let Some(existing) = self.instances.lock().get(&key) {
            return Ok(Arc::clone(existing));
        }

        let symbolic = format!("{}{NAMESPACE_SEPARATOR}{key}", self.namespace);
        let path = self
            .resolver
            .resolve(&symbolic)
            .ok_or_else(|| DispatchError::DependencyMissing(symbolic.clone()))?;
        if !self.resolver.load(&path) {
            return Err(DispatchError::DependencyMissing(symbolic));
        }
        let Some(factory) = self.factories.get(&key) else {
            return Err(DispatchError::DependencyMissing(symbolic));
        };

        let built = factory(ctx);
        // The cache lock is not held across construction, so a factory may
        // pull sibling dependencies from the same registry. First write wins.
        let mut instances = self.instances.lock();
        Ok(Arc::clone(instances.entry(key).or_insert(built)))
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// Context handed to a model factory. The back-handle lets a model request
/// sibling models from its owning registry.
pub struct ModelCtx {
    pub models: Models,
}

/// Request-scoped registry of lazily constructed models.
pub struct ModelRegistry {
    inner: Arc<LazyRegistry<ModelCtx, dyn Model>>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new(factories: Arc<ModelFactoryTable>, resolver: Arc<NameResolver>) -> Self {
        Self {
            inner: Arc::new(LazyRegistry::new(MODELS_NAMESPACE, factories, resolver)),
        }
    }

    /// A back-handle to this registry for embedding in constructed
    /// instances. Weak, so dropping the registry tears the graph down.
    #[must_use]
    pub fn handle(&self) -> Models {
        Models {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Returns the model registered under `name`, constructing it on first
    /// access.
    ///
    /// # Errors
    ///
    /// [`DispatchError::DependencyMissing`] when the unit cannot be resolved
    /// or no factory is registered for the name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Model>, DispatchError> {
        let ctx = ModelCtx {
            models: self.handle(),
        };
        self.inner.get(name, &ctx)
    }
}

/// Cheap cloneable handle to a [`ModelRegistry`], held by constructed
/// instances and by the sibling service registry.
#[derive(Clone)]
pub struct Models {
    inner: Weak<LazyRegistry<ModelCtx, dyn Model>>,
}

impl Models {
    /// Looks up a model through the back-handle.
    ///
    /// # Errors
    ///
    /// [`DispatchError::DependencyMissing`] as for [`ModelRegistry::get`],
    /// or `Internal` if the owning registry is already gone.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Model>, DispatchError> {
        let registry = self
            .inner
            .upgrade()
            .ok_or_else(|| DispatchError::Internal(anyhow::anyhow!("model registry dropped")))?;
        let ctx = ModelCtx {
            models: self.clone(),
        };
        registry.get(name, &ctx)
    }

    /// Whether two handles refer to the same registry.
    #[must_use]
    pub fn ptr_eq(&self, other: &Models) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Context handed to a service factory: sibling services plus the full
/// model registry.
pub struct ServiceCtx {
    pub services: Services,
    pub models: Models,
}

/// Request-scoped registry of lazily constructed services.
pub struct ServiceRegistry {
    inner: Arc<LazyRegistry<ServiceCtx, dyn Service>>,
    models: Models,
}

impl ServiceRegistry {
    #[must_use]
    pub fn new(
        factories: Arc<ServiceFactoryTable>,
        resolver: Arc<NameResolver>,
        models: Models,
    ) -> Self {
        Self {
            inner: Arc::new(LazyRegistry::new(SERVICES_NAMESPACE, factories, resolver)),
            models,
        }
    }

    #[must_use]
    pub fn handle(&self) -> Services {
        Services {
            inner: Arc::downgrade(&self.inner),
            models: self.models.clone(),
        }
    }

    /// Returns the service registered under `name`, constructing it on
    /// first access.
    ///
    /// # Errors
    ///
    /// [`DispatchError::DependencyMissing`] when the unit cannot be resolved
    /// or no factory is registered for the name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Service>, DispatchError> {
        let ctx = ServiceCtx {
            services: self.handle(),
            models: self.models.clone(),
        };
        self.inner.get(name, &ctx)
    }
}

/// Cheap cloneable handle to a [`ServiceRegistry`].
#[derive(Clone)]
pub struct Services {
    inner: Weak<LazyRegistry<ServiceCtx, dyn Service>>,
    models: Models,
}

impl Services {
    /// Looks up a service through the back-handle.
    ///
    /// # Errors
    ///
    /// As for [`ServiceRegistry::get`], or `Internal` if the owning registry
    /// is already gone.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Service>, DispatchError> {
        let registry = self
            .inner
            .upgrade()
            .ok_or_else(|| DispatchError::Internal(anyhow::anyhow!("service registry dropped")))?;
        let ctx = ServiceCtx {
            services: self.clone(),
            models: self.models.clone(),
        };
        registry.get(name, &ctx)
    }

    /// Whether two handles refer to the same registry.
    #[must_use]
    pub fn ptr_eq(&self, other: &Services) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
