//! Per-forward dispatch context handed to action units.

use std::sync::Arc;

use runway_core::Params;

use crate::config::ConfigStore;
use crate::http::{Request, Response};
use crate::registry::{ModelRegistry, ServiceRegistry};

/// Everything an action unit can reach: its params, both lazy registries,
/// the configuration tree, and the request/response collaborators.
///
/// A fresh context — including fresh registries — is built for every
/// `forward` call, so instances cached during one dispatch never leak into
/// another.
pub struct ActionContext<'a> {
    pub params: Params,
    pub models: ModelRegistry,
    pub services: ServiceRegistry,
    pub config: Arc<ConfigStore>,
    pub request: &'a Request,
    pub response: &'a mut Response,
}
