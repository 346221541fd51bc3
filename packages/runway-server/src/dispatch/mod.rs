//! Action dispatch: validation, target derivation, and unit execution.
//!
//! 1. **Validate** ([`router`]): the action string against the grammar
//! 2. **Parse**: split into `(module, method)` and compute the unit id
//! 3. **Gate**: the unit file must exist under the actions directory
//! 4. **Execute** ([`table`]): the registered handler, with a fresh
//!    [`ActionContext`] carrying params and both lazy registries

pub mod context;
pub mod router;
pub mod table;

pub use context::ActionContext;
pub use router::Dispatcher;
pub use table::{ActionHandler, ActionTable};
