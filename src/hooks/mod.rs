//! hooks: lifecycle hook registration and dispatch.
//!
//! The record framework fires an event after a record is created, updated
//! or deleted. Handlers are registered per collection and phase on a
//! `Hooks` registry; each receives a `HookContext<S>` with the record and
//! the shared state `S`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use trail_search::hooks::{Hooks, HookError};
//!
//! let hooks = Hooks::new()
//!     .on_after_create("trails", |ctx| {
//!         index_trail(ctx.state().search.as_ref(), ctx.record())?;
//!         Ok(())
//!     });
//!
//! hooks.fire(Phase::AfterCreate, &mut record, &state)?;
//! ```
//!
//! Handlers run synchronously on the caller's thread, in registration
//! order. The first error stops the chain and becomes the request's error.

mod context;
mod error;
mod registry;

use std::fmt;

pub use context::HookContext;
pub use error::HookError;
pub use registry::Hooks;

/// When a hook fires relative to the record write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    AfterCreate,
    AfterUpdate,
    AfterDelete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AfterCreate => "after_create",
            Phase::AfterUpdate => "after_update",
            Phase::AfterDelete => "after_delete",
        };
        f.write_str(name)
    }
}
