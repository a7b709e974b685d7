//! Hooks: handler registry keyed by collection and phase.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::context::HookContext;
use super::error::HookError;
use super::Phase;
use crate::record::Record;

type Handler<S> = Box<dyn Fn(&mut HookContext<'_, S>) -> Result<(), HookError> + Send + Sync>;

/// Registry of lifecycle hook handlers.
///
/// Generic over `S`, the state handed to every handler through its context.
pub struct Hooks<S> {
    handlers: HashMap<(String, Phase), Vec<Handler<S>>>,
}

impl<S> Default for Hooks<S> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<S> Hooks<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `phase` events on `collection`.
    ///
    /// Uses builder pattern, returns `self` for chaining.
    pub fn on<F>(mut self, phase: Phase, collection: &str, handler: F) -> Self
    where
        F: Fn(&mut HookContext<'_, S>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.handlers
            .entry((collection.to_string(), phase))
            .or_default()
            .push(Box::new(handler));
        self
    }

    pub fn on_after_create<F>(self, collection: &str, handler: F) -> Self
    where
        F: Fn(&mut HookContext<'_, S>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on(Phase::AfterCreate, collection, handler)
    }

    pub fn on_after_update<F>(self, collection: &str, handler: F) -> Self
    where
        F: Fn(&mut HookContext<'_, S>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on(Phase::AfterUpdate, collection, handler)
    }

    pub fn on_after_delete<F>(self, collection: &str, handler: F) -> Self
    where
        F: Fn(&mut HookContext<'_, S>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on(Phase::AfterDelete, collection, handler)
    }

    /// Run the handlers registered for the record's collection and `phase`.
    ///
    /// Handlers run in registration order; the first error is returned and
    /// the remaining handlers are skipped.
    pub fn fire(&self, phase: Phase, record: &mut Record, state: &S) -> Result<(), HookError> {
        let Some(handlers) = self
            .handlers
            .get(&(record.collection().to_string(), phase))
        else {
            return Ok(());
        };

        debug!(
            collection = record.collection(),
            id = record.id(),
            %phase,
            handlers = handlers.len(),
            "firing hooks"
        );

        let mut ctx = HookContext::new(phase, record, state);
        for handler in handlers {
            if let Err(err) = handler(&mut ctx) {
                warn!(
                    collection = ctx.collection(),
                    id = ctx.record().id(),
                    %phase,
                    error = %err,
                    "hook failed"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Number of handlers for a collection and phase.
    pub fn handler_count(&self, collection: &str, phase: Phase) -> usize {
        self.handlers
            .get(&(collection.to_string(), phase))
            .map_or(0, Vec::len)
    }

    /// Registered `(collection, phase)` pairs, sorted.
    pub fn registered(&self) -> Vec<(&str, Phase)> {
        let mut keys: Vec<(&str, Phase)> = self
            .handlers
            .keys()
            .map(|(collection, phase)| (collection.as_str(), *phase))
            .collect();
        keys.sort();
        keys
    }
}
