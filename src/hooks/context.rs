//! Context passed to hook handlers.

use super::Phase;
use crate::record::Record;

/// The context passed to every hook handler.
///
/// Generic over `S` (the shared state) so handlers reach the search client,
/// record store and token issuer without capturing globals.
pub struct HookContext<'a, S> {
    phase: Phase,
    record: &'a mut Record,
    state: &'a S,
}

impl<'a, S> HookContext<'a, S> {
    pub(crate) fn new(phase: Phase, record: &'a mut Record, state: &'a S) -> Self {
        Self {
            phase,
            record,
            state,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn collection(&self) -> &str {
        self.record.collection()
    }

    /// The record the event is about. After delete it is the last stored version.
    pub fn record(&self) -> &Record {
        self.record
    }

    /// Mutable access, for handlers that write back onto the record.
    pub fn record_mut(&mut self) -> &mut Record {
        self.record
    }

    pub fn state(&self) -> &S {
        self.state
    }

    /// Record and state at once, for handlers that mutate the record
    /// while calling into the state.
    pub fn parts(&mut self) -> (&mut Record, &S) {
        (&mut *self.record, self.state)
    }
}
