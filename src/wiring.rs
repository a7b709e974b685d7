//! Hook handlers that keep the search service in step with the record store.
//!
//! | collection | phase        | handler           |
//! |------------|--------------|-------------------|
//! | users      | after create | `on_user_created` |
//! | trails     | after create | `on_trail_saved`  |
//! | trails     | after update | `on_trail_saved`  |
//! | trails     | after delete | `on_trail_deleted`|

use std::sync::Arc;

use tracing::info;

use crate::hooks::{HookContext, HookError, Hooks};
use crate::index::{delete_trail, index_trail};
use crate::record::RecordStore;
use crate::search::SearchService;
use crate::token::TokenIssuer;

pub const USERS_COLLECTION: &str = "users";
pub const TRAILS_COLLECTION: &str = "trails";

/// Everything the handlers need, passed explicitly through the hook context.
pub struct SyncState<S> {
    pub store: S,
    pub search: Arc<dyn SearchService>,
    pub issuer: TokenIssuer,
}

impl<S> SyncState<S> {
    pub fn new(store: S, search: Arc<dyn SearchService>, issuer: TokenIssuer) -> Self {
        Self {
            store,
            search,
            issuer,
        }
    }
}

/// Mint a tenant token for a new user and save it onto the user record.
pub fn on_user_created<S: RecordStore>(
    ctx: &mut HookContext<'_, SyncState<S>>,
) -> Result<(), HookError> {
    let (record, state) = ctx.parts();
    state.issuer.issue_for_record(record, &state.store)?;
    info!(user_id = record.id(), "issued search token");
    Ok(())
}

/// Replace the trail's document in the index.
pub fn on_trail_saved<S>(ctx: &mut HookContext<'_, SyncState<S>>) -> Result<(), HookError> {
    let task = index_trail(ctx.state().search.as_ref(), ctx.record())?;
    info!(trail_id = ctx.record().id(), task_uid = task.task_uid, "trail indexed");
    Ok(())
}

/// Remove the trail's document from the index.
pub fn on_trail_deleted<S>(ctx: &mut HookContext<'_, SyncState<S>>) -> Result<(), HookError> {
    let task = delete_trail(ctx.state().search.as_ref(), ctx.record().id())?;
    info!(trail_id = ctx.record().id(), task_uid = task.task_uid, "trail removed from index");
    Ok(())
}

/// Register the sync handlers on `hooks`.
pub fn register_sync_hooks<S: RecordStore + 'static>(
    hooks: Hooks<SyncState<S>>,
) -> Hooks<SyncState<S>> {
    hooks
        .on_after_create(USERS_COLLECTION, on_user_created::<S>)
        .on_after_create(TRAILS_COLLECTION, on_trail_saved::<S>)
        .on_after_update(TRAILS_COLLECTION, on_trail_saved::<S>)
        .on_after_delete(TRAILS_COLLECTION, on_trail_deleted::<S>)
}
