//! Grouped commit and discard
//!
//! A composition owns an ordered set of reversible states. It is dirty when
//! any member is dirty, commits members one after another in their fixed
//! order, and notifies a single callback once every member was persisted.
//!
//! Commits are fail-fast: the first member whose `sync` fails aborts the pass.
//! Members synced earlier in the pass stay committed, the failing member and
//! everything after it stay dirty, and the callback does not run.

use super::{boxed_callback, ReversibleState, SyncedCallback};
use crate::shared::error::PersistenceError;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;

/// Ordered view over the members of a composition.
///
/// Implemented for a plain list of boxed states and for typed member
/// structs that want to keep field access to each state.
pub trait StateMembers: Send + Sync {
    /// Members in commit order
    fn states(&self) -> Vec<&dyn ReversibleState>;

    /// Members in commit order, mutably
    fn states_mut(&mut self) -> Vec<&mut dyn ReversibleState>;
}

impl StateMembers for Vec<Box<dyn ReversibleState>> {
    fn states(&self) -> Vec<&dyn ReversibleState> {
        self.iter().map(|state| state.as_ref() as &dyn ReversibleState).collect()
    }

    fn states_mut(&mut self) -> Vec<&mut dyn ReversibleState> {
        self.iter_mut()
            .map(|state| state.as_mut() as &mut dyn ReversibleState)
            .collect()
    }
}

/// A fixed group of reversible states committed and reset together
pub struct ReversibleStatesComposition<M> {
    name: String,
    members: M,
    on_state_synced: Option<SyncedCallback>,
}

impl<M: StateMembers> ReversibleStatesComposition<M> {
    /// Group `members`; their commit order is the order `states_mut` yields
    pub fn new(name: impl Into<String>, members: M) -> Self {
        Self {
            name: name.into(),
            members,
            on_state_synced: None,
        }
    }

    /// Run `callback` once after every fully successful commit
    pub fn with_on_state_synced<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_state_synced = Some(boxed_callback(callback));
        self
    }

    pub fn members(&self) -> &M {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut M {
        &mut self.members
    }

    /// Names of the members currently holding unsynced edits
    pub fn dirty_members(&self) -> Vec<String> {
        self.members
            .states()
            .into_iter()
            .filter(|state| state.has_unsynced_changes())
            .map(|state| state.name().to_string())
            .collect()
    }
}

#[async_trait]
impl<M: StateMembers> ReversibleState for ReversibleStatesComposition<M> {
    fn name(&self) -> &str {
        &self.name
    }

    /// Recomputed on every call, members change independently.
    fn has_unsynced_changes(&self) -> bool {
        self.members
            .states()
            .iter()
            .any(|state| state.has_unsynced_changes())
    }

    async fn sync(&mut self) -> Result<(), PersistenceError> {
        let name = self.name.clone();
        for state in self.members.states_mut() {
            if let Err(e) = state.sync().await {
                tracing::warn!(
                    composition = %name,
                    member = %state.name(),
                    error = %e,
                    "commit aborted, later members not attempted"
                );
                return Err(e);
            }
        }
        tracing::info!(composition = %name, "all members synced");

        if let Some(callback) = &self.on_state_synced {
            callback().await;
        }
        Ok(())
    }

    fn reset(&mut self) {
        for state in self.members.states_mut() {
            state.reset();
        }
        tracing::debug!(composition = %self.name, "reset all members");
    }
}

impl<M: fmt::Debug> fmt::Debug for ReversibleStatesComposition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReversibleStatesComposition")
            .field("name", &self.name)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}
