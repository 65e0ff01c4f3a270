//! Scalar reversible value

use super::gate::gated;
use super::port::PersistencePort;
use super::{boxed_hook, ReversibleState, SyncedHook};
use crate::shared::error::PersistenceError;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A single value with applied and pending versions.
///
/// Starts clean (`pending == applied`). Divergence is structural equality,
/// so two equal values never count as an edit.
pub struct ReversibleStateFlow<T> {
    name: String,
    applied: T,
    pending: T,
    port: Arc<dyn PersistencePort<T>>,
    on_state_synced: Option<SyncedHook<T>>,
}

impl<T> ReversibleStateFlow<T>
where
    T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    /// Create a clean state seeded with an already known applied value
    pub fn new(name: impl Into<String>, applied: T, port: Arc<dyn PersistencePort<T>>) -> Self {
        Self {
            name: name.into(),
            pending: applied.clone(),
            applied,
            port,
            on_state_synced: None,
        }
    }

    /// Create a clean state seeded from the port's read source
    pub async fn load(
        name: impl Into<String>,
        port: Arc<dyn PersistencePort<T>>,
    ) -> Result<Self, PersistenceError> {
        let applied = port.read().await?;
        Ok(Self::new(name, applied, port))
    }

    /// Run `hook` with the applied value after every successful sync
    pub fn with_on_state_synced<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_state_synced = Some(boxed_hook(hook));
        self
    }

    /// Pending value
    pub fn get(&self) -> &T {
        &self.pending
    }

    /// Last committed value
    pub fn applied(&self) -> &T {
        &self.applied
    }

    /// Replace the pending value
    pub fn set(&mut self, value: T) {
        tracing::debug!(state = %self.name, ?value, "set pending value");
        self.pending = value;
    }

    /// Edit the pending value in place
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.pending);
        tracing::debug!(state = %self.name, value = ?self.pending, "updated pending value");
    }

    /// Set `value` only if `guard` accepts it given the current pending value
    pub fn set_if<D>(
        &mut self,
        value: T,
        guard: impl FnOnce(&T, &T) -> Result<(), D>,
        on_denied: impl FnOnce(&T, &D),
    ) -> Result<(), D> {
        let current = &self.pending;
        let name = &self.name;
        let mut accepted = None;
        let result = gated(
            value,
            |proposed| guard(current, proposed),
            |proposed, denial| {
                tracing::debug!(state = %name, ?proposed, "set denied");
                on_denied(proposed, denial)
            },
            |proposed| accepted = Some(proposed),
        );
        if let Some(value) = accepted {
            self.set(value);
        }
        result
    }

    /// Re-read the applied value from the port.
    ///
    /// A clean state follows the store; a dirty state keeps its edits.
    pub async fn reload(&mut self) -> Result<(), PersistenceError> {
        let applied = self.port.read().await?;
        if !self.has_unsynced_changes() {
            self.pending = applied.clone();
        }
        self.applied = applied;
        Ok(())
    }
}

#[async_trait]
impl<T> ReversibleState for ReversibleStateFlow<T>
where
    T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn has_unsynced_changes(&self) -> bool {
        self.pending != self.applied
    }

    async fn sync(&mut self) -> Result<(), PersistenceError> {
        let value = self.pending.clone();
        if let Err(e) = self.port.write(value.clone()).await {
            tracing::warn!(state = %self.name, error = %e, "sync failed, keeping pending value");
            return Err(e);
        }
        self.applied = value;
        tracing::debug!(state = %self.name, value = ?self.applied, "synced");

        if let Some(hook) = &self.on_state_synced {
            hook(self.applied.clone()).await;
        }
        Ok(())
    }

    fn reset(&mut self) {
        if self.has_unsynced_changes() {
            tracing::debug!(state = %self.name, "discarding pending value");
        }
        self.pending = self.applied.clone();
    }
}

impl<T: fmt::Debug> fmt::Debug for ReversibleStateFlow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReversibleStateFlow")
            .field("name", &self.name)
            .field("applied", &self.applied)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
