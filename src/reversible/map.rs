//! Keyed reversible flags
//!
//! Every key carries its own applied/pending pair, but the map is written
//! through its port as one snapshot so that edits to several keys commit
//! together. The key set is fixed at construction.

use super::gate::gated;
use super::port::PersistencePort;
use super::{boxed_hook, ReversibleState, SyncedHook};
use crate::shared::error::{PersistenceError, StateError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Fixed set of keys, each with an applied and a pending value
pub struct ReversibleStateMap<K, V> {
    name: String,
    applied: BTreeMap<K, V>,
    pending: BTreeMap<K, V>,
    port: Arc<dyn PersistencePort<BTreeMap<K, V>>>,
    on_state_synced: Option<SyncedHook<BTreeMap<K, V>>>,
}

impl<K, V> ReversibleStateMap<K, V>
where
    K: Ord + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    /// Create a clean map whose key set is the key set of `applied`
    pub fn new(
        name: impl Into<String>,
        applied: BTreeMap<K, V>,
        port: Arc<dyn PersistencePort<BTreeMap<K, V>>>,
    ) -> Self {
        Self {
            name: name.into(),
            pending: applied.clone(),
            applied,
            port,
            on_state_synced: None,
        }
    }

    /// Create a clean map seeded from the port's read source
    pub async fn load(
        name: impl Into<String>,
        port: Arc<dyn PersistencePort<BTreeMap<K, V>>>,
    ) -> Result<Self, PersistenceError> {
        let applied = port.read().await?;
        Ok(Self::new(name, applied, port))
    }

    /// Run `hook` with the applied snapshot after every successful sync
    pub fn with_on_state_synced<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(BTreeMap<K, V>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_state_synced = Some(boxed_hook(hook));
        self
    }

    /// Pending value of `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        self.pending.get(key)
    }

    /// Applied value of `key`
    pub fn get_applied(&self, key: &K) -> Option<&V> {
        self.applied.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Set the pending value of `key`, leaving every other key untouched.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not part of the map's key set. Use
    /// [`try_set`](Self::try_set) when the key comes from untrusted input.
    pub fn set(&mut self, key: K, value: V) {
        if let Err(e) = self.try_set(key, value) {
            panic!("{}", e);
        }
    }

    /// Set the pending value of `key`, rejecting keys outside the key set
    pub fn try_set(&mut self, key: K, value: V) -> Result<(), StateError> {
        match self.pending.get_mut(&key) {
            Some(slot) => {
                tracing::debug!(state = %self.name, ?key, ?value, "set pending value");
                *slot = value;
                Ok(())
            }
            None => Err(StateError::UnknownKey {
                map: self.name.clone(),
                key: format!("{:?}", key),
            }),
        }
    }

    /// Set `key` only if `guard` accepts it given the current pending map.
    ///
    /// # Panics
    ///
    /// Panics on an accepted value for an unknown key, like [`set`](Self::set).
    pub fn set_if<D>(
        &mut self,
        key: K,
        value: V,
        guard: impl FnOnce(&Self, &K, &V) -> Result<(), D>,
        on_denied: impl FnOnce(&K, &V, &D),
    ) -> Result<(), D> {
        let mut accepted = None;
        let result = {
            let this = &*self;
            gated(
                (key, value),
                |(k, v)| guard(this, k, v),
                |(k, v), denial| {
                    tracing::debug!(state = %this.name, key = ?k, value = ?v, "set denied");
                    on_denied(k, v, denial)
                },
                |entry| accepted = Some(entry),
            )
        };
        if let Some((key, value)) = accepted {
            self.set(key, value);
        }
        result
    }

    /// Pending snapshot
    pub fn pending(&self) -> &BTreeMap<K, V> {
        &self.pending
    }

    /// Applied snapshot
    pub fn applied(&self) -> &BTreeMap<K, V> {
        &self.applied
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.pending.keys()
    }

    /// Pending entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.pending.iter()
    }

    /// Keys whose pending value differs from the applied one
    pub fn unsynced_keys(&self) -> Vec<&K> {
        self.pending
            .iter()
            .filter(|(k, v)| self.applied.get(*k) != Some(*v))
            .map(|(k, _)| k)
            .collect()
    }

    /// Re-read the applied snapshot from the port.
    ///
    /// Keys outside the fixed key set are ignored. A clean map follows the
    /// store; a dirty map keeps its pending edits.
    pub async fn reload(&mut self) -> Result<(), PersistenceError> {
        let stored = self.port.read().await?;
        let was_clean = !self.has_unsynced_changes();
        for (key, value) in stored {
            if let Some(slot) = self.applied.get_mut(&key) {
                *slot = value;
            }
        }
        if was_clean {
            self.pending = self.applied.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl<K, V> ReversibleState for ReversibleStateMap<K, V>
where
    K: Ord + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn has_unsynced_changes(&self) -> bool {
        self.pending != self.applied
    }

    async fn sync(&mut self) -> Result<(), PersistenceError> {
        let snapshot = self.pending.clone();
        if let Err(e) = self.port.write(snapshot.clone()).await {
            tracing::warn!(state = %self.name, error = %e, "sync failed, keeping pending map");
            return Err(e);
        }
        self.applied = snapshot;
        tracing::debug!(state = %self.name, keys = self.applied.len(), "synced");

        if let Some(hook) = &self.on_state_synced {
            hook(self.applied.clone()).await;
        }
        Ok(())
    }

    fn reset(&mut self) {
        if self.has_unsynced_changes() {
            tracing::debug!(state = %self.name, keys = ?self.unsynced_keys(), "discarding pending edits");
        }
        self.pending = self.applied.clone();
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ReversibleStateMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReversibleStateMap")
            .field("name", &self.name)
            .field("applied", &self.applied)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
