//! # Reversible State
//!
//! Values that carry an *applied* version (last known to be durably persisted)
//! and a *pending* version (locally edited, not yet committed). Callers edit
//! the pending value freely, ask whether it diverges from the applied one,
//! and either commit it (`sync`) through an injected persistence port or
//! discard it (`reset`).
//!
//! ## Key Components
//!
//! - `port.rs`: `PersistencePort`, the injected read/write source of a state
//! - `flow.rs`: `ReversibleStateFlow`, a single scalar value
//! - `map.rs`: `ReversibleStateMap`, a fixed key set of flags committed as one batch
//! - `composition.rs`: `ReversibleStatesComposition`, an ordered group committed together
//! - `gate.rs`: guarded setters that may refuse an edit
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wifiwidget::reversible::{MemoryPort, ReversibleState, ReversibleStateFlow};
//!
//! # async fn example() -> Result<(), wifiwidget::shared::PersistenceError> {
//! let port = Arc::new(MemoryPort::new(5u32));
//! let mut opacity = ReversibleStateFlow::<u32>::load("opacity", port).await?;
//!
//! opacity.set(9);
//! assert!(opacity.has_unsynced_changes());
//! opacity.sync().await?;
//! assert_eq!(*opacity.applied(), 9);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Every state has a single owner. `get`/`set`/`reset` are synchronous;
//! `sync` is the only suspending operation. A cancelled `sync` may leave
//! the store written while `applied` still holds the old value; the state
//! then reports itself dirty and a retry writes the same value again.

pub mod composition;
pub mod flow;
pub mod gate;
pub mod map;
pub mod port;

pub use composition::{ReversibleStatesComposition, StateMembers};
pub use flow::ReversibleStateFlow;
pub use gate::gated;
pub use map::ReversibleStateMap;
pub use port::{MemoryPort, PersistencePort};

use crate::shared::error::PersistenceError;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::future::Future;

/// Whether a state's pending value diverges from its applied value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// pending == applied
    Clean,
    /// pending != applied
    Dirty,
}

/// Capability shared by every reversible value.
#[async_trait]
pub trait ReversibleState: Send + Sync {
    /// Name used in log records
    fn name(&self) -> &str;

    /// True while the pending value differs from the applied one
    fn has_unsynced_changes(&self) -> bool;

    /// Persist the pending value, then adopt it as applied.
    ///
    /// On failure the pending value is kept so the commit can be retried.
    async fn sync(&mut self) -> Result<(), PersistenceError>;

    /// Discard pending edits.
    fn reset(&mut self);

    fn status(&self) -> SyncStatus {
        if self.has_unsynced_changes() {
            SyncStatus::Dirty
        } else {
            SyncStatus::Clean
        }
    }
}

/// Hook invoked with the freshly applied value after a successful sync
pub type SyncedHook<T> = Box<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

/// Hook invoked once after a composition finished syncing all members
pub type SyncedCallback = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub(crate) fn boxed_hook<T, F, Fut>(hook: F) -> SyncedHook<T>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move |value| Box::pin(hook(value)))
}

pub(crate) fn boxed_callback<F, Fut>(callback: F) -> SyncedCallback
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move || Box::pin(callback()))
}
