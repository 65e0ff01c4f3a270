//! Persistence ports
//!
//! A port is the durable side of a reversible state: it produces the initial
//! applied value and accepts committed values. Format and transport are
//! entirely the port's business.

use crate::shared::error::PersistenceError;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Read source and write sink of one reversible value
#[async_trait]
pub trait PersistencePort<T: Send + 'static>: Send + Sync {
    /// Current durable value
    async fn read(&self) -> Result<T, PersistenceError>;

    /// Durably store `value`
    async fn write(&self, value: T) -> Result<(), PersistenceError>;
}

/// Port keeping its value in memory.
///
/// Counts writes, which makes it handy for previews and tests.
#[derive(Debug)]
pub struct MemoryPort<T> {
    value: RwLock<T>,
    writes: RwLock<usize>,
}

impl<T> MemoryPort<T> {
    /// Create a port currently holding `value`
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
            writes: RwLock::new(0),
        }
    }

    /// Number of successful writes so far
    pub async fn write_count(&self) -> usize {
        *self.writes.read().await
    }
}

impl<T: Clone> MemoryPort<T> {
    /// Value as last written
    pub async fn value(&self) -> T {
        self.value.read().await.clone()
    }
}

#[async_trait]
impl<T> PersistencePort<T> for MemoryPort<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn read(&self) -> Result<T, PersistenceError> {
        Ok(self.value.read().await.clone())
    }

    async fn write(&self, value: T) -> Result<(), PersistenceError> {
        *self.value.write().await = value;
        *self.writes.write().await += 1;
        Ok(())
    }
}
