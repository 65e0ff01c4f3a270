//! Persistence ports for exercising commit behaviour

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use wifiwidget::reversible::PersistencePort;
use wifiwidget::shared::PersistenceError;

/// Ordered log shared between ports
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Stores the last written value and appends `"<label>:write"` to a shared log
pub struct RecordingPort<T> {
    label: &'static str,
    value: Arc<Mutex<T>>,
    log: EventLog,
}

impl<T: Clone> RecordingPort<T> {
    pub fn new(label: &'static str, value: T, log: EventLog) -> Self {
        Self {
            label,
            value: Arc::new(Mutex::new(value)),
            log,
        }
    }

    /// Handle to the stored value, usable as a side channel
    pub fn cell(&self) -> Arc<Mutex<T>> {
        self.value.clone()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> PersistencePort<T> for RecordingPort<T> {
    async fn read(&self) -> Result<T, PersistenceError> {
        Ok(self.value.lock().unwrap().clone())
    }

    async fn write(&self, value: T) -> Result<(), PersistenceError> {
        self.log.lock().unwrap().push(format!("{}:write", self.label));
        *self.value.lock().unwrap() = value;
        Ok(())
    }
}

/// Rejects every write and logs the attempt
pub struct FailingPort<T> {
    label: &'static str,
    value: T,
    log: EventLog,
}

impl<T> FailingPort<T> {
    pub fn new(label: &'static str, value: T, log: EventLog) -> Self {
        Self { label, value, log }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> PersistencePort<T> for FailingPort<T> {
    async fn read(&self) -> Result<T, PersistenceError> {
        Ok(self.value.clone())
    }

    async fn write(&self, _value: T) -> Result<(), PersistenceError> {
        self.log.lock().unwrap().push(format!("{}:write", self.label));
        Err(PersistenceError::rejected(self.label, "store unavailable"))
    }
}
