//! Commit ordering and failure behaviour of compositions

use crate::common::{event_log, events, FailingPort, RecordingPort};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wifiwidget::reversible::{
    PersistencePort, ReversibleState, ReversibleStateFlow, ReversibleStateMap,
    ReversibleStatesComposition,
};
use wifiwidget::shared::PersistenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Flag {
    Flag1,
    Flag2,
}

/// Captures a value from another store at write time
struct ObservingPort {
    source: Arc<Mutex<u32>>,
    observed: Arc<Mutex<Option<u32>>>,
}

#[async_trait]
impl PersistencePort<u32> for ObservingPort {
    async fn read(&self) -> Result<u32, PersistenceError> {
        Ok(0)
    }

    async fn write(&self, _value: u32) -> Result<(), PersistenceError> {
        *self.observed.lock().unwrap() = Some(*self.source.lock().unwrap());
        Ok(())
    }
}

fn counter() -> (Arc<AtomicUsize>, impl Fn() -> std::future::Ready<()> + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = count.clone();
    let callback = move || {
        handle.fetch_add(1, Ordering::SeqCst);
        std::future::ready(())
    };
    (count, callback)
}

#[tokio::test]
async fn test_later_member_sees_earlier_commit() {
    let log = event_log();
    let a_port = RecordingPort::new("a", 1u32, log.clone());
    let a_cell = a_port.cell();
    let observed = Arc::new(Mutex::new(None));

    let mut a = ReversibleStateFlow::new("a", 1u32, Arc::new(a_port));
    a.set(7);
    let b = ReversibleStateFlow::new(
        "b",
        0u32,
        Arc::new(ObservingPort {
            source: a_cell,
            observed: observed.clone(),
        }),
    );

    let members: Vec<Box<dyn ReversibleState>> = vec![Box::new(a), Box::new(b)];
    let mut composition = ReversibleStatesComposition::new("config", members);
    assert_ok!(composition.sync().await);

    assert_eq!(*observed.lock().unwrap(), Some(7));
}

#[tokio::test]
async fn test_failing_member_stops_the_pass() {
    let log = event_log();
    let mut a = ReversibleStateFlow::new("a", 1u32, Arc::new(FailingPort::new("a", 1u32, log.clone())));
    let mut b = ReversibleStateFlow::new("b", 1u32, Arc::new(RecordingPort::new("b", 1u32, log.clone())));
    a.set(2);
    b.set(3);

    let (synced, callback) = counter();
    let members: Vec<Box<dyn ReversibleState>> = vec![Box::new(a), Box::new(b)];
    let mut composition = ReversibleStatesComposition::new("config", members).with_on_state_synced(callback);

    assert_err!(composition.sync().await, PersistenceError::Rejected { .. });
    assert_eq!(events(&log), vec!["a:write".to_string()]);
    assert_eq!(synced.load(Ordering::SeqCst), 0);
    assert_eq!(composition.dirty_members(), vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn test_partial_failure_keeps_prefix_committed() {
    let log = event_log();
    let mut a = ReversibleStateFlow::new("a", 1u32, Arc::new(RecordingPort::new("a", 1u32, log.clone())));
    let mut b = ReversibleStateFlow::new("b", 1u32, Arc::new(FailingPort::new("b", 1u32, log.clone())));
    let mut c = ReversibleStateFlow::new("c", 1u32, Arc::new(RecordingPort::new("c", 1u32, log.clone())));
    a.set(2);
    b.set(2);
    c.set(2);

    let members: Vec<Box<dyn ReversibleState>> = vec![Box::new(a), Box::new(b), Box::new(c)];
    let mut composition = ReversibleStatesComposition::new("config", members);
    assert_err!(composition.sync().await);

    assert_eq!(events(&log), vec!["a:write".to_string(), "b:write".to_string()]);
    assert_eq!(composition.dirty_members(), vec!["b".to_string(), "c".to_string()]);
    assert!(composition.has_unsynced_changes());
    assert_status!(*composition.members()[0], Clean);

    composition.reset();
    assert!(!composition.has_unsynced_changes());
}

#[tokio::test]
async fn test_map_reset_discards_edit() {
    let log = event_log();
    let defaults = BTreeMap::from([(Flag::Flag1, false), (Flag::Flag2, false)]);
    let mut map = ReversibleStateMap::new(
        "flags",
        defaults.clone(),
        Arc::new(RecordingPort::new("flags", defaults, log.clone())),
    );

    map.set(Flag::Flag1, true);
    assert!(map.has_unsynced_changes());

    map.reset();
    assert_eq!(map.get(&Flag::Flag1), Some(&false));
    assert!(!map.has_unsynced_changes());
    assert!(events(&log).is_empty());
}

#[tokio::test]
async fn test_single_member_commit_notifies_once() {
    let log = event_log();
    let port = RecordingPort::new("value", 5u32, log.clone());
    let stored = port.cell();
    let mut value = ReversibleStateFlow::new("value", 5u32, Arc::new(port));
    value.set(9);

    let (synced, callback) = counter();
    let members: Vec<Box<dyn ReversibleState>> = vec![Box::new(value)];
    let mut composition = ReversibleStatesComposition::new("config", members).with_on_state_synced(callback);
    assert_ok!(composition.sync().await);

    assert_eq!(*stored.lock().unwrap(), 9);
    assert_eq!(synced.load(Ordering::SeqCst), 1);
    assert!(!composition.has_unsynced_changes());
}

#[tokio::test]
async fn test_clean_members_are_still_written() {
    let log = event_log();
    let a = ReversibleStateFlow::new("a", 1u32, Arc::new(RecordingPort::new("a", 1u32, log.clone())));
    let mut b = ReversibleStateFlow::new("b", 1u32, Arc::new(RecordingPort::new("b", 1u32, log.clone())));
    b.set(4);

    let members: Vec<Box<dyn ReversibleState>> = vec![Box::new(a), Box::new(b)];
    let mut composition = ReversibleStatesComposition::new("config", members);
    assert_ok!(composition.sync().await);

    assert_eq!(events(&log), vec!["a:write".to_string(), "b:write".to_string()]);
}

#[tokio::test]
async fn test_compositions_nest() {
    let log = event_log();
    let mut inner_value =
        ReversibleStateFlow::new("inner_value", 1u32, Arc::new(RecordingPort::new("inner", 1u32, log.clone())));
    inner_value.set(2);
    let inner_members: Vec<Box<dyn ReversibleState>> = vec![Box::new(inner_value)];
    let inner = ReversibleStatesComposition::new("inner", inner_members);
    let outer_value =
        ReversibleStateFlow::new("outer_value", 1u32, Arc::new(RecordingPort::new("outer", 1u32, log.clone())));

    let members: Vec<Box<dyn ReversibleState>> = vec![Box::new(inner), Box::new(outer_value)];
    let mut outer = ReversibleStatesComposition::new("outer", members);
    assert_eq!(outer.dirty_members(), vec!["inner".to_string()]);

    assert_ok!(outer.sync().await);
    assert_eq!(events(&log), vec!["inner:write".to_string(), "outer:write".to_string()]);
    assert!(!outer.has_unsynced_changes());
}
