//! Property-based tests for reversible states
//!
//! Uses proptest to drive flows and maps through random edit sequences

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use wifiwidget::reversible::{MemoryPort, ReversibleState, ReversibleStateFlow, ReversibleStateMap};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn flags() -> impl Strategy<Value = BTreeMap<u8, bool>> {
    prop::collection::btree_map(0u8..16, any::<bool>(), 1..8)
}

proptest! {
    #[test]
    fn test_set_diverges_from_applied(v1 in any::<u32>(), v2 in any::<u32>()) {
        prop_assume!(v1 != v2);
        let mut state = ReversibleStateFlow::new("value", v1, Arc::new(MemoryPort::new(v1)));

        state.set(v2);
        prop_assert!(state.has_unsynced_changes());
        prop_assert_eq!(*state.get(), v2);
        prop_assert_eq!(*state.applied(), v1);
    }

    #[test]
    fn test_reset_restores_applied(initial in any::<u32>(), edits in prop::collection::vec(any::<u32>(), 0..10)) {
        let mut state = ReversibleStateFlow::new("value", initial, Arc::new(MemoryPort::new(initial)));
        for edit in edits {
            state.set(edit);
        }

        state.reset();
        prop_assert_eq!(*state.get(), initial);
        prop_assert!(!state.has_unsynced_changes());
    }

    #[test]
    fn test_sync_adopts_written_value(initial in any::<u32>(), edit in any::<u32>()) {
        let port = Arc::new(MemoryPort::new(initial));
        let mut state = ReversibleStateFlow::new("value", initial, port.clone());
        state.set(edit);

        let written = runtime().block_on(async {
            state.sync().await.unwrap();
            port.value().await
        });
        prop_assert_eq!(written, edit);
        prop_assert_eq!(*state.applied(), edit);
        prop_assert_eq!(*state.get(), edit);
        prop_assert!(!state.has_unsynced_changes());
    }

    #[test]
    fn test_map_set_touches_one_key(initial in flags(), pick in any::<prop::sample::Index>(), value in any::<bool>()) {
        let port = Arc::new(MemoryPort::new(initial.clone()));
        let mut map = ReversibleStateMap::new("flags", initial.clone(), port.clone());
        let keys: Vec<u8> = initial.keys().copied().collect();
        let key = keys[pick.index(keys.len())];

        map.set(key, value);
        for (k, v) in &initial {
            if *k != key {
                prop_assert_eq!(map.get(k), Some(v));
            }
        }
        prop_assert_eq!(map.get(&key), Some(&value));

        let pending = map.pending().clone();
        let written = runtime().block_on(async {
            map.sync().await.unwrap();
            port.value().await
        });
        prop_assert_eq!(written, pending);
        prop_assert!(!map.has_unsynced_changes());
    }
}
