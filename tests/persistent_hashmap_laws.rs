//! Property-based laws for `PersistentHashMap`.

use canopy::{PersistentHashMap, TransientHashMap};
use proptest::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Strategies
// =============================================================================

fn arbitrary_key() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn arbitrary_entries() -> impl Strategy<Value = Vec<(String, i32)>> {
    prop::collection::vec((arbitrary_key(), any::<i32>()), 0..60)
}

/// One step of a replayed update sequence.
#[derive(Clone, Debug)]
enum Operation {
    Insert(String, i32),
    Remove(String),
}

fn arbitrary_operations() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(
        prop_oneof![
            (arbitrary_key(), any::<i32>()).prop_map(|(key, value)| Operation::Insert(key, value)),
            arbitrary_key().prop_map(Operation::Remove),
        ],
        0..120,
    )
}

// =============================================================================
// Laws
// =============================================================================

proptest! {
    // insert(k, v).get(k) == v
    #[test]
    fn prop_get_after_insert(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in any::<i32>(),
    ) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let inserted = map.insert(key.clone(), value);
        prop_assert_eq!(inserted.get(&key), Some(&value));
    }

    // k1 != k2 => insert(k1, v).get(k2) == get(k2)
    #[test]
    fn prop_insert_does_not_disturb_other_keys(
        entries in arbitrary_entries(),
        key1 in arbitrary_key(),
        key2 in arbitrary_key(),
        value in any::<i32>(),
    ) {
        prop_assume!(key1 != key2);
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let inserted = map.insert(key1, value);
        prop_assert_eq!(inserted.get(&key2), map.get(&key2));
    }

    // remove(k).get(k) == None, and the receiver still holds k's value
    #[test]
    fn prop_persistence_across_remove(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
    ) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let before = map.get(&key).copied();
        let removed = map.remove(&key);
        prop_assert_eq!(removed.get(&key), None);
        prop_assert_eq!(map.get(&key).copied(), before);
    }

    // insert(k, v).insert(k, v) is content-equal to insert(k, v)
    #[test]
    fn prop_insert_is_idempotent(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in any::<i32>(),
    ) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let once = map.insert(key.clone(), value);
        let twice = once.insert(key, value);
        prop_assert_eq!(once, twice);
    }

    // Replaying any operation sequence matches std::collections::HashMap.
    #[test]
    fn prop_differential_against_std(operations in arbitrary_operations()) {
        let mut subject: PersistentHashMap<String, i32> = PersistentHashMap::new();
        let mut model: HashMap<String, i32> = HashMap::new();

        for operation in operations {
            match operation {
                Operation::Insert(key, value) => {
                    subject = subject.insert(key.clone(), value);
                    model.insert(key, value);
                }
                Operation::Remove(key) => {
                    subject = subject.remove(&key);
                    model.remove(&key);
                }
            }
        }

        prop_assert_eq!(subject.len(), model.len());
        for (key, value) in &model {
            prop_assert_eq!(subject.get(key), Some(value));
        }
        for (key, value) in subject.iter() {
            prop_assert_eq!(model.get(key), Some(value));
        }
    }

    // The same sequence through a transient matches the persistent path.
    #[test]
    fn prop_transient_matches_persistent(operations in arbitrary_operations()) {
        let mut persistent: PersistentHashMap<String, i32> = PersistentHashMap::new();
        let mut transient: TransientHashMap<String, i32> = TransientHashMap::new();

        for operation in operations {
            match operation {
                Operation::Insert(key, value) => {
                    persistent = persistent.insert(key.clone(), value);
                    transient.insert(key, value);
                }
                Operation::Remove(key) => {
                    persistent = persistent.remove(&key);
                    transient.remove(&key);
                }
            }
        }

        prop_assert_eq!(transient.persistent(), persistent);
    }

    // transient().persistent() round-trips to a content-equal map.
    #[test]
    fn prop_transient_roundtrip(entries in arbitrary_entries()) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let roundtrip = map.transient().persistent();
        prop_assert_eq!(roundtrip, map);
    }
}
