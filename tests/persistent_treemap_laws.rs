//! Property-based laws for `PersistentTreeMap`.

use canopy::PersistentTreeMap;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Clone, Debug)]
enum Operation {
    Insert(i16, i32),
    Remove(i16),
}

fn arbitrary_operations() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(
        prop_oneof![
            (any::<i16>(), any::<i32>()).prop_map(|(key, value)| Operation::Insert(key, value)),
            any::<i16>().prop_map(Operation::Remove),
        ],
        0..120,
    )
}

proptest! {
    // Replaying any operation sequence matches std::collections::BTreeMap,
    // including iteration order.
    #[test]
    fn prop_differential_against_btreemap(operations in arbitrary_operations()) {
        let mut subject: PersistentTreeMap<i16, i32> = PersistentTreeMap::new();
        let mut model: BTreeMap<i16, i32> = BTreeMap::new();

        for operation in operations {
            match operation {
                Operation::Insert(key, value) => {
                    subject = subject.insert(key, value);
                    model.insert(key, value);
                }
                Operation::Remove(key) => {
                    subject = subject.remove(&key);
                    model.remove(&key);
                }
            }
        }

        prop_assert_eq!(subject.len(), model.len());
        let observed: Vec<(i16, i32)> = subject.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i16, i32)> = model.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(observed, expected);
    }

    // Navigation agrees with BTreeMap range queries.
    #[test]
    fn prop_navigation_matches_btreemap(
        keys in prop::collection::btree_set(any::<i16>(), 0..80),
        bound in any::<i16>(),
    ) {
        let subject: PersistentTreeMap<i16, i16> =
            keys.iter().map(|&key| (key, key)).collect();
        let model: BTreeMap<i16, i16> = keys.iter().map(|&key| (key, key)).collect();

        let ceiling = model.range(bound..).next().map(|(key, _)| *key);
        let floor = model.range(..=bound).next_back().map(|(key, _)| *key);
        let higher = model
            .range((Bound::Excluded(bound), Bound::Unbounded))
            .next()
            .map(|(key, _)| *key);
        let lower = model.range(..bound).next_back().map(|(key, _)| *key);

        prop_assert_eq!(subject.ceiling(&bound).map(|(key, _)| *key), ceiling);
        prop_assert_eq!(subject.floor(&bound).map(|(key, _)| *key), floor);
        prop_assert_eq!(subject.higher(&bound).map(|(key, _)| *key), higher);
        prop_assert_eq!(subject.lower(&bound).map(|(key, _)| *key), lower);
    }

    // Range iteration agrees with BTreeMap.
    #[test]
    fn prop_range_matches_btreemap(
        keys in prop::collection::btree_set(0_i32..1000, 0..80),
        lower in 0_i32..1000,
        span in 0_i32..200,
    ) {
        let upper = lower.saturating_add(span);
        let subject: PersistentTreeMap<i32, i32> = keys.iter().map(|&key| (key, key)).collect();
        let model: BTreeMap<i32, i32> = keys.iter().map(|&key| (key, key)).collect();

        let observed: Vec<i32> = subject.range(lower..upper).map(|(key, _)| *key).collect();
        let expected: Vec<i32> = model.range(lower..upper).map(|(key, _)| *key).collect();
        prop_assert_eq!(observed, expected);
    }

    // merge agrees with sequential insertion of the right operand.
    #[test]
    fn prop_merge_matches_sequential_insert(
        left in prop::collection::vec((any::<i16>(), any::<i32>()), 0..60),
        right in prop::collection::vec((any::<i16>(), any::<i32>()), 0..60),
    ) {
        let left_map: PersistentTreeMap<i16, i32> = left.into_iter().collect();
        let right_map: PersistentTreeMap<i16, i32> = right.iter().copied().collect();

        let merged = left_map.merge(&right_map);
        let mut sequential = left_map;
        for (key, value) in right_map.iter() {
            sequential = sequential.insert(*key, *value);
        }
        prop_assert_eq!(merged, sequential);
    }
}
