//! The capability contracts are implemented uniformly across backends:
//! code written against the traits runs unchanged over every concrete
//! container.

use canopy::prelude::*;
use rstest::rstest;

/// Builds a container of `0..count` through the set contract alone.
fn collect_set<S>(count: u32) -> S
where
    S: PersistentSet<u32> + Default,
{
    let mut set = S::default();
    for element in 0..count {
        set = set.insert(element);
    }
    set
}

/// Drops the even elements through the set contract alone.
fn drop_evens<S>(set: &S, count: u32) -> S
where
    S: PersistentSet<u32>,
{
    let evens: Vec<u32> = (0..count).filter(|element| element % 2 == 0).collect();
    set.remove_all(evens.iter())
}

#[rstest]
fn test_set_contract_is_backend_agnostic() {
    let hash: PersistentHashSet<u32> = collect_set(100);
    let tree: PersistentTreeSet<u32> = collect_set(100);
    let ordered: PersistentOrderedSet<u32> = collect_set(100);

    assert_eq!(hash.len(), 100);
    assert_eq!(tree.len(), 100);
    assert_eq!(ordered.len(), 100);

    let hash = drop_evens(&hash, 100);
    let tree = drop_evens(&tree, 100);
    let ordered = drop_evens(&ordered, 100);

    for set_len in [hash.len(), tree.len(), ordered.len()] {
        assert_eq!(set_len, 50);
    }
    assert!(hash.contains(&1));
    assert!(!tree.contains(&2));
    assert!(ordered.contains(&99));
}

/// Sums the values of `0..count` through the map contract alone.
fn sum_values<M>(count: u32) -> u32
where
    M: PersistentMap<u32, u32> + Default,
{
    let mut map = M::default();
    for key in 0..count {
        map = map.insert(key, key * 2);
    }
    (0..count).filter_map(|key| map.get(&key).copied()).sum()
}

#[rstest]
fn test_map_contract_is_backend_agnostic() {
    let expected: u32 = (0..50).map(|key| key * 2).sum();
    assert_eq!(sum_values::<PersistentHashMap<u32, u32>>(50), expected);
    assert_eq!(sum_values::<PersistentTreeMap<u32, u32>>(50), expected);
    assert_eq!(sum_values::<PersistentOrderedMap<u32, u32>>(50), expected);
}

#[rstest]
fn test_navigable_contract() {
    fn neighbors<S: NavigableSet<i32>>(set: &S) -> (Option<i32>, Option<i32>) {
        (set.higher(&15).copied(), set.lower(&15).copied())
    }

    let tree: PersistentTreeSet<i32> = [10, 15, 20].into_iter().collect();
    assert_eq!(neighbors(&tree), (Some(20), Some(10)));
}

#[rstest]
fn test_sequence_contract() {
    fn rotate<S: Sequence<i32>>(sequence: &S) -> S {
        match sequence.first() {
            Some(first) => {
                let first = *first;
                sequence.pop_front().push_back(first)
            }
            None => sequence.clone(),
        }
    }

    let list: PersistentList<i32> = (0..4).collect();
    let rotated = rotate(&list);
    assert_eq!(rotated.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 0]);
}

#[rstest]
fn test_collection_len_is_uniform() {
    fn report<C: Collection>(collection: &C) -> (usize, bool) {
        (collection.len(), collection.is_empty())
    }

    let list: PersistentList<i32> = (0..3).collect();
    let map: PersistentHashMap<u32, u32> = (0..3).map(|key| (key, key)).collect();
    assert_eq!(report(&list), (3, false));
    assert_eq!(report(&map), (3, false));
    assert_eq!(report(&PersistentTreeSet::<i32>::new()), (0, true));
}
