//! Behavioral tests for the insertion-ordered map and set.

use canopy::{PersistentOrderedMap, PersistentOrderedSet};
use rstest::rstest;

#[rstest]
fn test_map_iterates_in_insertion_order() {
    let map = PersistentOrderedMap::new()
        .insert("z", 26)
        .insert("a", 1)
        .insert("m", 13);
    let keys: Vec<&str> = map.keys().copied().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[rstest]
fn test_map_value_update_keeps_position() {
    let map = PersistentOrderedMap::new()
        .insert("z", 26)
        .insert("a", 1)
        .insert("z", 260);
    let entries: Vec<(&str, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(entries, vec![("z", 260), ("a", 1)]);
}

#[rstest]
fn test_map_remove_and_reinsert_moves_to_end() {
    let map = PersistentOrderedMap::new()
        .insert(1, 'a')
        .insert(2, 'b')
        .insert(3, 'c');
    let moved = map.remove(&1).insert(1, 'a');
    let keys: Vec<i32> = moved.keys().copied().collect();
    assert_eq!(keys, vec![2, 3, 1]);
}

#[rstest]
fn test_map_sequence_endpoints() {
    let map = PersistentOrderedMap::new().insert(1, 'a').insert(2, 'b');
    assert_eq!(map.first(), Some((&1, &'a')));
    assert_eq!(map.last(), Some((&2, &'b')));

    let trimmed = map.remove_first();
    assert_eq!(trimmed.first(), Some((&2, &'b')));

    // The old version keeps its endpoints.
    assert_eq!(map.first(), Some((&1, &'a')));
}

#[rstest]
fn test_map_long_sequence_survives_interior_removals() {
    let mut map: PersistentOrderedMap<u32, u32> = PersistentOrderedMap::new();
    for key in 0..200 {
        map = map.insert(key, key);
    }
    for key in (0..200).filter(|key| key % 2 == 1) {
        map = map.remove(&key);
    }
    let keys: Vec<u32> = map.keys().copied().collect();
    let expected: Vec<u32> = (0..200).filter(|key| key % 2 == 0).collect();
    assert_eq!(keys, expected);
}

#[rstest]
fn test_set_insertion_order_and_dedup() {
    let set = PersistentOrderedSet::new()
        .insert("c")
        .insert("a")
        .insert("b")
        .insert("a");
    let elements: Vec<&str> = set.iter().copied().collect();
    assert_eq!(elements, vec!["c", "a", "b"]);
    assert_eq!(set.len(), 3);
}

#[rstest]
fn test_set_sequence_removal() {
    let set: PersistentOrderedSet<i32> = [4, 2, 9].into_iter().collect();
    assert_eq!(set.first(), Some(&4));
    assert_eq!(set.last(), Some(&9));
    assert_eq!(set.remove_first().first(), Some(&2));
    assert_eq!(set.remove_last().last(), Some(&2));
}

#[rstest]
fn test_empty_ordered_accessors() {
    let map: PersistentOrderedMap<i32, i32> = PersistentOrderedMap::new();
    assert_eq!(map.first(), None);
    assert_eq!(map.last(), None);

    let set: PersistentOrderedSet<i32> = PersistentOrderedSet::new();
    assert_eq!(set.first(), None);
    assert!(set.remove_first().is_empty());
}
