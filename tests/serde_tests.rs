#![cfg(feature = "serde")]
//! Logical serialization round-trips.
//!
//! Containers persist as their flat entry sequence, never their internal
//! node shape; deserialization rebuilds the structure by bulk insertion.

use canopy::{
    PersistentHashMap, PersistentHashSet, PersistentList, PersistentOrderedMap,
    PersistentOrderedSet, PersistentTreeMap, PersistentTreeSet,
};
use rstest::rstest;

#[rstest]
fn test_hashmap_roundtrip() {
    let map: PersistentHashMap<String, i32> =
        (0..100).map(|index| (index.to_string(), index)).collect();
    let json = serde_json::to_string(&map).expect("serializes");
    let back: PersistentHashMap<String, i32> = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(back, map);
}

#[rstest]
fn test_treemap_roundtrip_preserves_order() {
    let map: PersistentTreeMap<i32, String> =
        (0..50).map(|index| (index, index.to_string())).collect();
    let json = serde_json::to_string(&map).expect("serializes");
    let back: PersistentTreeMap<i32, String> = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(back, map);

    let keys: Vec<i32> = back.keys().copied().collect();
    let expected: Vec<i32> = (0..50).collect();
    assert_eq!(keys, expected);
}

#[rstest]
fn test_set_roundtrips() {
    let hash_set: PersistentHashSet<i32> = (0..100).collect();
    let json = serde_json::to_string(&hash_set).expect("serializes");
    let back: PersistentHashSet<i32> = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(back, hash_set);

    let tree_set: PersistentTreeSet<i32> = (0..100).rev().collect();
    let json = serde_json::to_string(&tree_set).expect("serializes");
    let back: PersistentTreeSet<i32> = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(back, tree_set);
}

#[rstest]
fn test_tree_set_serializes_sorted() {
    let set: PersistentTreeSet<i32> = [3, 1, 2].into_iter().collect();
    let json = serde_json::to_string(&set).expect("serializes");
    assert_eq!(json, "[1,2,3]");
}

#[rstest]
fn test_list_roundtrip_preserves_sequence() {
    let list: PersistentList<i32> = (0..40).collect();
    let json = serde_json::to_string(&list).expect("serializes");
    let back: PersistentList<i32> = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(back, list);
}

#[rstest]
fn test_ordered_map_roundtrip_preserves_insertion_order() {
    let map = PersistentOrderedMap::new()
        .insert("z".to_string(), 26)
        .insert("a".to_string(), 1)
        .insert("m".to_string(), 13);
    let json = serde_json::to_string(&map).expect("serializes");
    let back: PersistentOrderedMap<String, i32> =
        serde_json::from_str(&json).expect("deserializes");

    let keys: Vec<String> = back.keys().cloned().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[rstest]
fn test_ordered_set_roundtrip_preserves_insertion_order() {
    let set: PersistentOrderedSet<i32> = [9, 4, 7].into_iter().collect();
    let json = serde_json::to_string(&set).expect("serializes");
    assert_eq!(json, "[9,4,7]");
    let back: PersistentOrderedSet<i32> = serde_json::from_str(&json).expect("deserializes");
    let elements: Vec<i32> = back.iter().copied().collect();
    assert_eq!(elements, vec![9, 4, 7]);
}
