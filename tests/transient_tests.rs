//! Freeze/thaw semantics shared by every transient variant.

use canopy::prelude::*;
use rstest::rstest;

// =============================================================================
// Snapshot isolation
// =============================================================================

#[rstest]
fn test_hashmap_snapshot_is_isolated_from_later_writes() {
    let mut transient = TransientHashMap::new();
    for key in 0..200_u32 {
        transient.insert(key, key);
    }
    let snapshot = transient.persistent();

    // Writes after freezing must copy, never mutate the published nodes.
    for key in 0..200_u32 {
        transient.insert(key, key + 1_000_000);
    }
    transient.remove(&0);

    for key in 0..200_u32 {
        assert_eq!(snapshot.get(&key), Some(&key));
    }
    assert_eq!(snapshot.len(), 200);
}

#[rstest]
fn test_hashmap_repeated_freeze_produces_independent_snapshots() {
    let mut transient = TransientHashMap::new();
    let mut snapshots = Vec::new();
    for round in 0..5_u32 {
        for key in 0..20_u32 {
            transient.insert(key, round);
        }
        snapshots.push(transient.persistent());
    }

    for (round, snapshot) in snapshots.iter().enumerate() {
        let round = u32::try_from(round).unwrap();
        for key in 0..20_u32 {
            assert_eq!(snapshot.get(&key), Some(&round));
        }
    }
}

#[rstest]
fn test_thaw_is_cheap_and_lazy() {
    let map: PersistentHashMap<u32, u32> = (0..100).map(|key| (key, key)).collect();

    // A transient that is never written through changes nothing.
    let mut idle = map.transient();
    let unchanged = idle.persistent();
    assert_eq!(unchanged, map);

    // A written transient diverges only where it wrote.
    let mut busy = map.transient();
    busy.insert(7, 700);
    let diverged = busy.persistent();
    assert_eq!(diverged.get(&7), Some(&700));
    assert_eq!(map.get(&7), Some(&7));
    assert_eq!(diverged.get(&8), Some(&8));
}

#[rstest]
fn test_treemap_snapshot_is_isolated() {
    let mut transient = TransientTreeMap::new();
    for key in 0..100_i32 {
        transient.insert(key, key);
    }
    let snapshot = transient.persistent();
    for key in 0..100_i32 {
        transient.remove(&key);
    }
    assert!(transient.is_empty());
    assert_eq!(snapshot.len(), 100);
}

#[rstest]
fn test_list_snapshot_is_isolated() {
    let mut transient = TransientList::new();
    transient.push_back(1);
    transient.push_back(2);
    let snapshot = transient.persistent();
    transient.push_back(3);
    transient.pop_front();

    assert_eq!(snapshot.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
}

// =============================================================================
// Capability traits drive the conversions generically
// =============================================================================

fn roundtrip_via_transient<M>(map: &M) -> M
where
    M: PersistentMap<u32, u32> + ToTransient,
    M::Transient: ToPersistent<Persistent = M>,
{
    // Round-trip through the transient type without knowing the backend.
    let mut transient = map.transient();
    transient.persistent()
}

#[rstest]
fn test_conversions_are_uniform_across_backends() {
    let hash: PersistentHashMap<u32, u32> = (0..10).map(|key| (key, key)).collect();
    let tree: PersistentTreeMap<u32, u32> = (0..10).map(|key| (key, key)).collect();
    let ordered: PersistentOrderedMap<u32, u32> = (0..10).map(|key| (key, key)).collect();

    assert_eq!(roundtrip_via_transient(&hash), hash);
    assert_eq!(roundtrip_via_transient(&tree), tree);
    assert_eq!(roundtrip_via_transient(&ordered), ordered);
}

// =============================================================================
// Identity-preserving no-ops through the trait surface
// =============================================================================

#[rstest]
fn test_noop_bulk_updates_return_equal_receiver() {
    let set: PersistentHashSet<u32> = (0..10).collect();
    let same = PersistentSet::insert_all(&set, std::iter::empty());
    assert_eq!(same, set);

    let absent = [99_u32, 100];
    let same = PersistentSet::remove_all(&set, absent.iter());
    assert_eq!(same, set);
}
