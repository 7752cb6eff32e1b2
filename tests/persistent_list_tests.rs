//! Behavioral and property-based tests for `PersistentList`.

use canopy::PersistentList;
use proptest::prelude::*;
use rstest::rstest;
use std::collections::VecDeque;

#[rstest]
fn test_sequence_contract() {
    let list = PersistentList::new()
        .push_back("b")
        .push_back("c")
        .push_front("a");

    assert_eq!(list.len(), 3);
    assert_eq!(list.first(), Some(&"a"));
    assert_eq!(list.last(), Some(&"c"));
    assert_eq!(list.get(1), Some(&"b"));
    assert_eq!(list.get(3), None);
}

#[rstest]
fn test_old_versions_survive() {
    let base: PersistentList<i32> = (0..5).collect();
    let shrunk = base.pop_front().pop_back();
    let grown = base.push_back(5);

    assert_eq!(base.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert_eq!(shrunk.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(
        grown.iter().copied().collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4, 5]
    );
}

#[rstest]
fn test_empty_list_accessors() {
    let empty: PersistentList<i32> = PersistentList::new();
    assert_eq!(empty.first(), None);
    assert_eq!(empty.last(), None);
    assert!(empty.pop_front().is_empty());
}

// =============================================================================
// Differential laws against VecDeque
// =============================================================================

#[derive(Clone, Debug)]
enum Operation {
    PushFront(i32),
    PushBack(i32),
    PopFront,
    PopBack,
}

fn arbitrary_operations() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(
        prop_oneof![
            any::<i32>().prop_map(Operation::PushFront),
            any::<i32>().prop_map(Operation::PushBack),
            Just(Operation::PopFront),
            Just(Operation::PopBack),
        ],
        0..200,
    )
}

proptest! {
    #[test]
    fn prop_differential_against_vecdeque(operations in arbitrary_operations()) {
        let mut subject: PersistentList<i32> = PersistentList::new();
        let mut model: VecDeque<i32> = VecDeque::new();

        for operation in operations {
            match operation {
                Operation::PushFront(element) => {
                    subject = subject.push_front(element);
                    model.push_front(element);
                }
                Operation::PushBack(element) => {
                    subject = subject.push_back(element);
                    model.push_back(element);
                }
                Operation::PopFront => {
                    subject = subject.pop_front();
                    model.pop_front();
                }
                Operation::PopBack => {
                    subject = subject.pop_back();
                    model.pop_back();
                }
            }
            prop_assert_eq!(subject.first(), model.front());
            prop_assert_eq!(subject.last(), model.back());
        }

        prop_assert_eq!(subject.len(), model.len());
        let observed: Vec<i32> = subject.iter().copied().collect();
        let expected: Vec<i32> = model.iter().copied().collect();
        prop_assert_eq!(observed, expected);
    }

    #[test]
    fn prop_roundtrip_through_iterator(elements in prop::collection::vec(any::<i32>(), 0..100)) {
        let list: PersistentList<i32> = elements.iter().copied().collect();
        let observed: Vec<i32> = list.iter().copied().collect();
        prop_assert_eq!(observed, elements);
    }
}
