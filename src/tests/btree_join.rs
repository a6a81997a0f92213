use crate::BTreeMap;

fn range_map(range: std::ops::Range<u64>) -> BTreeMap<u64, u64> {
    let mut map = BTreeMap::with_capacity(4);
    for key in range {
        map.insert(key, key);
    }
    map
}

fn assert_joined(left: std::ops::Range<u64>, separator: u64, right: std::ops::Range<u64>) {
    let expected: Vec<u64> = left
        .clone()
        .chain(std::iter::once(separator))
        .chain(right.clone())
        .collect();
    let joined = BTreeMap::joined(range_map(left), (separator, separator), range_map(right));
    joined.check_invariants();
    assert_eq!(joined.len(), expected.len());
    assert!(joined.keys().copied().eq(expected));
}

#[test]
fn join_equal_depths() {
    assert_joined(0..40, 50, 100..140);
}

#[test]
fn join_left_deeper() {
    assert_joined(0..500, 600, 1_000..1_020);
}

#[test]
fn join_right_deeper() {
    assert_joined(0..20, 600, 1_000..1_500);
}

#[test]
fn join_tiny_trees() {
    assert_joined(0..1, 5, 10..11);
    assert_joined(0..3, 5, 10..12);
}

#[test]
fn join_with_empty_side() {
    let joined = BTreeMap::joined(range_map(0..0), (5, 5), range_map(10..20));
    assert_eq!(joined.len(), 11);
    assert_eq!(joined.get(&5), Some(&5));
    joined.check_invariants();

    let joined = BTreeMap::joined(range_map(0..10), (50, 50), range_map(0..0));
    assert_eq!(joined.len(), 11);
    assert_eq!(*joined.entry_at_offset(10).0, 50);
    joined.check_invariants();
}

#[test]
fn join_both_empty() {
    let joined = BTreeMap::joined(range_map(0..0), (1, 1), range_map(0..0));
    assert_eq!(joined.len(), 1);
    assert_eq!(joined.get(&1), Some(&1));
}

#[test]
fn joined_tree_accepts_further_mutation() {
    let mut joined = BTreeMap::joined(range_map(0..300), (400, 400), range_map(500..550));
    for key in 600..700 {
        joined.insert(key, key);
    }
    for key in (0..300).step_by(3) {
        assert_eq!(joined.remove(&key), Some(key));
    }
    joined.check_invariants();
}
