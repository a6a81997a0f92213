use crate::BTreeMap;

fn sample_map(len: u64) -> BTreeMap<u64, u64> {
    let mut map = BTreeMap::with_capacity(4);
    for key in 0..len {
        map.insert(key * 2, key);
    }
    map
}

#[test]
fn index_at_offset_roundtrips() {
    let map = sample_map(200);
    for offset in 0..map.len() {
        let index = map.index_at_offset(offset);
        assert_eq!(index.offset(), offset);
        assert!(!index.is_end());
        let (key, _) = map.entry_at(&index);
        assert_eq!(*key, offset as u64 * 2);
    }
    assert!(map.index_at_offset(map.len()).is_end());
}

#[test]
fn index_after_walks_the_whole_map() {
    let map = sample_map(150);
    let mut index = map.start_index();
    let mut walked = Vec::new();
    while !index.is_end() {
        walked.push(*map.entry_at(&index).0);
        index = map.index_after(&index);
    }
    let iterated: Vec<u64> = map.keys().copied().collect();
    assert_eq!(walked, iterated);
}

#[test]
fn index_before_walks_backward() {
    let map = sample_map(80);
    let mut index = map.end_index();
    let mut walked = Vec::new();
    while index.offset() > 0 {
        index = map.index_before(&index);
        walked.push(*map.entry_at(&index).0);
    }
    walked.reverse();
    assert_eq!(walked, map.keys().copied().collect::<Vec<u64>>());
}

#[test]
fn offset_by_and_distance_agree() {
    let map = sample_map(100);
    let start = map.index_at_offset(10);
    let moved = map.offset_by(&start, 25);
    assert_eq!(moved.offset(), 35);
    assert_eq!(map.distance(&start, &moved), 25);
    assert_eq!(map.distance(&moved, &start), -25);
    let back = map.offset_by(&moved, -25);
    assert_eq!(back, start);
}

#[test]
fn offset_by_limited_by_stops_at_the_limit() {
    let map = sample_map(50);
    let start = map.index_at_offset(10);
    let limit = map.index_at_offset(20);
    assert!(map.offset_by_limited_by(&start, 15, &limit).is_none());
    let reached = map.offset_by_limited_by(&start, 10, &limit);
    assert_eq!(reached.map(|index| index.offset()), Some(20));
    let backward_limit = map.index_at_offset(5);
    assert!(map.offset_by_limited_by(&start, -10, &backward_limit).is_none());
    assert!(map.offset_by_limited_by(&start, -5, &backward_limit).is_some());
}

#[test]
fn start_and_last_index_for_key() {
    let map = sample_map(100);
    // Key 40 is present at offset 20.
    assert_eq!(map.start_index_for(&40).offset(), 20);
    assert_eq!(map.last_index_for(&40).offset(), 21);
    // Key 41 is absent; both bracket the gap.
    assert_eq!(map.start_index_for(&41).offset(), 21);
    assert_eq!(map.last_index_for(&41).offset(), 21);
    // Below and above every key.
    assert_eq!(map.start_index_for(&u64::MIN).offset(), 0);
    assert_eq!(map.start_index_for(&u64::MAX).offset(), map.len());
}

#[test]
fn remove_at_index_removes_the_pointee() {
    let mut map = sample_map(60);
    let index = map.index_at_offset(30);
    let (key, _) = map.remove_at_index(&index);
    assert_eq!(key, 60);
    assert_eq!(map.len(), 59);
    assert!(!map.contains_key(&60));
    map.check_invariants();
}

#[test]
#[should_panic(expected = "invalid index")]
fn mutation_invalidates_indices() {
    let mut map = sample_map(20);
    let index = map.index_at_offset(5);
    map.insert(999, 999);
    let _ = map.entry_at(&index);
}

#[test]
#[should_panic(expected = "invalid index")]
fn foreign_index_is_rejected() {
    let map_a = sample_map(20);
    let map_b = sample_map(30);
    let index = map_a.index_at_offset(5);
    let _ = map_b.entry_at(&index);
}

#[test]
#[should_panic(expected = "invalid index")]
fn clone_mutation_invalidates_only_the_clone() {
    let map = sample_map(20);
    let mut copy = map.clone();
    let index = map.index_at_offset(5);
    // Still valid against the original, which is untouched.
    assert_eq!(*map.entry_at(&index).0, 10);
    copy.remove(&10);
    let _ = copy.entry_at(&index);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn index_past_the_end_panics() {
    let map = sample_map(10);
    let _ = map.index_at_offset(11);
}
