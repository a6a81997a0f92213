use crate::HamtMap;

#[test]
fn empty_map() {
    let map: HamtMap<String, i32> = HamtMap::new();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert_eq!(map.get(&"missing".to_owned()), None);
}

#[test]
fn insert_and_get() {
    let mut map = HamtMap::new();
    assert_eq!(map.insert(1, "a"), None);
    assert_eq!(map.insert(2, "b"), None);
    assert_eq!(map.insert(3, "c"), None);
    assert_eq!(map.get(&2), Some(&"b"));
    assert_eq!(map.len(), 3);
    let entries: std::collections::HashSet<(i32, &str)> =
        map.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: std::collections::HashSet<(i32, &str)> =
        [(1, "a"), (2, "b"), (3, "c")].into_iter().collect();
    assert_eq!(entries, expected);
}

#[test]
fn get_missing_key() {
    let mut map = HamtMap::new();
    map.insert("a", 1);
    assert_eq!(map.get(&"b"), None);
    assert!(!map.contains_key(&"b"));
}

#[test]
fn overwrite_keeps_len() {
    let mut map = HamtMap::new();
    assert_eq!(map.insert("k", 1), None);
    assert_eq!(map.insert("k", 2), Some(1));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&"k"), Some(&2));
}

#[test]
fn remove_existing() {
    let mut map = HamtMap::new();
    map.insert("a", 1);
    map.insert("b", 2);
    assert_eq!(map.remove(&"a"), Some(1));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&"a"), None);
    assert_eq!(map.get(&"b"), Some(&2));
}

#[test]
fn remove_missing_returns_none() {
    let mut map = HamtMap::new();
    map.insert("a", 1);
    assert_eq!(map.remove(&"z"), None);
    assert_eq!(map.len(), 1);
}

#[test]
fn remove_on_empty_returns_none() {
    let mut map: HamtMap<u64, u64> = HamtMap::new();
    assert_eq!(map.remove(&7), None);
}

#[test]
fn remove_down_to_empty() {
    let mut map = HamtMap::new();
    for key in 0_u64..100 {
        map.insert(key, key * 10);
    }
    for key in 0_u64..100 {
        assert_eq!(map.remove(&key), Some(key * 10));
        map.check_invariants();
    }
    assert!(map.is_empty());
}

#[test]
fn many_inserts_survive_invariants() {
    let mut map = HamtMap::new();
    for key in 0_u64..10_000 {
        map.insert(key, key);
    }
    map.check_invariants();
    assert_eq!(map.len(), 10_000);
    for key in 0_u64..10_000 {
        assert_eq!(map.get(&key), Some(&key));
    }
}

#[test]
fn iteration_yields_each_entry_once() {
    let mut map = HamtMap::new();
    for key in 0_u32..500 {
        map.insert(key, ());
    }
    let mut seen = std::collections::HashSet::new();
    for (key, ()) in &map {
        assert!(seen.insert(*key), "key {key} yielded twice");
    }
    assert_eq!(seen.len(), 500);
    assert_eq!(map.iter().len(), 500);
}

#[test]
fn from_unique_entries_builds() {
    let map = HamtMap::<u32, &str>::from_unique_entries([(1, "a"), (2, "b")]);
    assert_eq!(map.len(), 2);
    assert_eq!(map[&1], "a");
}

#[test]
#[should_panic(expected = "duplicate key")]
fn from_unique_entries_rejects_repeats() {
    let _ = HamtMap::<u32, &str>::from_unique_entries([(1, "a"), (1, "b")]);
}

#[test]
fn from_keys_values_pairs_up() {
    let map = HamtMap::<&str, u32>::from_keys_values(["x", "y"], [1, 2]);
    assert_eq!(map[&"x"], 1);
    assert_eq!(map[&"y"], 2);
}

#[test]
#[should_panic(expected = "equal length")]
fn from_keys_values_rejects_mismatched_lengths() {
    let _ = HamtMap::<&str, u32>::from_keys_values(["x", "y"], [1]);
}
