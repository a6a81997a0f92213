use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::BTreeMap;

#[test]
fn empty_map() {
    let map: BTreeMap<u64, u64> = BTreeMap::new();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert_eq!(map.get(&1), None);
    assert_eq!(map.iter().count(), 0);
}

#[test]
fn insert_and_get() {
    let mut map = BTreeMap::new();
    assert_eq!(map.insert(2, "b"), None);
    assert_eq!(map.insert(1, "a"), None);
    assert_eq!(map.insert(3, "c"), None);
    assert_eq!(map.get(&1), Some(&"a"));
    assert_eq!(map.get(&2), Some(&"b"));
    assert_eq!(map.get(&3), Some(&"c"));
    assert_eq!(map.get(&4), None);
    assert_eq!(map.len(), 3);
}

#[test]
fn overwrite_keeps_len() {
    let mut map = BTreeMap::new();
    assert_eq!(map.insert(7, 1), None);
    assert_eq!(map.insert(7, 2), Some(1));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&7), Some(&2));
}

#[test]
fn ascending_inserts_index_by_position() {
    let mut map = BTreeMap::new();
    for key in 1_u64..=1_000 {
        map.insert(key, key * 2);
    }
    map.check_invariants();
    assert_eq!(map.len(), 1_000);
    for offset in 0..1_000 {
        let (key, value) = map.entry_at_offset(offset);
        assert_eq!(*key, offset as u64 + 1);
        assert_eq!(*value, (offset as u64 + 1) * 2);
    }
}

#[test]
fn remove_first_drains_in_order() {
    let mut map = BTreeMap::new();
    for key in 1_u64..=1_000 {
        map.insert(key, ());
    }
    assert_eq!(map.remove_first().0, 1);
    assert_eq!(map.remove_first().0, 2);
    for expected in 3_u64..=1_000 {
        assert_eq!(map.remove_first().0, expected);
    }
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
}

#[test]
fn pop_last_drains_in_reverse() {
    let mut map = BTreeMap::new();
    for key in 0_u64..500 {
        map.insert(key, key);
    }
    for expected in (0_u64..500).rev() {
        assert_eq!(map.pop_last(), Some((expected, expected)));
    }
    assert_eq!(map.pop_last(), None);
}

#[test]
#[should_panic(expected = "empty collection")]
fn remove_first_on_empty_panics() {
    let mut map: BTreeMap<u64, u64> = BTreeMap::new();
    let _ = map.remove_first();
}

#[test]
fn remove_on_empty_returns_none() {
    let mut map: BTreeMap<u64, u64> = BTreeMap::new();
    assert_eq!(map.remove(&1), None);
}

#[test]
fn random_inserts_iterate_ascending() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut map = BTreeMap::new();
    let mut model = std::collections::BTreeMap::new();
    for _ in 0..1_000 {
        let key: u32 = rng.gen_range(0..100_000);
        let value: u32 = rng.gen_range(0..1_000);
        assert_eq!(map.insert(key, value), model.insert(key, value));
    }
    map.check_invariants();
    assert_eq!(map.len(), model.len());
    let mut previous = None;
    for ((key, value), (model_key, model_value)) in map.iter().zip(model.iter()) {
        assert_eq!(key, model_key);
        assert_eq!(value, model_value);
        if let Some(previous) = previous {
            assert!(previous < *key, "keys not strictly ascending");
        }
        previous = Some(*key);
    }
}

#[test]
fn from_iter_is_last_wins() {
    let map: BTreeMap<u32, &str> = [(1, "a"), (2, "b"), (1, "c")].into_iter().collect();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Some(&"c"));
}

#[test]
fn zero_sized_values_behave_like_a_set() {
    let mut set: BTreeMap<u32, ()> = BTreeMap::new();
    for key in [5, 1, 9, 3] {
        set.insert(key, ());
    }
    assert_eq!(set.len(), 4);
    assert!(set.contains_key(&9));
    let keys: Vec<u32> = set.keys().copied().collect();
    assert_eq!(keys, vec![1, 3, 5, 9]);
}

#[test]
fn offset_of_key_matches_iteration() {
    let mut map = BTreeMap::new();
    for key in (0_u64..100).map(|k| k * 2) {
        map.insert(key, ());
    }
    for (offset, (key, ())) in map.iter().enumerate() {
        assert_eq!(map.offset_of_key(key), Some(offset));
    }
    assert_eq!(map.offset_of_key(&1), None);
}
