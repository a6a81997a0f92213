use std::hash::{Hash, Hasher};

use crate::HamtMap;

/// A key type with a controllable hash value for testing collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CollidingKey {
    id: u32,
    forced_hash: u64,
}

impl CollidingKey {
    const fn new(id: u32, hash: u64) -> Self {
        Self {
            id,
            forced_hash: hash,
        }
    }
}

impl Hash for CollidingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.forced_hash);
    }
}

#[test]
fn four_fully_colliding_keys() {
    let keys: Vec<CollidingKey> = (0..4).map(|id| CollidingKey::new(id, 0xDEAD_BEEF)).collect();
    let mut map = HamtMap::new();
    for (value, key) in keys.iter().enumerate() {
        map.insert(key.clone(), value);
    }
    assert_eq!(map.len(), 4);
    for (value, key) in keys.iter().enumerate() {
        assert_eq!(map.get(key), Some(&value));
    }
    map.check_invariants();

    assert_eq!(map.remove(&keys[1]), Some(1));
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&keys[1]), None);
    assert_eq!(map.get(&keys[3]), Some(&3));
    map.check_invariants();
}

#[test]
fn overwrite_inside_collision() {
    let a = CollidingKey::new(1, 0xBBBB);
    let b = CollidingKey::new(2, 0xBBBB);
    let mut map = HamtMap::new();
    map.insert(a.clone(), "old");
    map.insert(b.clone(), "other");
    assert_eq!(map.insert(a.clone(), "new"), Some("old"));
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&a), Some(&"new"));
}

/// A collision node and ordinary entries coexist in one trie.
#[test]
fn collision_beside_normal_entries() {
    let colliding_a = CollidingKey::new(1, 0xD00D);
    let colliding_b = CollidingKey::new(2, 0xD00D);
    let lone = CollidingKey::new(3, 0xF00D);

    let mut map = HamtMap::new();
    map.insert(colliding_a.clone(), "a");
    map.insert(colliding_b.clone(), "b");
    map.insert(lone.clone(), "c");

    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&colliding_a), Some(&"a"));
    assert_eq!(map.get(&colliding_b), Some(&"b"));
    assert_eq!(map.get(&lone), Some(&"c"));
    map.check_invariants();
}

/// Removing down to one survivor dissolves the collision node.
#[test]
fn collision_shrinks_to_single_entry() {
    let keys: Vec<CollidingKey> = (0..3).map(|id| CollidingKey::new(id, 0xCCCC)).collect();
    let mut map = HamtMap::new();
    for key in &keys {
        map.insert(key.clone(), key.id);
    }
    map.remove(&keys[0]);
    map.remove(&keys[2]);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&keys[1]), Some(&1));
    map.check_invariants();

    map.remove(&keys[1]);
    assert!(map.is_empty());
}

/// Keys whose hashes agree on several low-order buckets build a chain
/// of one-child nodes, and removal unwinds it.
#[test]
fn shared_prefix_chain_collapses_on_remove() {
    // Find two u64 keys whose hashes share the low 10 bits (two trie
    // levels); the pigeonhole principle guarantees one in the range.
    let mut seen: std::collections::HashMap<u64, u64> = std::collections::HashMap::new();
    let mut pair = None;
    for key in 0_u64..100_000 {
        let low = crate::hash_path::hash_one(&key) & 0x3FF;
        if let Some(&other) = seen.get(&low) {
            pair = Some((other, key));
            break;
        }
        seen.insert(low, key);
    }
    let (a, b) = pair.expect("a shared-prefix pair exists in the range");

    let mut map = HamtMap::new();
    map.insert(a, "a");
    map.insert(b, "b");
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&a), Some(&"a"));
    assert_eq!(map.get(&b), Some(&"b"));
    map.check_invariants();

    assert_eq!(map.remove(&a), Some("a"));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&b), Some(&"b"));
    map.check_invariants();
}

/// Maps with identical contents compare equal even when the collision
/// entries arrived in different orders.
#[test]
fn collision_equality_is_order_independent() {
    let keys: Vec<CollidingKey> = (0..4).map(|id| CollidingKey::new(id, 0xEEEE)).collect();
    let mut forward = HamtMap::new();
    for key in &keys {
        forward.insert(key.clone(), key.id);
    }
    let mut backward = HamtMap::new();
    for key in keys.iter().rev() {
        backward.insert(key.clone(), key.id);
    }
    assert_eq!(forward, backward);
}
