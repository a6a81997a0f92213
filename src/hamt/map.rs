//! Persistent hash map facade.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops;

use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};

use crate::effect::EffectRecord;
use crate::error;
use crate::hamt::iter::{Iter, Keys, Values};
use crate::hamt::node::{HamtNode, NodePtr};
use crate::hamt::ops::get::{get_recursive, index_of_recursive, item_at_recursive};
use crate::hamt::ops::insert::update_recursive;
use crate::hamt::ops::remove::remove_recursive;
use crate::hash_path::{HashPath, hash_one};

/// Mixing seed applied to key hashes in the commutative map hash
/// (golden-ratio constant).
const KEY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Mixing seed applied to value hashes (large prime).
const VALUE_SEED: u64 = 0x517C_C1B7_2722_0A95;

/// A persistent hash map backed by a 32-way hash array mapped trie.
///
/// Cloning is O(1): clones share structure, and every mutation copies
/// only the path it touches, after checking ownership at each node. The
/// fluent [`inserting`](Self::inserting) / [`removing`](Self::removing)
/// variants return a new map and leave `self` unobservably unchanged.
///
/// Two maps compare equal when they hold the same entries, whatever the
/// insertion order; the [`Hash`] impl is commutative to match.
pub struct HamtMap<K, V, P: SharedPointerKind = RcK> {
    root: Option<NodePtr<K, V, P>>,
}

/// [`HamtMap`] over atomically reference-counted nodes; `Send + Sync`
/// when `K` and `V` are.
pub type HamtMapSync<K, V> = HamtMap<K, V, ArcK>;

// ---------------------------------------------------------------------------
// Construction & accessors — no trait bounds
// ---------------------------------------------------------------------------

impl<K, V> HamtMap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }
}

impl<K, V> HamtMapSync<K, V> {
    /// Creates an empty map that can cross threads when `K` and `V`
    /// can.
    #[must_use]
    pub const fn new_sync() -> Self {
        Self { root: None }
    }
}

impl<K, V, P: SharedPointerKind> HamtMap<K, V, P> {
    /// Returns the number of key-value pairs. O(1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.count())
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Entry at `position` in iteration order.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`.
    #[must_use]
    pub fn entry_at(&self, position: usize) -> (&K, &V) {
        if position >= self.len() {
            error::out_of_bounds(position, self.len());
        }
        let root = self.root.as_ref().expect("non-empty");
        let (key, value) = item_at_recursive(root, position);
        (key, value)
    }

    /// Returns an iterator over `(&K, &V)` pairs.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter::new(self.root.as_ref())
    }

    /// Returns an iterator over the keys.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V, P> {
        Keys(self.iter())
    }

    /// Returns an iterator over the values.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V, P> {
        Values(self.iter())
    }
}

// ---------------------------------------------------------------------------
// Read operations — K: Hash + Eq
// ---------------------------------------------------------------------------

impl<K: Hash + Eq, V, P: SharedPointerKind> HamtMap<K, V, P> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let root = self.root.as_ref()?;
        get_recursive(root, key, HashPath::new(key)).map(|(_, value)| value)
    }

    /// Returns the stored key-value pair for `key`.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let root = self.root.as_ref()?;
        get_recursive(root, key, HashPath::new(key)).map(|(k, v)| (k, v))
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Position of `key` in iteration order, if present.
    ///
    /// The inverse of [`entry_at`](Self::entry_at).
    #[must_use]
    pub fn index_of(&self, key: &K) -> Option<usize> {
        let root = self.root.as_ref()?;
        index_of_recursive(root, key, HashPath::new(key))
    }
}

// ---------------------------------------------------------------------------
// Write operations — K: Hash + Eq + Clone, V: Clone
// ---------------------------------------------------------------------------

impl<K: Hash + Eq + Clone, V: Clone, P: SharedPointerKind> HamtMap<K, V, P> {
    /// Inserts a key-value pair.
    ///
    /// Returns `None` if the key was new, or `Some(old_value)` if an
    /// existing value was replaced. Mutates in place when this map is
    /// the sole owner of the touched path.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let path = HashPath::new(&key);
        match &mut self.root {
            Some(root) => {
                let mut effect = EffectRecord::new();
                update_recursive(root, key, value, path, &mut effect);
                effect.take_previous()
            }
            None => {
                self.root = Some(SharedPointer::new(HamtNode::single_item(
                    path.current_bucket(),
                    (key, value),
                )));
                None
            }
        }
    }

    /// Removes a key, returning its value, or `None` if absent.
    ///
    /// A miss performs no copying even on a shared tree.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let path = HashPath::new(key);
        let root = self.root.as_mut()?;
        get_recursive(root, key, path)?;
        if root.count() == 1 {
            let (_, value) = root.lone_item().clone();
            self.root = None;
            return Some(value);
        }
        let mut effect = EffectRecord::new();
        remove_recursive(root, key, path, &mut effect);
        effect.take_previous()
    }

    /// Persistent insert: returns the updated map; `self` is unchanged.
    #[must_use]
    pub fn inserting(&self, key: K, value: V) -> Self {
        let mut updated = self.clone();
        updated.insert(key, value);
        updated
    }

    /// Persistent remove: returns the updated map; `self` is unchanged.
    #[must_use]
    pub fn removing(&self, key: &K) -> Self {
        let mut updated = self.clone();
        updated.remove(key);
        updated
    }

    /// Builds a map from entries whose keys must all be distinct.
    ///
    /// # Panics
    ///
    /// Panics when a key repeats.
    #[must_use]
    pub fn from_unique_entries<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        let mut map = Self::default();
        for (key, value) in entries {
            if map.insert(key, value).is_some() {
                error::duplicate_key();
            }
        }
        map
    }

    /// Builds a map by pairing `keys` with `values`.
    ///
    /// # Panics
    ///
    /// Panics when the sequences differ in length or a key repeats.
    #[must_use]
    pub fn from_keys_values<IK, IV>(keys: IK, values: IV) -> Self
    where
        IK: IntoIterator<Item = K>,
        IV: IntoIterator<Item = V>,
    {
        let mut map = Self::default();
        let mut keys = keys.into_iter();
        let mut values = values.into_iter();
        loop {
            match (keys.next(), values.next()) {
                (Some(key), Some(value)) => {
                    if map.insert(key, value).is_some() {
                        error::duplicate_key();
                    }
                }
                (None, None) => return map,
                _ => panic!("from_keys_values requires sequences of equal length"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, P: SharedPointerKind> Clone for HamtMap<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<K, V, P: SharedPointerKind> Default for HamtMap<K, V, P> {
    fn default() -> Self {
        Self { root: None }
    }
}

#[cfg(test)]
impl<K: Hash, V, P: SharedPointerKind> HamtMap<K, V, P> {
    /// Test hook: asserts every structural invariant of the trie.
    pub(crate) fn check_invariants(&self) {
        if let Some(root) = &self.root {
            root.check_invariants(0);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P: SharedPointerKind> fmt::Debug for HamtMap<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq + Clone, V: Clone, P: SharedPointerKind> Extend<(K, V)> for HamtMap<K, V, P> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone, P: SharedPointerKind> FromIterator<(K, V)>
    for HamtMap<K, V, P>
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V, P: SharedPointerKind> ops::Index<&K> for HamtMap<K, V, P> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, P: SharedPointerKind> IntoIterator for &'a HamtMap<K, V, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    fn into_iter(self) -> Iter<'a, K, V, P> {
        self.iter()
    }
}

impl<K: Hash + Eq, V: PartialEq, P: SharedPointerKind> PartialEq for HamtMap<K, V, P> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => std::ptr::eq(&**a, &**b) || node_eq(a, b),
            _ => false,
        }
    }
}

impl<K: Hash + Eq, V: Eq, P: SharedPointerKind> Eq for HamtMap<K, V, P> {}

impl<K: Hash + Eq, V: Hash, P: SharedPointerKind> Hash for HamtMap<K, V, P> {
    /// Commutative: the XOR of per-entry mixed hashes, so maps equal
    /// under [`PartialEq`] hash equal regardless of insertion order.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut acc = 0_u64;
        for (key, value) in self.iter() {
            acc ^= entry_hash(hash_one(key), hash_one(value));
        }
        state.write_u64(acc);
        state.write_usize(self.len());
    }
}

/// Mixes one entry's key and value hashes into a single word.
const fn entry_hash(key_hash: u64, value_hash: u64) -> u64 {
    key_hash.wrapping_mul(KEY_SEED) ^ value_hash.wrapping_mul(VALUE_SEED)
}

/// Structural equality; collision nodes compare as unordered multisets.
fn node_eq<K, V, P>(a: &HamtNode<K, V, P>, b: &HamtNode<K, V, P>) -> bool
where
    K: Eq,
    V: PartialEq,
    P: SharedPointerKind,
{
    match (a, b) {
        (
            HamtNode::Bitmap {
                item_map: ia,
                child_map: ca,
                items: items_a,
                children: children_a,
                ..
            },
            HamtNode::Bitmap {
                item_map: ib,
                child_map: cb,
                items: items_b,
                children: children_b,
                ..
            },
        ) => {
            ia == ib
                && ca == cb
                && items_a == items_b
                && children_a
                    .iter()
                    .zip(children_b)
                    .all(|(x, y)| std::ptr::eq(&**x, &**y) || node_eq(x, y))
        }
        (
            HamtNode::Collision {
                hash: ha,
                items: items_a,
            },
            HamtNode::Collision {
                hash: hb,
                items: items_b,
            },
        ) => {
            ha == hb
                && items_a.len() == items_b.len()
                && items_a
                    .iter()
                    .all(|(k, v)| items_b.iter().any(|(k2, v2)| k == k2 && v == v2))
        }
        _ => false,
    }
}
