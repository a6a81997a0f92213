//! Sorted map facade.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{self, Range};

use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};

use crate::btree::cursor::Cursor;
use crate::btree::index::BTreeIndex;
use crate::btree::iter::{Iter, Keys, Values};
use crate::btree::node::{
    BTreeNode, MIN_CAPACITY, NodePtr, default_internal_capacity, default_leaf_capacity,
};
use crate::btree::ops::get::{entry_at_offset, find, offset_of_end, offset_of_start};
use crate::btree::ops::insert::{UpdateResult, update_any_value};
use crate::btree::ops::join::{concatenate, join_left, join_right};
use crate::btree::ops::remove::{pop_first, pop_last, remove_any, remove_at_offset};
use crate::effect::EffectRecord;
use crate::error;
use crate::path_stack::PathStack;

/// A sorted map backed by an order-k B-tree with cached subtree counts.
///
/// Nodes carry fixed-capacity buffers and are reference-counted:
/// [`Clone`] is O(1) and shares every node, after which mutation on
/// either map copies exactly the shared nodes along the touched path
/// (spine copy-on-write). The cached counts make positional access —
/// [`index_at_offset`](Self::index_at_offset),
/// [`remove_at_offset`](Self::remove_at_offset) — O(log n).
///
/// Every mutation bumps an internal version; a [`BTreeIndex`] issued
/// earlier then panics on use instead of silently pointing elsewhere.
pub struct BTreeMap<K, V, P: SharedPointerKind = RcK> {
    pub(crate) root: Option<NodePtr<K, V, P>>,
    pub(crate) version: u64,
    pub(crate) leaf_capacity: usize,
    pub(crate) internal_capacity: usize,
}

/// [`BTreeMap`] over atomically reference-counted nodes; `Send + Sync`
/// when `K` and `V` are.
pub type BTreeMapSync<K, V> = BTreeMap<K, V, ArcK>;

// ---------------------------------------------------------------------------
// Construction & accessors
// ---------------------------------------------------------------------------

impl<K, V> BTreeMap<K, V> {
    /// Creates an empty map with capacity defaults sized to `K`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            version: 0,
            leaf_capacity: default_leaf_capacity::<K>(),
            internal_capacity: default_internal_capacity::<K>(),
        }
    }
}

impl<K, V> BTreeMapSync<K, V> {
    /// Creates an empty map that can cross threads when `K` and `V`
    /// can.
    #[must_use]
    pub const fn new_sync() -> Self {
        Self {
            root: None,
            version: 0,
            leaf_capacity: default_leaf_capacity::<K>(),
            internal_capacity: default_internal_capacity::<K>(),
        }
    }
}

impl<K, V, P: SharedPointerKind> BTreeMap<K, V, P> {
    /// Creates an empty map whose nodes all hold up to `capacity` keys.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 4`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_node_capacities(capacity, capacity)
    }

    /// Creates an empty map with distinct leaf and internal capacities.
    ///
    /// # Panics
    ///
    /// Panics if either capacity is below 4.
    #[must_use]
    pub fn with_node_capacities(leaf_capacity: usize, internal_capacity: usize) -> Self {
        assert!(
            leaf_capacity >= MIN_CAPACITY && internal_capacity >= MIN_CAPACITY,
            "node capacity must be at least {MIN_CAPACITY}",
        );
        Self {
            root: None,
            version: 0,
            leaf_capacity,
            internal_capacity,
        }
    }

    /// Returns the number of entries. O(1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.subtree_count)
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The mutation counter stamped into issued indices.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns an iterator over `(&K, &V)` pairs in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter::new(self.root.as_ref())
    }

    /// Returns an iterator over the keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V, P> {
        Keys(self.iter())
    }

    /// Returns an iterator over the values in ascending key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V, P> {
        Values(self.iter())
    }

    /// Entry at in-order `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.len()`.
    #[must_use]
    pub fn entry_at_offset(&self, offset: usize) -> (&K, &V) {
        if offset >= self.len() {
            error::out_of_bounds(offset, self.len());
        }
        entry_at_offset(self.root.as_ref().expect("non-empty"), offset)
    }

    fn root_id(&self) -> usize {
        self.root
            .as_ref()
            .map_or(0, |root| std::ptr::from_ref::<BTreeNode<K, V, P>>(&**root) as usize)
    }

    fn assert_valid(&self, index: &BTreeIndex) {
        if index.root_id != self.root_id() || index.version != self.version {
            error::invalid_index();
        }
    }
}

// ---------------------------------------------------------------------------
// Read operations — K: Ord
// ---------------------------------------------------------------------------

impl<K: Ord, V, P: SharedPointerKind> BTreeMap<K, V, P> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        find(self.root.as_ref()?, key).map(|(_, value)| value)
    }

    /// Returns the stored key-value pair for `key`.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        find(self.root.as_ref()?, key)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// In-order offset of `key`, if present.
    #[must_use]
    pub fn offset_of_key(&self, key: &K) -> Option<usize> {
        let root = self.root.as_ref()?;
        let offset = offset_of_start(root, key);
        if offset < root.subtree_count {
            let (stored, _) = entry_at_offset(root, offset);
            if *stored == *key {
                return Some(offset);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Index surface
// ---------------------------------------------------------------------------

impl<K, V, P: SharedPointerKind> BTreeMap<K, V, P> {
    /// Index of the entry at in-order `offset`; `self.len()` yields the
    /// end index.
    ///
    /// # Panics
    ///
    /// Panics if `offset > self.len()`.
    #[must_use]
    pub fn index_at_offset(&self, offset: usize) -> BTreeIndex {
        let len = self.len();
        if offset > len {
            error::out_of_bounds(offset, len);
        }
        let mut child_slots = PathStack::new();
        let mut slot = None;
        if offset < len {
            let mut node = &**self.root.as_ref().expect("non-empty");
            let mut remaining = offset;
            'descend: loop {
                if node.is_leaf() {
                    slot = Some(remaining as u16);
                    break;
                }
                for child_slot in 0..node.child_count() {
                    let child_entries = node.children[child_slot].subtree_count;
                    if remaining < child_entries {
                        child_slots.push_back(child_slot as u16);
                        node = &node.children[child_slot];
                        continue 'descend;
                    }
                    remaining -= child_entries;
                    if child_slot < node.element_count() {
                        if remaining == 0 {
                            slot = Some(child_slot as u16);
                            break 'descend;
                        }
                        remaining -= 1;
                    }
                }
                unreachable!("offset exceeds the subtree count");
            }
        }
        BTreeIndex {
            child_slots,
            slot,
            offset,
            root_id: self.root_id(),
            version: self.version,
        }
    }

    /// The index of the first entry; equals the end index when empty.
    #[must_use]
    pub fn start_index(&self) -> BTreeIndex {
        self.index_at_offset(0)
    }

    /// The past-the-last-entry index.
    #[must_use]
    pub fn end_index(&self) -> BTreeIndex {
        self.index_at_offset(self.len())
    }

    /// Entry at a previously issued index.
    ///
    /// # Panics
    ///
    /// Panics on a stale or foreign index, or on the end index.
    #[must_use]
    pub fn entry_at(&self, index: &BTreeIndex) -> (&K, &V) {
        self.assert_valid(index);
        let Some(slot) = index.slot else {
            error::out_of_bounds(index.offset, self.len());
        };
        let mut node = &**self.root.as_ref().expect("non-empty");
        for child_slot in index.child_slots.iter() {
            node = &node.children[usize::from(*child_slot)];
        }
        node.entry_at(usize::from(slot))
    }

    /// The index one position after `index`.
    ///
    /// # Panics
    ///
    /// Panics on a stale index or when `index` is the end index.
    #[must_use]
    pub fn index_after(&self, index: &BTreeIndex) -> BTreeIndex {
        self.assert_valid(index);
        if index.offset >= self.len() {
            error::out_of_bounds(index.offset + 1, self.len());
        }
        self.index_at_offset(index.offset + 1)
    }

    /// The index one position before `index`.
    ///
    /// # Panics
    ///
    /// Panics on a stale index or when `index` is the start index.
    #[must_use]
    pub fn index_before(&self, index: &BTreeIndex) -> BTreeIndex {
        self.assert_valid(index);
        if index.offset == 0 {
            error::out_of_bounds(0, self.len());
        }
        self.index_at_offset(index.offset - 1)
    }

    /// The index `distance` positions away from `index` (negative moves
    /// backward).
    ///
    /// # Panics
    ///
    /// Panics on a stale index or when the target leaves `[0, len]`.
    #[must_use]
    pub fn offset_by(&self, index: &BTreeIndex, distance: isize) -> BTreeIndex {
        self.assert_valid(index);
        let target = index.offset as isize + distance;
        if target < 0 || target as usize > self.len() {
            error::out_of_bounds(target.unsigned_abs(), self.len());
        }
        self.index_at_offset(target as usize)
    }

    /// Like [`offset_by`](Self::offset_by), but returns `None` instead
    /// of crossing `limit`.
    #[must_use]
    pub fn offset_by_limited_by(
        &self,
        index: &BTreeIndex,
        distance: isize,
        limit: &BTreeIndex,
    ) -> Option<BTreeIndex> {
        self.assert_valid(index);
        self.assert_valid(limit);
        let start = index.offset as isize;
        let target = start + distance;
        let boundary = limit.offset as isize;
        if distance > 0 && boundary >= start && boundary < target {
            return None;
        }
        if distance < 0 && boundary <= start && boundary > target {
            return None;
        }
        Some(self.offset_by(index, distance))
    }

    /// Signed distance from `from` to `to`. O(1) from the captured
    /// offsets.
    ///
    /// # Panics
    ///
    /// Panics when either index is stale or foreign.
    #[must_use]
    pub fn distance(&self, from: &BTreeIndex, to: &BTreeIndex) -> isize {
        self.assert_valid(from);
        self.assert_valid(to);
        to.offset as isize - from.offset as isize
    }
}

impl<K: Ord, V, P: SharedPointerKind> BTreeMap<K, V, P> {
    /// Index of the first position at which `key` lives or would be
    /// inserted.
    #[must_use]
    pub fn start_index_for(&self, key: &K) -> BTreeIndex {
        let offset = self.root.as_ref().map_or(0, |root| offset_of_start(root, key));
        self.index_at_offset(offset)
    }

    /// Index of the first position past every entry ordering at or
    /// before `key`.
    #[must_use]
    pub fn last_index_for(&self, key: &K) -> BTreeIndex {
        let offset = self.root.as_ref().map_or(0, |root| offset_of_end(root, key));
        self.index_at_offset(offset)
    }
}

// ---------------------------------------------------------------------------
// Write operations — K: Ord + Clone, V: Clone
// ---------------------------------------------------------------------------

impl<K: Ord + Clone, V: Clone, P: SharedPointerKind> BTreeMap<K, V, P> {
    /// Inserts a key-value pair.
    ///
    /// Returns `None` if the key was new, or `Some(old_value)` if an
    /// existing value was replaced. Mutates in place when this map is
    /// the sole owner of the touched path.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Some(root_ptr) = self.root.as_mut() else {
            let mut leaf = BTreeNode::leaf(self.leaf_capacity);
            leaf.keys.push(key);
            leaf.values.push(value);
            leaf.subtree_count = 1;
            self.root = Some(SharedPointer::new(leaf));
            self.version += 1;
            return None;
        };
        let mut effect = EffectRecord::new();
        let root = SharedPointer::make_mut(root_ptr);
        if let UpdateResult::Splintered(splinter) =
            update_any_value(root, key, value, false, &mut effect)
        {
            let old_root = self.root.take().expect("root present");
            self.root = Some(SharedPointer::new(BTreeNode::branch_root(
                self.internal_capacity,
                old_root,
                splinter.separator,
                splinter.right,
            )));
        }
        self.version += 1;
        effect.take_previous()
    }

    /// Removes a key, returning its value, or `None` if absent.
    ///
    /// A miss performs no copying even on a shared tree.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        if !self.contains_key(key) {
            return None;
        }
        let root_ptr = self.root.as_mut().expect("hit implies non-empty");
        let mut effect = EffectRecord::new();
        let (_, value) = remove_any(SharedPointer::make_mut(root_ptr), key, &mut effect)
            .expect("hit implies removal");
        self.collapse_root();
        self.version += 1;
        Some(value)
    }

    /// Removes and returns the entry at in-order `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.len()`.
    pub fn remove_at_offset(&mut self, offset: usize) -> (K, V) {
        if offset >= self.len() {
            error::out_of_bounds(offset, self.len());
        }
        let root_ptr = self.root.as_mut().expect("non-empty");
        let entry = remove_at_offset(SharedPointer::make_mut(root_ptr), offset);
        self.collapse_root();
        self.version += 1;
        entry
    }

    /// Removes and returns the entry a previously issued index points
    /// at.
    ///
    /// # Panics
    ///
    /// Panics on a stale or foreign index, or on the end index.
    pub fn remove_at_index(&mut self, index: &BTreeIndex) -> (K, V) {
        self.assert_valid(index);
        if index.is_end() {
            error::out_of_bounds(index.offset, self.len());
        }
        self.remove_at_offset(index.offset)
    }

    /// Removes and returns the first entry, or `None` when empty.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let root_ptr = self.root.as_mut()?;
        let entry = pop_first(SharedPointer::make_mut(root_ptr));
        self.collapse_root();
        self.version += 1;
        Some(entry)
    }

    /// Removes and returns the last entry, or `None` when empty.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let root_ptr = self.root.as_mut()?;
        let entry = pop_last(SharedPointer::make_mut(root_ptr));
        self.collapse_root();
        self.version += 1;
        Some(entry)
    }

    /// Removes and returns the first entry.
    ///
    /// # Panics
    ///
    /// Panics when the map is empty.
    pub fn remove_first(&mut self) -> (K, V) {
        self.pop_first().unwrap_or_else(|| error::empty_collection())
    }

    /// Removes and returns the last entry.
    ///
    /// # Panics
    ///
    /// Panics when the map is empty.
    pub fn remove_last(&mut self) -> (K, V) {
        self.pop_last().unwrap_or_else(|| error::empty_collection())
    }

    /// Removes the entries at offsets `range`.
    ///
    /// # Panics
    ///
    /// Panics when the range reaches past `self.len()` or is inverted.
    pub fn remove_subrange(&mut self, range: Range<usize>) {
        if range.start > range.end || range.end > self.len() {
            error::out_of_bounds(range.end, self.len());
        }
        let count = range.end - range.start;
        let mut cursor = Cursor::new(self, range.start);
        for _ in 0..count {
            cursor.remove();
        }
        cursor.finish();
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        if self.root.take().is_some() {
            self.version += 1;
        }
    }

    /// Opens a mutating [`Cursor`] at in-order `offset`; `self.len()`
    /// addresses the end.
    ///
    /// # Panics
    ///
    /// Panics if `offset > self.len()`.
    pub fn cursor_at_offset(&mut self, offset: usize) -> Cursor<'_, K, V, P> {
        Cursor::new(self, offset)
    }

    /// Builds a new map from the entries satisfying `predicate`.
    #[must_use]
    pub fn filter(&self, mut predicate: impl FnMut(&K, &V) -> bool) -> Self {
        let mut out = Self::with_node_capacities(self.leaf_capacity, self.internal_capacity);
        for (key, value) in self.iter() {
            if predicate(key, value) {
                out.insert(key.clone(), value.clone());
            }
        }
        out
    }

    /// Joins two maps around `separator`: every key of `left` must
    /// order below `separator.0`, every key of `right` above it. Cost
    /// is proportional to the depth difference, not the entry counts.
    ///
    /// The result takes `left`'s node capacities; the trees should be
    /// built with the same ones.
    #[must_use]
    pub fn joined(mut left: Self, separator: (K, V), mut right: Self) -> Self {
        debug_assert!(
            left.is_empty() || left.entry_at_offset(left.len() - 1).0 < &separator.0,
            "left tree reaches past the separator",
        );
        debug_assert!(
            right.is_empty() || &separator.0 < right.entry_at_offset(0).0,
            "right tree reaches below the separator",
        );
        let (mut left_root, mut right_root) = match (left.root.take(), right.root.take()) {
            (None, None) => {
                left.insert(separator.0, separator.1);
                return left;
            }
            (Some(root), None) => {
                left.root = Some(root);
                left.insert(separator.0, separator.1);
                return left;
            }
            (None, Some(root)) => {
                right.root = Some(root);
                right.insert(separator.0, separator.1);
                return right;
            }
            (Some(left_root), Some(right_root)) => (left_root, right_root),
        };
        let root = match left_root.depth.cmp(&right_root.depth) {
            std::cmp::Ordering::Equal => {
                let mut left_node = BTreeNode::take(&mut left_root);
                let right_node = BTreeNode::take(&mut right_root);
                match concatenate(&mut left_node, separator, right_node) {
                    None => SharedPointer::new(left_node),
                    Some(splinter) => SharedPointer::new(BTreeNode::branch_root(
                        left.internal_capacity,
                        SharedPointer::new(left_node),
                        splinter.separator,
                        splinter.right,
                    )),
                }
            }
            std::cmp::Ordering::Greater => {
                let splinter =
                    join_right(SharedPointer::make_mut(&mut left_root), separator, right_root);
                match splinter {
                    None => left_root,
                    Some(splinter) => SharedPointer::new(BTreeNode::branch_root(
                        left.internal_capacity,
                        left_root,
                        splinter.separator,
                        splinter.right,
                    )),
                }
            }
            std::cmp::Ordering::Less => {
                let splinter =
                    join_left(SharedPointer::make_mut(&mut right_root), left_root, separator);
                match splinter {
                    None => right_root,
                    Some(splinter) => SharedPointer::new(BTreeNode::branch_root(
                        left.internal_capacity,
                        right_root,
                        splinter.separator,
                        splinter.right,
                    )),
                }
            }
        };
        left.root = Some(root);
        left.version += 1;
        left
    }

    /// Replaces an empty internal root with its lone child and drops an
    /// empty leaf root.
    fn collapse_root(&mut self) {
        let Some(root) = self.root.as_ref() else {
            return;
        };
        if root.element_count() > 0 {
            return;
        }
        let replacement = if root.is_leaf() {
            None
        } else {
            Some(root.children[0].clone())
        };
        self.root = replacement;
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, P: SharedPointerKind> Clone for BTreeMap<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            version: self.version,
            leaf_capacity: self.leaf_capacity,
            internal_capacity: self.internal_capacity,
        }
    }
}

impl<K, V, P: SharedPointerKind> Default for BTreeMap<K, V, P> {
    fn default() -> Self {
        Self {
            root: None,
            version: 0,
            leaf_capacity: default_leaf_capacity::<K>(),
            internal_capacity: default_internal_capacity::<K>(),
        }
    }
}

#[cfg(test)]
impl<K: Ord, V, P: SharedPointerKind> BTreeMap<K, V, P> {
    /// Test hook: asserts every structural invariant of the tree.
    pub(crate) fn check_invariants(&self) {
        if let Some(root) = &self.root {
            root.check_invariants(true);
            assert_eq!(self.len(), root.subtree_count);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P: SharedPointerKind> fmt::Debug for BTreeMap<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord + Clone, V: Clone, P: SharedPointerKind> Extend<(K, V)> for BTreeMap<K, V, P> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord + Clone, V: Clone, P: SharedPointerKind> FromIterator<(K, V)> for BTreeMap<K, V, P> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, P: SharedPointerKind> ops::Index<&K> for BTreeMap<K, V, P> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, P: SharedPointerKind> IntoIterator for &'a BTreeMap<K, V, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    fn into_iter(self) -> Iter<'a, K, V, P> {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq, P: SharedPointerKind> PartialEq for BTreeMap<K, V, P> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, P: SharedPointerKind> Eq for BTreeMap<K, V, P> {}

impl<K: Hash, V: Hash, P: SharedPointerKind> Hash for BTreeMap<K, V, P> {
    /// Order-dependent over the ascending entry sequence, so equal maps
    /// hash equal.
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for (key, value) in self.iter() {
            key.hash(state);
            value.hash(state);
        }
    }
}
