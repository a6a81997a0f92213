//! B-tree node storage and slot-level operations.
//!
//! A node is one header plus three buffers created at a fixed capacity
//! and never grown past it (splits fire first). Read access goes
//! through `&self` methods, unique access through `&mut self`; the
//! borrow checker enforces the scoped-lens discipline.

use std::mem::size_of;

use archery::{SharedPointer, SharedPointerKind};

pub(crate) type NodePtr<K, V, P> = SharedPointer<BTreeNode<K, V, P>, P>;

/// Largest key capacity handed out by the defaults.
const DEFAULT_CAPACITY_CAP: usize = 16;

/// Byte budget for a leaf node's key buffer.
const LEAF_BYTE_BUDGET: usize = 2000;

/// Byte budget for an internal node's key buffer.
const INTERNAL_BYTE_BUDGET: usize = 64;

/// Smallest capacity at which splits and merges stay well-formed.
pub(crate) const MIN_CAPACITY: usize = 4;

const fn clamp_capacity(capacity: usize) -> usize {
    let capped = if capacity > DEFAULT_CAPACITY_CAP {
        DEFAULT_CAPACITY_CAP
    } else {
        capacity
    };
    if capped < MIN_CAPACITY {
        MIN_CAPACITY
    } else {
        capped
    }
}

const fn key_size<K>() -> usize {
    if size_of::<K>() == 0 { 1 } else { size_of::<K>() }
}

/// Default key capacity for leaf nodes keyed by `K`.
pub(crate) const fn default_leaf_capacity<K>() -> usize {
    clamp_capacity(LEAF_BYTE_BUDGET / key_size::<K>())
}

/// Default key capacity for internal nodes keyed by `K`.
pub(crate) const fn default_internal_capacity<K>() -> usize {
    clamp_capacity(INTERNAL_BYTE_BUDGET / key_size::<K>())
}

/// One node of the B-tree.
///
/// `keys` stay ascending; internal nodes hold one more child than keys,
/// every child one level shallower than this node. `subtree_count`
/// caches the entry count of the whole subtree. A `Vec<V>` of a
/// zero-sized value type allocates nothing, so value storage vanishes
/// for set-like uses without a dedicated code path.
pub(crate) struct BTreeNode<K, V, P: SharedPointerKind> {
    pub(crate) capacity: usize,
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
    pub(crate) children: Vec<NodePtr<K, V, P>>,
    pub(crate) subtree_count: usize,
    pub(crate) depth: usize,
}

impl<K, V, P: SharedPointerKind> BTreeNode<K, V, P> {
    /// An empty leaf.
    pub(crate) fn leaf(capacity: usize) -> Self {
        Self {
            capacity,
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            children: Vec::new(),
            subtree_count: 0,
            depth: 0,
        }
    }

    /// An empty internal node at `depth`.
    pub(crate) fn internal(capacity: usize, depth: usize) -> Self {
        debug_assert!(depth > 0);
        Self {
            capacity,
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity + 1),
            subtree_count: 0,
            depth,
        }
    }

    /// A fresh root one level above `left`, absorbing a splinter.
    pub(crate) fn branch_root(
        capacity: usize,
        left: NodePtr<K, V, P>,
        separator: (K, V),
        right: NodePtr<K, V, P>,
    ) -> Self {
        let mut root = Self::internal(capacity, left.depth + 1);
        root.keys.push(separator.0);
        root.values.push(separator.1);
        root.children.push(left);
        root.children.push(right);
        root.update_counts();
        root
    }

    /// Moves the contents out of `ptr`, copying only when shared; the
    /// husk left behind is dropped with the pointer.
    pub(crate) fn take(ptr: &mut NodePtr<K, V, P>) -> Self
    where
        K: Clone,
        V: Clone,
    {
        let node = SharedPointer::make_mut(ptr);
        Self {
            capacity: node.capacity,
            keys: std::mem::take(&mut node.keys),
            values: std::mem::take(&mut node.values),
            children: std::mem::take(&mut node.children),
            subtree_count: node.subtree_count,
            depth: node.depth,
        }
    }

    pub(crate) fn element_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.keys.len() == self.capacity
    }

    /// Fewest keys a non-root node may hold.
    pub(crate) fn minimum_element_count(&self) -> usize {
        self.capacity / 2
    }

    pub(crate) fn is_balanced(&self) -> bool {
        self.keys.len() >= self.minimum_element_count()
    }

    /// Can lend an entry to a sibling without underflowing.
    pub(crate) fn is_shrinkable(&self) -> bool {
        self.keys.len() > self.minimum_element_count()
    }

    /// First slot at which `key` could be inserted preserving order.
    pub(crate) fn start_slot_for(&self, key: &K) -> usize
    where
        K: Ord,
    {
        self.keys.partition_point(|k| k < key)
    }

    /// Last slot at which `key` could be inserted preserving order.
    pub(crate) fn end_slot_for(&self, key: &K) -> usize
    where
        K: Ord,
    {
        self.keys.partition_point(|k| k <= key)
    }

    /// Entry at `slot`.
    pub(crate) fn entry_at(&self, slot: usize) -> (&K, &V) {
        (&self.keys[slot], &self.values[slot])
    }

    /// Inserts an entry (and the child to its right, for internal
    /// nodes) at `slot`. The caller guarantees room.
    pub(crate) fn insert_entry_at(
        &mut self,
        slot: usize,
        entry: (K, V),
        right_child: Option<NodePtr<K, V, P>>,
    ) {
        debug_assert!(self.keys.len() < self.capacity);
        self.keys.insert(slot, entry.0);
        self.values.insert(slot, entry.1);
        if let Some(child) = right_child {
            self.children.insert(slot + 1, child);
        }
    }

    /// Removes the entry at `slot`, shifting later entries left.
    pub(crate) fn remove_entry_at(&mut self, slot: usize) -> (K, V) {
        (self.keys.remove(slot), self.values.remove(slot))
    }

    /// Moves entries from `from` onward onto the end of `dst`.
    pub(crate) fn move_entries_to(&mut self, from: usize, dst: &mut Self) {
        dst.keys.extend(self.keys.drain(from..));
        dst.values.extend(self.values.drain(from..));
    }

    /// Moves children from `from` onward onto the end of `dst`.
    pub(crate) fn move_children_to(&mut self, from: usize, dst: &mut Self) {
        dst.children.extend(self.children.drain(from..));
    }

    /// Re-derives `subtree_count` from this node and its children.
    pub(crate) fn update_counts(&mut self) {
        self.subtree_count = self.keys.len()
            + self
                .children
                .iter()
                .map(|child| child.subtree_count)
                .sum::<usize>();
    }
}

// Manual impl: buffer capacities must survive the copy-on-write clone,
// and children clone by pointer bump.
impl<K: Clone, V: Clone, P: SharedPointerKind> Clone for BTreeNode<K, V, P> {
    fn clone(&self) -> Self {
        let mut keys = Vec::with_capacity(self.capacity);
        keys.extend(self.keys.iter().cloned());
        let mut values = Vec::with_capacity(self.capacity);
        values.extend(self.values.iter().cloned());
        let mut children = Vec::with_capacity(if self.children.is_empty() {
            0
        } else {
            self.capacity + 1
        });
        children.extend(self.children.iter().cloned());
        Self {
            capacity: self.capacity,
            keys,
            values,
            children,
            subtree_count: self.subtree_count,
            depth: self.depth,
        }
    }
}

#[cfg(test)]
impl<K: Ord, V, P: SharedPointerKind> BTreeNode<K, V, P> {
    /// Walks the subtree asserting the structural invariants: ordered
    /// keys, separator bounds, uniform child depth, minimum fill, and
    /// cached subtree counts.
    pub(crate) fn check_invariants(&self, is_root: bool) {
        assert!(self.keys.len() <= self.capacity, "node over capacity");
        assert_eq!(self.values.len(), self.keys.len());
        assert!(
            self.keys.windows(2).all(|pair| pair[0] <= pair[1]),
            "keys out of order",
        );
        if !is_root {
            assert!(self.is_balanced(), "node under minimum fill");
        }
        if self.is_leaf() {
            assert_eq!(self.depth, 0);
            assert_eq!(self.subtree_count, self.keys.len());
            return;
        }
        assert_eq!(self.children.len(), self.keys.len() + 1);
        let mut total = self.keys.len();
        for (slot, child) in self.children.iter().enumerate() {
            assert_eq!(child.depth + 1, self.depth, "uneven child depth");
            child.check_invariants(false);
            total += child.subtree_count;
            if slot < self.keys.len() {
                assert!(
                    child.keys.last().expect("balanced child is non-empty") <= &self.keys[slot],
                    "separator below its left subtree",
                );
            }
            if slot > 0 {
                assert!(
                    &self.keys[slot - 1] <= child.keys.first().expect("non-empty"),
                    "separator above its right subtree",
                );
            }
        }
        assert_eq!(self.subtree_count, total, "cached subtree count out of sync");
    }
}
