//! Mutating cursor: bulk edits at a position.

use archery::{SharedPointer, SharedPointerKind};

use crate::btree::map::BTreeMap;
use crate::btree::node::{BTreeNode, NodePtr};
use crate::btree::ops::insert::insert_at_offset;
use crate::btree::ops::remove::remove_at_offset;
use crate::error;
use crate::path_stack::PathStack;

/// An edit position in a [`BTreeMap`].
///
/// The cursor moves the root out of the tree for its lifetime; the
/// mutable borrow makes any other use of the tree a compile error while
/// the cursor lives. Dropping the cursor (or calling
/// [`finish`](Self::finish)) hands the root back and, if anything was
/// edited, bumps the tree version so outstanding indices go stale.
///
/// Mutations check ownership per level: the first edit copies whatever
/// part of its path is shared. `last_unique_depth` records how deep the
/// chain from the root is already known to be singly owned; those
/// levels take the direct unique-access path instead of the
/// copy-on-write check. A value edit deepens the marker to the whole
/// descent, a structural edit resets it to the root (rebalancing can
/// reroute everything below), and moving the cursor discards what it
/// knew below the root.
pub struct Cursor<'a, K, V, P: SharedPointerKind> {
    tree: &'a mut BTreeMap<K, V, P>,
    root: Option<NodePtr<K, V, P>>,
    slots: PathStack<u16>,
    slot: u16,
    offset: usize,
    /// Deepest level of the current descent known to be singly owned;
    /// -1 before the first edit.
    last_unique_depth: isize,
    mutated: bool,
}

/// Unique access to the node behind `ptr`: the direct path when the
/// chain is already known singly owned, the copy-on-write path
/// otherwise.
fn node_mut<K, V, P>(ptr: &mut NodePtr<K, V, P>, known_unique: bool) -> &mut BTreeNode<K, V, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    if known_unique {
        SharedPointer::get_mut(ptr).expect("chain above last_unique_depth is uniquely owned")
    } else {
        SharedPointer::make_mut(ptr)
    }
}

impl<'a, K, V, P> Cursor<'a, K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    /// Opens a cursor at `offset`; `tree.len()` addresses the end.
    ///
    /// # Panics
    ///
    /// Panics if `offset > tree.len()`.
    pub(crate) fn new(tree: &'a mut BTreeMap<K, V, P>, offset: usize) -> Self {
        if offset > tree.len() {
            error::out_of_bounds(offset, tree.len());
        }
        let root = tree.root.take();
        let mut cursor = Self {
            tree,
            root,
            slots: PathStack::new(),
            slot: 0,
            offset,
            last_unique_depth: -1,
            mutated: false,
        };
        cursor.reseek();
        cursor
    }

    /// Number of entries under the cursor's root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.subtree_count)
    }

    /// Returns `true` when the tree behind the cursor is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The cursor's global offset.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Moves the cursor to `offset`; `len()` addresses the end.
    ///
    /// # Panics
    ///
    /// Panics if `offset > self.len()`.
    pub fn move_to_offset(&mut self, offset: usize) {
        if offset > self.len() {
            error::out_of_bounds(offset, self.len());
        }
        self.offset = offset;
        // Rerouting the descent keeps only the root's uniqueness known.
        self.last_unique_depth = self.last_unique_depth.min(0);
        self.reseek();
    }

    /// Entry at the cursor, or `None` at the end position.
    #[must_use]
    pub fn current(&self) -> Option<(&K, &V)> {
        let root = self.root.as_ref()?;
        if self.offset == root.subtree_count {
            return None;
        }
        let mut node = &**root;
        for slot in self.slots.iter() {
            node = &node.children[usize::from(*slot)];
        }
        Some(node.entry_at(usize::from(self.slot)))
    }

    /// Replaces the value at the cursor, returning the old one.
    ///
    /// # Panics
    ///
    /// Panics at the end position.
    pub fn update_value(&mut self, value: V) -> V {
        if self.offset >= self.len() {
            error::out_of_bounds(self.offset, self.len());
        }
        let known_depth = self.last_unique_depth;
        let root = self.root.as_mut().expect("non-empty");
        let mut node = node_mut(root, known_depth >= 0);
        for (depth, slot) in self.slots.iter().enumerate() {
            let child = &mut node.children[usize::from(*slot)];
            node = node_mut(child, depth as isize + 1 <= known_depth);
        }
        let previous = std::mem::replace(&mut node.values[usize::from(self.slot)], value);
        self.mutated = true;
        // The walk has made the whole descent unique, and replacing a
        // value does not reroute it.
        self.last_unique_depth = self.slots.len() as isize;
        previous
    }

    /// Inserts an entry at the cursor position and advances past it.
    ///
    /// The key must preserve the tree's ordering at this position; this
    /// is the caller's contract, checked only in debug builds.
    pub fn insert(&mut self, key: K, value: V) {
        self.debug_check_insert_order(&key);
        match &mut self.root {
            None => {
                let mut leaf = BTreeNode::leaf(self.tree.leaf_capacity);
                leaf.keys.push(key);
                leaf.values.push(value);
                leaf.subtree_count = 1;
                self.root = Some(SharedPointer::new(leaf));
            }
            Some(root_ptr) => {
                let root = node_mut(root_ptr, self.last_unique_depth >= 0);
                if let Some(splinter) = insert_at_offset(root, self.offset, (key, value)) {
                    let old_root = self.root.take().expect("root present");
                    self.root = Some(SharedPointer::new(BTreeNode::branch_root(
                        self.tree.internal_capacity,
                        old_root,
                        splinter.separator,
                        splinter.right,
                    )));
                }
            }
        }
        self.mark_mutated();
        self.offset += 1;
        self.reseek();
    }

    /// Removes and returns the entry at the cursor.
    ///
    /// # Panics
    ///
    /// Panics at the end position.
    pub fn remove(&mut self) -> (K, V) {
        let len = self.len();
        if self.offset >= len {
            error::out_of_bounds(self.offset, len);
        }
        let known_unique = self.last_unique_depth >= 0;
        let root_ptr = self.root.as_mut().expect("non-empty");
        let root = node_mut(root_ptr, known_unique);
        let entry = remove_at_offset(root, self.offset);
        let replacement = if root.element_count() == 0 {
            if root.is_leaf() {
                Some(None)
            } else {
                Some(Some(root.children[0].clone()))
            }
        } else {
            None
        };
        if let Some(new_root) = replacement {
            self.root = new_root;
        }
        self.mark_mutated();
        self.reseek();
        entry
    }

    /// Hands the root back to the tree. Equivalent to dropping the
    /// cursor, made explicit for call sites that want a seam.
    pub fn finish(self) {}

    fn mark_mutated(&mut self) {
        self.mutated = true;
        // A structural edit makes the root unique but may rebalance
        // siblings and reroute the descent below it.
        self.last_unique_depth = 0;
    }

    /// Rebuilds the slot path for the current offset.
    fn reseek(&mut self) {
        self.slots.clear();
        self.slot = 0;
        let Some(root) = &self.root else { return };
        if self.offset == root.subtree_count {
            return;
        }
        let mut node = &**root;
        let mut remaining = self.offset;
        'descend: while !node.is_leaf() {
            for slot in 0..node.child_count() {
                let child_entries = node.children[slot].subtree_count;
                if remaining < child_entries {
                    self.slots.push_back(slot as u16);
                    node = &node.children[slot];
                    continue 'descend;
                }
                remaining -= child_entries;
                if slot < node.element_count() {
                    if remaining == 0 {
                        self.slot = slot as u16;
                        return;
                    }
                    remaining -= 1;
                }
            }
            unreachable!("offset exceeds the subtree count");
        }
        self.slot = remaining as u16;
    }

    #[cfg(debug_assertions)]
    fn debug_check_insert_order(&self, key: &K) {
        if let Some(root) = &self.root {
            if self.offset > 0 {
                let (before, _) = crate::btree::ops::entry_at_offset(root, self.offset - 1);
                debug_assert!(before <= key, "cursor insert breaks key order");
            }
            if self.offset < root.subtree_count {
                let (after, _) = crate::btree::ops::entry_at_offset(root, self.offset);
                debug_assert!(key <= after, "cursor insert breaks key order");
            }
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_insert_order(&self, _key: &K) {}
}

impl<K, V, P: SharedPointerKind> Drop for Cursor<'_, K, V, P> {
    fn drop(&mut self) {
        self.tree.root = self.root.take();
        if self.mutated {
            self.tree.version += 1;
        }
    }
}
