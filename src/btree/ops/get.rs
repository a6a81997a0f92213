//! Read-only traversals: keyed lookup and positional queries.

use archery::SharedPointerKind;

use crate::btree::node::BTreeNode;

/// Finds the entry for `key`, descending by separator comparison.
pub(crate) fn find<'a, K, V, P>(
    mut node: &'a BTreeNode<K, V, P>,
    key: &K,
) -> Option<(&'a K, &'a V)>
where
    K: Ord,
    P: SharedPointerKind,
{
    loop {
        let slot = node.start_slot_for(key);
        if slot < node.element_count() && node.keys[slot] == *key {
            return Some(node.entry_at(slot));
        }
        if node.is_leaf() {
            return None;
        }
        node = &node.children[slot];
    }
}

/// Entry at in-order `offset`, located through the cached subtree
/// counts. The caller bounds-checks.
pub(crate) fn entry_at_offset<'a, K, V, P>(
    node: &'a BTreeNode<K, V, P>,
    offset: usize,
) -> (&'a K, &'a V)
where
    P: SharedPointerKind,
{
    if node.is_leaf() {
        return node.entry_at(offset);
    }
    let mut remaining = offset;
    for slot in 0..node.child_count() {
        let child_entries = node.children[slot].subtree_count;
        if remaining < child_entries {
            return entry_at_offset(&node.children[slot], remaining);
        }
        remaining -= child_entries;
        if slot < node.element_count() {
            if remaining == 0 {
                return node.entry_at(slot);
            }
            remaining -= 1;
        }
    }
    unreachable!("offset exceeds the subtree count")
}

/// Number of entries whose keys order strictly before `key`.
pub(crate) fn offset_of_start<K, V, P>(mut node: &BTreeNode<K, V, P>, key: &K) -> usize
where
    K: Ord,
    P: SharedPointerKind,
{
    let mut offset = 0;
    loop {
        let slot = node.start_slot_for(key);
        if node.is_leaf() {
            return offset + slot;
        }
        for child in &node.children[..slot] {
            offset += child.subtree_count;
        }
        offset += slot;
        node = &node.children[slot];
    }
}

/// Number of entries whose keys order at or before `key`.
pub(crate) fn offset_of_end<K, V, P>(mut node: &BTreeNode<K, V, P>, key: &K) -> usize
where
    K: Ord,
    P: SharedPointerKind,
{
    let mut offset = 0;
    loop {
        let slot = node.end_slot_for(key);
        if node.is_leaf() {
            return offset + slot;
        }
        for child in &node.children[..slot] {
            offset += child.subtree_count;
        }
        offset += slot;
        node = &node.children[slot];
    }
}
