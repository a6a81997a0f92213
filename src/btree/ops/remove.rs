//! Removal core: predecessor swaps, rotations, merges.

use std::mem;

use archery::{SharedPointer, SharedPointerKind};

use crate::btree::node::BTreeNode;
use crate::effect::EffectRecord;

/// Removes `key` from the subtree rooted at `node`.
///
/// An entry found in an internal node is swapped with its in-order
/// predecessor (popped off the left child's rightmost spine); the
/// visited child slot is rebalanced on the way out. The root itself may
/// be left under-filled or empty; the map collapses it afterwards.
pub(crate) fn remove_any<K, V, P>(
    node: &mut BTreeNode<K, V, P>,
    key: &K,
    effect: &mut EffectRecord<V>,
) -> Option<(K, V)>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    let slot = node.start_slot_for(key);
    let found = slot < node.element_count() && node.keys[slot] == *key;
    if node.is_leaf() {
        if !found {
            return None;
        }
        effect.set_modified();
        let entry = node.remove_entry_at(slot);
        node.subtree_count -= 1;
        return Some(entry);
    }
    if found {
        effect.set_modified();
        let predecessor = pop_last(SharedPointer::make_mut(&mut node.children[slot]));
        let entry = (
            mem::replace(&mut node.keys[slot], predecessor.0),
            mem::replace(&mut node.values[slot], predecessor.1),
        );
        node.subtree_count -= 1;
        balance_at(node, slot);
        return Some(entry);
    }
    let removed = remove_any(SharedPointer::make_mut(&mut node.children[slot]), key, effect)?;
    node.subtree_count -= 1;
    balance_at(node, slot);
    Some(removed)
}

/// Removes the entry at in-order `offset` within the subtree. The
/// caller bounds-checks against the subtree count.
pub(crate) fn remove_at_offset<K, V, P>(node: &mut BTreeNode<K, V, P>, offset: usize) -> (K, V)
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    if node.is_leaf() {
        let entry = node.remove_entry_at(offset);
        node.subtree_count -= 1;
        return entry;
    }
    let mut remaining = offset;
    for slot in 0..node.child_count() {
        let child_entries = node.children[slot].subtree_count;
        if remaining < child_entries {
            let entry = remove_at_offset(SharedPointer::make_mut(&mut node.children[slot]), remaining);
            node.subtree_count -= 1;
            balance_at(node, slot);
            return entry;
        }
        remaining -= child_entries;
        if slot < node.element_count() {
            if remaining == 0 {
                // The target is this separator; swap in its predecessor.
                let predecessor = pop_last(SharedPointer::make_mut(&mut node.children[slot]));
                let entry = (
                    mem::replace(&mut node.keys[slot], predecessor.0),
                    mem::replace(&mut node.values[slot], predecessor.1),
                );
                node.subtree_count -= 1;
                balance_at(node, slot);
                return entry;
            }
            remaining -= 1;
        }
    }
    unreachable!("offset exceeds the subtree count")
}

/// Removes and returns the first entry of the subtree.
pub(crate) fn pop_first<K, V, P>(node: &mut BTreeNode<K, V, P>) -> (K, V)
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    if node.is_leaf() {
        let entry = node.remove_entry_at(0);
        node.subtree_count -= 1;
        return entry;
    }
    let entry = pop_first(SharedPointer::make_mut(&mut node.children[0]));
    node.subtree_count -= 1;
    balance_at(node, 0);
    entry
}

/// Removes and returns the last entry of the subtree.
pub(crate) fn pop_last<K, V, P>(node: &mut BTreeNode<K, V, P>) -> (K, V)
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    if node.is_leaf() {
        let key = node.keys.pop().expect("non-empty by the balance invariant");
        let value = node.values.pop().expect("one value per key");
        node.subtree_count -= 1;
        return (key, value);
    }
    let last = node.child_count() - 1;
    let entry = pop_last(SharedPointer::make_mut(&mut node.children[last]));
    node.subtree_count -= 1;
    balance_at(node, last);
    entry
}

/// Restores the minimum-fill invariant at `parent.children[slot]` after
/// that subtree may have underflowed.
///
/// Preference order: borrow from a shrinkable left sibling (rotate
/// right), then from a shrinkable right sibling (rotate left), then
/// merge with a sibling, pulling the separator down.
pub(crate) fn balance_at<K, V, P>(parent: &mut BTreeNode<K, V, P>, slot: usize)
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    if parent.children[slot].is_balanced() {
        return;
    }
    if slot > 0 && parent.children[slot - 1].is_shrinkable() {
        rotate_right(parent, slot - 1);
    } else if slot < parent.element_count() && parent.children[slot + 1].is_shrinkable() {
        rotate_left(parent, slot);
    } else if slot == parent.element_count() {
        collapse(parent, slot - 1);
    } else {
        collapse(parent, slot);
    }
}

/// Moves the last entry of the left child up to the separator at
/// `separator_slot` and the old separator down into the right child's
/// first slot, migrating the left child's last subtree along.
fn rotate_right<K, V, P>(parent: &mut BTreeNode<K, V, P>, separator_slot: usize)
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    let (lent, lent_child) = {
        let left = SharedPointer::make_mut(&mut parent.children[separator_slot]);
        debug_assert!(left.is_shrinkable());
        let key = left.keys.pop().expect("shrinkable");
        let value = left.values.pop().expect("one value per key");
        let child = left.children.pop();
        left.update_counts();
        ((key, value), child)
    };
    let separator = (
        mem::replace(&mut parent.keys[separator_slot], lent.0),
        mem::replace(&mut parent.values[separator_slot], lent.1),
    );
    let right = SharedPointer::make_mut(&mut parent.children[separator_slot + 1]);
    right.keys.insert(0, separator.0);
    right.values.insert(0, separator.1);
    if let Some(child) = lent_child {
        right.children.insert(0, child);
    }
    right.update_counts();
}

/// Mirror of [`rotate_right`]: the right child lends its first entry.
fn rotate_left<K, V, P>(parent: &mut BTreeNode<K, V, P>, separator_slot: usize)
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    let (lent, lent_child) = {
        let right = SharedPointer::make_mut(&mut parent.children[separator_slot + 1]);
        debug_assert!(right.is_shrinkable());
        let key = right.keys.remove(0);
        let value = right.values.remove(0);
        let child = if right.is_leaf() {
            None
        } else {
            Some(right.children.remove(0))
        };
        right.update_counts();
        ((key, value), child)
    };
    let separator = (
        mem::replace(&mut parent.keys[separator_slot], lent.0),
        mem::replace(&mut parent.values[separator_slot], lent.1),
    );
    let left = SharedPointer::make_mut(&mut parent.children[separator_slot]);
    left.keys.push(separator.0);
    left.values.push(separator.1);
    if let Some(child) = lent_child {
        left.children.push(child);
    }
    left.update_counts();
}

/// Merges the children flanking `separator_slot`, pulling the separator
/// down between them; the parent loses one entry and one child.
fn collapse<K, V, P>(parent: &mut BTreeNode<K, V, P>, separator_slot: usize)
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    let (mut right_keys, mut right_values, mut right_children) = {
        let right = SharedPointer::make_mut(&mut parent.children[separator_slot + 1]);
        (
            mem::take(&mut right.keys),
            mem::take(&mut right.values),
            mem::take(&mut right.children),
        )
    };
    let separator = parent.remove_entry_at(separator_slot);
    parent.children.remove(separator_slot + 1);
    let left = SharedPointer::make_mut(&mut parent.children[separator_slot]);
    left.keys.push(separator.0);
    left.values.push(separator.1);
    left.keys.append(&mut right_keys);
    left.values.append(&mut right_values);
    left.children.append(&mut right_children);
    left.update_counts();
    debug_assert!(left.keys.len() <= left.capacity, "merge over capacity");
}
