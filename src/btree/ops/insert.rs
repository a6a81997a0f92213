//! Insert/update core: slot search, median splits, positional insert.

use std::mem;

use archery::{SharedPointer, SharedPointerKind};

use crate::btree::node::{BTreeNode, NodePtr};
use crate::effect::EffectRecord;

/// The `(separator, right sibling)` pair thrown off by an overflowing
/// node.
pub(crate) struct Splinter<K, V, P: SharedPointerKind> {
    pub(crate) separator: (K, V),
    pub(crate) right: NodePtr<K, V, P>,
}

/// Outcome of a recursive keyed insert.
pub(crate) enum UpdateResult<K, V, P: SharedPointerKind> {
    /// An existing key's value was replaced; the shape is unchanged.
    Updated,
    /// A new entry landed without overflowing this node.
    Inserted,
    /// This node split; the caller owns the separator and new sibling.
    Splintered(Splinter<K, V, P>),
}

/// Inserts `key`/`value` into the subtree rooted at `node`, replacing
/// the value (and, when `update_key`, the stored key) on an equal key.
///
/// The replaced value lands in `effect.previous_value`; a structural
/// insert sets `effect.modified`.
pub(crate) fn update_any_value<K, V, P>(
    node: &mut BTreeNode<K, V, P>,
    key: K,
    value: V,
    update_key: bool,
    effect: &mut EffectRecord<V>,
) -> UpdateResult<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    let slot = node.end_slot_for(&key);
    if slot > 0 && node.keys[slot - 1] == key {
        if update_key {
            node.keys[slot - 1] = key;
        }
        effect.set_previous(mem::replace(&mut node.values[slot - 1], value));
        return UpdateResult::Updated;
    }
    if node.is_leaf() {
        effect.set_modified();
        return insert_entry(node, slot, (key, value), None);
    }
    let child = SharedPointer::make_mut(&mut node.children[slot]);
    match update_any_value(child, key, value, update_key, effect) {
        UpdateResult::Updated => UpdateResult::Updated,
        UpdateResult::Inserted => {
            node.subtree_count += 1;
            UpdateResult::Inserted
        }
        UpdateResult::Splintered(splinter) => {
            insert_entry(node, slot, splinter.separator, Some(splinter.right))
        }
    }
}

/// Inserts an entry at `slot`, splitting when the node is full.
pub(crate) fn insert_entry<K, V, P>(
    node: &mut BTreeNode<K, V, P>,
    slot: usize,
    entry: (K, V),
    right_child: Option<NodePtr<K, V, P>>,
) -> UpdateResult<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    if node.is_full() {
        return UpdateResult::Splintered(split_inserting(node, slot, entry, right_child));
    }
    node.insert_entry_at(slot, entry, right_child);
    node.update_counts();
    UpdateResult::Inserted
}

/// Splits a full node while inserting `entry` at `slot`, returning the
/// separator and the new right sibling (same capacity).
///
/// Three cases on the insertion slot relative to the medians: landing
/// exactly on the right median makes the inserted entry the separator;
/// above it, the entry moves into the right half; below it, the split
/// point backs off one slot and the entry stays left.
pub(crate) fn split_inserting<K, V, P>(
    node: &mut BTreeNode<K, V, P>,
    slot: usize,
    entry: (K, V),
    right_child: Option<NodePtr<K, V, P>>,
) -> Splinter<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    debug_assert!(node.is_full());
    debug_assert_eq!(right_child.is_some(), !node.is_leaf());
    let element_count = node.element_count();
    let right_median = element_count / 2;
    let left_median = (element_count - 1) / 2;
    let mut right = if node.is_leaf() {
        BTreeNode::leaf(node.capacity)
    } else {
        BTreeNode::internal(node.capacity, node.depth)
    };

    let separator;
    if slot == right_median {
        separator = entry;
        node.move_entries_to(right_median, &mut right);
        if let Some(child) = right_child {
            right.children.push(child);
            node.move_children_to(right_median + 1, &mut right);
        }
    } else if slot > right_median {
        separator = node.remove_entry_at(right_median);
        let right_slot = slot - right_median - 1;
        node.move_entries_to(right_median, &mut right);
        right.keys.insert(right_slot, entry.0);
        right.values.insert(right_slot, entry.1);
        if !node.is_leaf() {
            node.move_children_to(right_median + 1, &mut right);
            if let Some(child) = right_child {
                right.children.insert(right_slot + 1, child);
            }
        }
    } else {
        separator = node.remove_entry_at(left_median);
        node.move_entries_to(left_median, &mut right);
        if !node.is_leaf() {
            node.move_children_to(left_median + 1, &mut right);
        }
        node.keys.insert(slot, entry.0);
        node.values.insert(slot, entry.1);
        if let Some(child) = right_child {
            node.children.insert(slot + 1, child);
        }
    }
    node.update_counts();
    right.update_counts();
    Splinter {
        separator,
        right: SharedPointer::new(right),
    }
}

/// Inserts `entry` so it becomes the element at `offset` in the
/// subtree's in-order sequence. Positions on a child boundary descend
/// into the left child, so every insertion lands in a leaf.
///
/// The caller guarantees the entry's key preserves the ordering at that
/// position.
pub(crate) fn insert_at_offset<K, V, P>(
    node: &mut BTreeNode<K, V, P>,
    offset: usize,
    entry: (K, V),
) -> Option<Splinter<K, V, P>>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    if node.is_leaf() {
        debug_assert!(offset <= node.element_count());
        return match insert_entry(node, offset, entry, None) {
            UpdateResult::Splintered(splinter) => Some(splinter),
            _ => None,
        };
    }
    let mut remaining = offset;
    for slot in 0..node.child_count() {
        let child_entries = node.children[slot].subtree_count;
        if remaining <= child_entries {
            let child = SharedPointer::make_mut(&mut node.children[slot]);
            let result = match insert_at_offset(child, remaining, entry) {
                None => None,
                Some(splinter) => {
                    match insert_entry(node, slot, splinter.separator, Some(splinter.right)) {
                        UpdateResult::Splintered(escaped) => Some(escaped),
                        _ => None,
                    }
                }
            };
            node.update_counts();
            return result;
        }
        remaining -= child_entries + 1;
    }
    unreachable!("offset exceeds the subtree count")
}
