//! Concatenation of same-depth subtrees and unequal-depth joins.

use archery::{SharedPointer, SharedPointerKind};

use crate::btree::node::{BTreeNode, NodePtr};
use crate::btree::ops::insert::{Splinter, UpdateResult, insert_entry, split_inserting};

/// Appends `separator` and the contents of `right` onto `left` (same
/// depth). When the result would overflow, redistributes around the
/// midpoint of the combined sequence and returns a splinter instead.
pub(crate) fn concatenate<K, V, P>(
    left: &mut BTreeNode<K, V, P>,
    separator: (K, V),
    mut right: BTreeNode<K, V, P>,
) -> Option<Splinter<K, V, P>>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    debug_assert_eq!(left.depth, right.depth);
    let left_count = left.element_count();
    let right_count = right.element_count();
    let total = left_count + 1 + right_count;
    if total <= left.capacity {
        left.keys.push(separator.0);
        left.values.push(separator.1);
        left.keys.append(&mut right.keys);
        left.values.append(&mut right.values);
        left.children.append(&mut right.children);
        left.update_counts();
        return None;
    }

    // Combined order: left entries, separator, right entries. The entry
    // at the midpoint becomes the new separator.
    let midpoint = total / 2;
    let splinter = if midpoint == left_count {
        right.update_counts();
        Splinter {
            separator,
            right: SharedPointer::new(right),
        }
    } else if midpoint < left_count {
        let mut tail = if left.is_leaf() {
            BTreeNode::leaf(left.capacity)
        } else {
            BTreeNode::internal(left.capacity, left.depth)
        };
        left.move_entries_to(midpoint + 1, &mut tail);
        if !left.is_leaf() {
            left.move_children_to(midpoint + 1, &mut tail);
        }
        let new_separator = (
            left.keys.pop().expect("entry at the midpoint"),
            left.values.pop().expect("one value per key"),
        );
        tail.keys.push(separator.0);
        tail.values.push(separator.1);
        tail.keys.append(&mut right.keys);
        tail.values.append(&mut right.values);
        tail.children.append(&mut right.children);
        tail.update_counts();
        Splinter {
            separator: new_separator,
            right: SharedPointer::new(tail),
        }
    } else {
        let absorbed = midpoint - left_count - 1;
        left.keys.push(separator.0);
        left.values.push(separator.1);
        left.keys.extend(right.keys.drain(..absorbed));
        left.values.extend(right.values.drain(..absorbed));
        if !left.is_leaf() {
            left.children.extend(right.children.drain(..=absorbed));
        }
        let new_separator = (right.keys.remove(0), right.values.remove(0));
        right.update_counts();
        Splinter {
            separator: new_separator,
            right: SharedPointer::new(right),
        }
    };
    left.update_counts();
    Some(splinter)
}

/// Grafts `right` (a shallower subtree) onto the rightmost spine of
/// `node`, separated by `separator`. Splinters bubble back up; the
/// caller handles one escaping the root.
pub(crate) fn join_right<K, V, P>(
    node: &mut BTreeNode<K, V, P>,
    separator: (K, V),
    right: NodePtr<K, V, P>,
) -> Option<Splinter<K, V, P>>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    debug_assert!(node.depth > right.depth);
    let last = node.child_count() - 1;
    let splinter = if node.children[last].depth == right.depth {
        let mut right = right;
        let right_node = BTreeNode::take(&mut right);
        concatenate(
            SharedPointer::make_mut(&mut node.children[last]),
            separator,
            right_node,
        )
    } else {
        join_right(
            SharedPointer::make_mut(&mut node.children[last]),
            separator,
            right,
        )
    };
    let escaped = splinter.and_then(|splinter| {
        match insert_entry(node, last, splinter.separator, Some(splinter.right)) {
            UpdateResult::Splintered(escaped) => Some(escaped),
            _ => None,
        }
    });
    node.update_counts();
    escaped
}

/// Mirror of [`join_right`]: grafts `left` (a shallower subtree) onto
/// the leftmost spine of `node`.
pub(crate) fn join_left<K, V, P>(
    node: &mut BTreeNode<K, V, P>,
    left: NodePtr<K, V, P>,
    separator: (K, V),
) -> Option<Splinter<K, V, P>>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    debug_assert!(node.depth > left.depth);
    let splinter = if node.children[0].depth == left.depth {
        let mut left = left;
        let mut combined = BTreeNode::take(&mut left);
        let first = BTreeNode::take(&mut node.children[0]);
        let splinter = concatenate(&mut combined, separator, first);
        node.children[0] = SharedPointer::new(combined);
        splinter
    } else {
        join_left(SharedPointer::make_mut(&mut node.children[0]), left, separator)
    };
    let escaped = splinter.and_then(|splinter| {
        if node.is_full() {
            Some(split_inserting(node, 0, splinter.separator, Some(splinter.right)))
        } else {
            node.insert_entry_at(0, splinter.separator, Some(splinter.right));
            None
        }
    });
    node.update_counts();
    escaped
}
