//! Read-only traversals: lookup and positional queries.

use archery::SharedPointerKind;

use crate::hamt::node::HamtNode;
use crate::hash_path::HashPath;

/// Finds the entry for `key` in the subtree rooted at `node`.
pub(crate) fn get_recursive<'a, K, V, P>(
    node: &'a HamtNode<K, V, P>,
    key: &K,
    path: HashPath,
) -> Option<&'a (K, V)>
where
    K: Eq,
    P: SharedPointerKind,
{
    match node {
        HamtNode::Collision { hash, items } => {
            if *hash != path.hash() {
                return None;
            }
            items.iter().find(|(k, _)| k == key)
        }
        HamtNode::Bitmap {
            item_map,
            child_map,
            items,
            children,
            ..
        } => {
            let bucket = path.current_bucket();
            if item_map.contains(bucket) {
                let entry = &items[item_map.offset_of(bucket)];
                if entry.0 == *key { Some(entry) } else { None }
            } else if child_map.contains(bucket) {
                get_recursive(&children[child_map.offset_of(bucket)], key, path.descend())
            } else {
                None
            }
        }
    }
}

/// Position of `key` in iteration order, if present.
///
/// A node contributes its inline entries first, then its children's
/// subtrees in bucket order; the position accumulates every entry left
/// of the descent at each level.
pub(crate) fn index_of_recursive<K, V, P>(
    node: &HamtNode<K, V, P>,
    key: &K,
    path: HashPath,
) -> Option<usize>
where
    K: Eq,
    P: SharedPointerKind,
{
    match node {
        HamtNode::Collision { hash, items } => {
            if *hash != path.hash() {
                return None;
            }
            items.iter().position(|(k, _)| k == key)
        }
        HamtNode::Bitmap {
            item_map,
            child_map,
            items,
            children,
            ..
        } => {
            let bucket = path.current_bucket();
            if item_map.contains(bucket) {
                let offset = item_map.offset_of(bucket);
                if items[offset].0 == *key {
                    Some(offset)
                } else {
                    None
                }
            } else if child_map.contains(bucket) {
                let child_offset = child_map.offset_of(bucket);
                let mut skipped = items.len();
                for child in &children[..child_offset] {
                    skipped += child.count();
                }
                index_of_recursive(&children[child_offset], key, path.descend())
                    .map(|position| skipped + position)
            } else {
                None
            }
        }
    }
}

/// Entry at `position` in iteration order. The caller bounds-checks.
pub(crate) fn item_at_recursive<K, V, P>(node: &HamtNode<K, V, P>, position: usize) -> &(K, V)
where
    P: SharedPointerKind,
{
    match node {
        HamtNode::Collision { items, .. } => &items[position],
        HamtNode::Bitmap {
            items, children, ..
        } => {
            if position < items.len() {
                return &items[position];
            }
            let mut remaining = position - items.len();
            for child in children {
                if remaining < child.count() {
                    return item_at_recursive(child, remaining);
                }
                remaining -= child.count();
            }
            unreachable!("position exceeds the subtree count")
        }
    }
}
