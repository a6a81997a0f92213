//! Removal core: copy-on-write path descent with canonical collapsing.

use std::hash::Hash;

use archery::{SharedPointer, SharedPointerKind};

use crate::effect::EffectRecord;
use crate::hamt::node::{HamtNode, NodePtr};
use crate::hash_path::HashPath;

/// Removes `key` from the subtree behind `ptr`.
///
/// Preconditions: the key is present (the map probes first, so a miss
/// never copies a shared path) and the subtree holds at least two
/// entries (a map down to its last entry drops the root instead).
///
/// Collapsing rules on the way back up:
/// - a collision node left with one entry is re-homed as a single-item
///   bitmap node at the bucket its hash implies at the root level;
/// - a bitmap node left with one entry and no children (not at the
///   root) is re-homed the same way, so an ancestor can inline it;
/// - a child shrunk to a single entry is inlined into this node's item
///   array, unless this node has nothing else — then the singleton is
///   lifted through it;
/// - a bare collision child under a node with nothing else is lifted
///   likewise.
pub(crate) fn remove_recursive<K, V, P>(
    ptr: &mut NodePtr<K, V, P>,
    key: &K,
    path: HashPath,
    effect: &mut EffectRecord<V>,
) where
    K: Hash + Eq + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    let mut replacement: Option<NodePtr<K, V, P>> = None;
    let node = SharedPointer::make_mut(ptr);
    match node {
        HamtNode::Collision { hash, items } => {
            debug_assert_eq!(*hash, path.hash());
            let position = items
                .iter()
                .position(|(k, _)| k == key)
                .expect("key present by precondition");
            let (_, value) = items.remove(position);
            effect.set_previous(value);
            effect.set_modified();
            if items.len() == 1 {
                let survivor = items.pop().expect("one survivor");
                let bucket = HashPath::with_hash(*hash).current_bucket();
                *node = HamtNode::single_item(bucket, survivor);
            }
        }
        HamtNode::Bitmap {
            item_map,
            child_map,
            items,
            children,
            count,
        } => {
            let bucket = path.current_bucket();
            if item_map.contains(bucket) {
                let offset = item_map.offset_of(bucket);
                debug_assert!(items[offset].0 == *key, "key present by precondition");
                let (_, value) = items.remove(offset);
                item_map.remove(bucket);
                *count -= 1;
                effect.set_previous(value);
                effect.set_modified();
                if items.is_empty() && children.len() == 1 && children[0].is_collision() {
                    replacement = Some(children.pop().expect("single child"));
                } else if items.len() == 1 && children.is_empty() && !path.is_at_root() {
                    let survivor = items.pop().expect("one survivor");
                    let top_bucket = HashPath::new(&survivor.0).current_bucket();
                    *node = HamtNode::single_item(top_bucket, survivor);
                }
            } else {
                debug_assert!(child_map.contains(bucket), "key present by precondition");
                let offset = child_map.offset_of(bucket);
                remove_recursive(&mut children[offset], key, path.descend(), effect);
                *count -= 1;
                let lifts = items.is_empty() && children.len() == 1;
                let child = &children[offset];
                if child.count() == 1 {
                    if lifts {
                        replacement = Some(children.pop().expect("single child"));
                    } else {
                        let item = child.lone_item().clone();
                        children.remove(offset);
                        child_map.remove(bucket);
                        item_map.insert(bucket);
                        items.insert(item_map.offset_of(bucket), item);
                    }
                } else if child.is_collision() && lifts {
                    replacement = Some(children.pop().expect("single child"));
                }
            }
        }
    }
    if let Some(child) = replacement {
        *ptr = child;
    }
}
