//! Insert/update core: copy-on-write path descent with two-entry merges.

use std::hash::Hash;
use std::mem;

use archery::{SharedPointer, SharedPointerKind};

use crate::effect::EffectRecord;
use crate::hamt::node::{HamtNode, NodePtr};
use crate::hash_path::{HashPath, hash_one};

/// Inserts or updates `key` in the subtree behind `ptr`.
///
/// Ownership is checked at every level: a uniquely held node is mutated
/// in place, a shared one is copied first. A replaced value is recorded
/// in `effect.previous_value`; a structural change (new key) sets
/// `effect.modified`.
pub(crate) fn update_recursive<K, V, P>(
    ptr: &mut NodePtr<K, V, P>,
    key: K,
    value: V,
    path: HashPath,
    effect: &mut EffectRecord<V>,
) where
    K: Hash + Eq + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    // A collision node reached under a different hash moves one level
    // down, keyed by the bucket its stored hash implies here.
    if let HamtNode::Collision { hash, .. } = &**ptr {
        let stored_hash = *hash;
        if stored_hash != path.hash() {
            let old_bucket = path.bucket_of(stored_hash);
            let new_bucket = path.current_bucket();
            let child = ptr.clone();
            if old_bucket == new_bucket {
                *ptr = SharedPointer::new(HamtNode::child_at(old_bucket, child));
                update_recursive(ptr, key, value, path, effect);
            } else {
                effect.set_modified();
                *ptr = SharedPointer::new(HamtNode::item_and_child(
                    new_bucket,
                    (key, value),
                    old_bucket,
                    child,
                ));
            }
            return;
        }
    }

    let node = SharedPointer::make_mut(ptr);
    match node {
        HamtNode::Collision { items, .. } => {
            if let Some(entry) = items.iter_mut().find(|(k, _)| *k == key) {
                effect.set_previous(mem::replace(&mut entry.1, value));
            } else {
                items.push((key, value));
                effect.set_modified();
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
                if items[offset].0 == key {
                    effect.set_previous(mem::replace(&mut items[offset].1, value));
                } else {
                    // Two distinct keys share this bucket: both move into
                    // a subtree at the divergence level.
                    let existing = items.remove(offset);
                    let existing_hash = hash_one(&existing.0);
                    let subtree = merge_two(
                        existing,
                        existing_hash,
                        (key, value),
                        path.hash(),
                        path.descend(),
                    );
                    item_map.remove(bucket);
                    child_map.insert(bucket);
                    children.insert(child_map.offset_of(bucket), subtree);
                    *count += 1;
                    effect.set_modified();
                }
            } else if child_map.contains(bucket) {
                let offset = child_map.offset_of(bucket);
                update_recursive(&mut children[offset], key, value, path.descend(), effect);
                if effect.is_modified() {
                    *count += 1;
                }
            } else {
                item_map.insert(bucket);
                items.insert(item_map.offset_of(bucket), (key, value));
                *count += 1;
                effect.set_modified();
            }
        }
    }
}

/// Builds the smallest subtree separating two entries whose buckets
/// collide above `path`'s level.
///
/// Descends until the hash fragments diverge; fully equal hashes land in
/// a collision node immediately.
fn merge_two<K, V, P>(
    item_a: (K, V),
    hash_a: u64,
    item_b: (K, V),
    hash_b: u64,
    path: HashPath,
) -> NodePtr<K, V, P>
where
    P: SharedPointerKind,
{
    if hash_a == hash_b {
        return SharedPointer::new(HamtNode::collision(hash_a, vec![item_a, item_b]));
    }
    let bucket_a = path.bucket_of(hash_a);
    let bucket_b = path.bucket_of(hash_b);
    if bucket_a == bucket_b {
        let child = merge_two(item_a, hash_a, item_b, hash_b, path.descend());
        SharedPointer::new(HamtNode::child_at(bucket_a, child))
    } else {
        SharedPointer::new(HamtNode::pair(bucket_a, item_a, bucket_b, item_b))
    }
}
