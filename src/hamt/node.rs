//! HAMT node variants, constructors, and subtree counts.

use archery::{SharedPointer, SharedPointerKind};

use crate::bitmap::Bitmap32;

pub(crate) type NodePtr<K, V, P> = SharedPointer<HamtNode<K, V, P>, P>;

/// One trie node: bitmap-indexed branching or a full-hash collision
/// bucket.
///
/// In a bitmap node the entry stored at bucket `b` lives at dense offset
/// `item_map.offset_of(b)`, children likewise under `child_map`, and the
/// two maps never overlap.
pub(crate) enum HamtNode<K, V, P: SharedPointerKind> {
    Bitmap {
        item_map: Bitmap32,
        child_map: Bitmap32,
        /// Inline entries, dense in bucket order.
        items: Vec<(K, V)>,
        /// Child subtrees, dense in bucket order.
        children: Vec<NodePtr<K, V, P>>,
        /// Entries reachable through this subtree.
        count: usize,
    },
    /// Entries sharing one full 64-bit hash. Holds at least two entries
    /// except transiently inside a removal.
    Collision { hash: u64, items: Vec<(K, V)> },
}

impl<K, V, P: SharedPointerKind> HamtNode<K, V, P> {
    /// A node holding exactly one inline entry at `bucket`.
    pub(crate) fn single_item(bucket: u32, item: (K, V)) -> Self {
        Self::Bitmap {
            item_map: Bitmap32::just(bucket),
            child_map: Bitmap32::EMPTY,
            items: vec![item],
            children: Vec::new(),
            count: 1,
        }
    }

    /// A node holding two inline entries at distinct buckets.
    pub(crate) fn pair(bucket_a: u32, item_a: (K, V), bucket_b: u32, item_b: (K, V)) -> Self {
        debug_assert_ne!(bucket_a, bucket_b);
        let items = if bucket_a < bucket_b {
            vec![item_a, item_b]
        } else {
            vec![item_b, item_a]
        };
        Self::Bitmap {
            item_map: Bitmap32::just(bucket_a).union(Bitmap32::just(bucket_b)),
            child_map: Bitmap32::EMPTY,
            items,
            children: Vec::new(),
            count: 2,
        }
    }

    /// A node holding one child subtree at `bucket` and nothing else.
    pub(crate) fn child_at(bucket: u32, child: NodePtr<K, V, P>) -> Self {
        let count = child.count();
        Self::Bitmap {
            item_map: Bitmap32::EMPTY,
            child_map: Bitmap32::just(bucket),
            items: Vec::new(),
            children: vec![child],
            count,
        }
    }

    /// A node holding one inline entry and one child subtree at distinct
    /// buckets.
    pub(crate) fn item_and_child(
        item_bucket: u32,
        item: (K, V),
        child_bucket: u32,
        child: NodePtr<K, V, P>,
    ) -> Self {
        debug_assert_ne!(item_bucket, child_bucket);
        let count = 1 + child.count();
        Self::Bitmap {
            item_map: Bitmap32::just(item_bucket),
            child_map: Bitmap32::just(child_bucket),
            items: vec![item],
            children: vec![child],
            count,
        }
    }

    /// A collision node over entries sharing `hash`.
    pub(crate) fn collision(hash: u64, items: Vec<(K, V)>) -> Self {
        debug_assert!(items.len() >= 2);
        Self::Collision { hash, items }
    }

    /// Entries reachable through this subtree.
    pub(crate) fn count(&self) -> usize {
        match self {
            Self::Bitmap { count, .. } => *count,
            Self::Collision { items, .. } => items.len(),
        }
    }

    pub(crate) fn is_collision(&self) -> bool {
        matches!(self, Self::Collision { .. })
    }

    /// The single entry of a one-entry node.
    pub(crate) fn lone_item(&self) -> &(K, V) {
        debug_assert_eq!(self.count(), 1);
        match self {
            Self::Bitmap { items, .. } | Self::Collision { items, .. } => &items[0],
        }
    }
}

// Manual impl: children clone by pointer bump, so no bound on P is
// wanted and only K/V need Clone.
impl<K: Clone, V: Clone, P: SharedPointerKind> Clone for HamtNode<K, V, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Bitmap {
                item_map,
                child_map,
                items,
                children,
                count,
            } => Self::Bitmap {
                item_map: *item_map,
                child_map: *child_map,
                items: items.clone(),
                children: children.clone(),
                count: *count,
            },
            Self::Collision { hash, items } => Self::Collision {
                hash: *hash,
                items: items.clone(),
            },
        }
    }
}

#[cfg(test)]
impl<K: std::hash::Hash, V, P: SharedPointerKind> HamtNode<K, V, P> {
    /// Walks the subtree asserting the structural invariants: disjoint
    /// bitmaps, dense arrays matching their bitmaps, bucket placement
    /// consistent with key hashes, cached counts, and collision nodes
    /// agreeing on one hash.
    pub(crate) fn check_invariants(&self, shift: u32) {
        use crate::hash_path::{BITS_PER_LEVEL, MAX_SHIFT, hash_one};

        match self {
            Self::Bitmap {
                item_map,
                child_map,
                items,
                children,
                count,
            } => {
                assert!(item_map.is_disjoint(*child_map), "overlapping bitmaps");
                assert_eq!(items.len(), item_map.len());
                assert_eq!(children.len(), child_map.len());
                assert!(shift <= MAX_SHIFT, "bitmap node below the hash width");
                for (offset, (key, _)) in items.iter().enumerate() {
                    let bucket = item_map.bucket_at(offset);
                    assert_eq!(
                        (hash_one(key) >> shift) & 0x1F,
                        u64::from(bucket),
                        "entry filed under the wrong bucket",
                    );
                }
                let mut total = items.len();
                for child in children {
                    child.check_invariants(shift + BITS_PER_LEVEL);
                    total += child.count();
                }
                assert_eq!(*count, total, "cached count out of sync");
            }
            Self::Collision { hash, items } => {
                assert!(items.len() >= 2, "undersized collision node");
                for (key, _) in items {
                    assert_eq!(hash_one(key), *hash, "mixed hashes in a collision node");
                }
            }
        }
    }
}
