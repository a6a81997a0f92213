//! Hash-path slicing for trie descent.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error;

/// Bits consumed per trie level (5 → 32-way branching).
pub const BITS_PER_LEVEL: u32 = 5;

/// Maximum bit-shift at which a bucket can still be extracted from a
/// 64-bit hash (depth 12; the last level uses the top 4 bits).
pub const MAX_SHIFT: u32 = 60;

/// Computes the 64-bit hash of a value with the process-wide seed.
///
/// `DefaultHasher::new()` uses fixed keys, so every tree built in the
/// same process sees the same hash for the same key — a prerequisite for
/// structural equality and sharing across trees.
#[must_use]
pub fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// A position along the 5-bit digits of a key hash.
///
/// The trie consumes the hash low bits first: the bucket at depth `d`
/// is bits `[5d, 5d + 5)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashPath {
    hash: u64,
    shift: u32,
}

impl HashPath {
    /// Starts a path at the root level for `key`.
    #[must_use]
    pub fn new<K: Hash + ?Sized>(key: &K) -> Self {
        Self::with_hash(hash_one(key))
    }

    /// Starts a path at the root level for a precomputed hash.
    #[must_use]
    pub const fn with_hash(hash: u64) -> Self {
        Self { hash, shift: 0 }
    }

    /// The full hash value.
    #[must_use]
    pub const fn hash(self) -> u64 {
        self.hash
    }

    /// The bucket this path addresses at the current level.
    ///
    /// # Panics
    ///
    /// Panics when the path has descended past the hash width. Reaching
    /// this state outside a collision node means the `Hash`
    /// implementation is degenerate.
    #[must_use]
    pub fn current_bucket(self) -> u32 {
        self.bucket_of(self.hash)
    }

    /// The bucket another hash occupies at this path's level.
    ///
    /// # Panics
    ///
    /// Panics when the path has descended past the hash width.
    #[must_use]
    pub fn bucket_of(self, hash: u64) -> u32 {
        if self.shift > MAX_SHIFT {
            error::out_of_hash_bits();
        }
        ((hash >> self.shift) & 0x1F) as u32
    }

    /// The path one level deeper.
    #[must_use]
    pub const fn descend(self) -> Self {
        Self {
            hash: self.hash,
            shift: self.shift + BITS_PER_LEVEL,
        }
    }

    /// `true` while a bucket can still be extracted at this level.
    #[must_use]
    pub const fn has_bits(self) -> bool {
        self.shift <= MAX_SHIFT
    }

    /// `true` at the root level.
    #[must_use]
    pub const fn is_at_root(self) -> bool {
        self.shift == 0
    }

    /// The same hash repositioned at the root level.
    ///
    /// Used when a lone surviving entry is re-homed at the bucket its
    /// full hash implies.
    #[must_use]
    pub const fn top(self) -> Self {
        Self {
            hash: self.hash,
            shift: 0,
        }
    }
}
