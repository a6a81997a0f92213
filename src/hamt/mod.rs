//! Persistent hash array mapped trie engine.
//!
//! A [`HamtMap`] is a trie over the 5-bit digits of each key's hash.
//! Interior nodes index their 32 buckets with two disjoint bitmaps (one
//! for inline entries, one for child subtrees); entries whose full
//! 64-bit hashes collide share a dedicated collision node. Nodes are
//! reference-counted and shared between map versions; mutations copy
//! only the path from the root to the touched node, and only when that
//! path is shared.

mod iter;
mod map;
mod node;
mod ops;

pub use iter::{Iter, Keys, Values};
pub use map::{HamtMap, HamtMapSync};
