//! Persistent and copy-on-write associative containers.
//!
//! Two engines share one toolbox of word-level utilities:
//!
//! - [`HamtMap`] — a **persistent hash map** backed by a hash array
//!   mapped trie with 32-way bitmap-indexed branching and dedicated
//!   collision nodes. Clones are O(1) and share structure; every
//!   mutation copies only the path it touches.
//! - [`BTreeMap`] — a **sorted map** backed by an order-k B-tree whose
//!   nodes cache their subtree entry counts, giving O(log n) positional
//!   lookup alongside the usual keyed operations. Clones share nodes;
//!   mutation is copy-on-write.
//!
//! Both engines are generic over the reference-counting flavor via
//! [`archery`]: the defaults use `Rc`, and the [`HamtMapSync`] /
//! [`BTreeMapSync`] aliases use `Arc` for use across threads.
//!
//! # Key properties
//!
//! - **Structural sharing**: old versions stay valid and unchanged
//! - **Uniqueness-checked mutation**: in-place when singly owned,
//!   path-copy otherwise
//! - **Positional access**: both maps answer "what is the nth entry"
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # References
//!
//! - Bagwell, 2001 — "Ideal Hash Trees"
//! - Steindorfer & Vinju, 2015 — "Optimizing Hash-Array Mapped Tries
//!   for Fast and Lean Immutable JVM Collections", OOPSLA 2015
//! - Bayer & McCreight, 1972 — "Organization and Maintenance of Large
//!   Ordered Indices"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod bitmap;
pub mod hash_path;
pub mod path_stack;

mod effect;
mod error;

pub mod btree;
pub mod hamt;

#[cfg(test)]
mod tests;

pub use btree::{BTreeIndex, BTreeMap, BTreeMapSync, Cursor};
pub use hamt::{HamtMap, HamtMapSync};
