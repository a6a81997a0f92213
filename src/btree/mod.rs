//! Copy-on-write B-tree engine.
//!
//! A [`BTreeMap`] is an order-k B-tree whose nodes carry fixed-capacity
//! key/value/child buffers and cache the entry count of their whole
//! subtree, so positional lookup is O(log n) alongside the usual keyed
//! operations. Nodes are reference-counted: cloning a map shares every
//! node, and mutation copies exactly the nodes on the touched path that
//! are still shared. A [`Cursor`] moves the root out of its tree to run
//! bulk edits without re-descending per operation, and a [`BTreeIndex`]
//! is a validated position that outlives single calls but not
//! mutations.

mod cursor;
mod index;
mod iter;
mod map;
mod node;
mod ops;

pub use cursor::Cursor;
pub use index::BTreeIndex;
pub use iter::{Iter, Keys, Values};
pub use map::{BTreeMap, BTreeMapSync};
