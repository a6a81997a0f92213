mod bitmap;
mod btree_basic;
mod btree_index;
mod btree_join;
mod hamt_basic;
mod hamt_collision;
mod path_stack;
