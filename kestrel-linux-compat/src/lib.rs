//! Linux Kernel ABI Compatibility Adapter
//!
//! C callers see the `rb_*` functions of `<linux/rbtree.h>`, backed by
//! `kestrel-rbtree`. This layer only translates: null checks, errno codes
//! and C names. The tree algorithms live in the core crate.
//!
//! ```text
//! C code
//!      ↓
//! kestrel-linux-compat (rb_* symbols, errno)
//!      ↓
//! kestrel-rbtree (RbRoot / RbNode)
//! ```
//!
//! # Usage
//!
//! ```c
//! struct rb_node **link = &root.rb_node, *parent = NULL;
//! while (*link) {
//!     parent = *link;
//!     link = key < entry_of(parent)->key ? &parent->rb_child[0]
//!                                        : &parent->rb_child[1];
//! }
//! rb_link_node(&entry->node, parent, link);
//! rb_balance(&root, &entry->node);
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(non_camel_case_types)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod rbtree;

pub use error::{errno_to_result, result_to_errno};
pub use rbtree::{rb_node, rb_root};
