//! Intrusive red-black tree
//!
//! A port of the Linux kernel's `lib/rbtree.c` design: the caller embeds an
//! [`RbNode`] in its own element, owns and allocates that element, and links
//! it into an [`RbRoot`]. The tree never allocates and never frees; it only
//! rewrites node links and colors.
//!
//! Ordering is the caller's business. Either descend manually and finish with
//! [`RbRoot::link_node`] + [`RbRoot::insert_fixup`], or hand a comparator to
//! [`RbRoot::insert`]. [`RbEntry`] packages a node and an `Ord` value for the
//! common case.
//!
//! Every operation that follows node pointers is `unsafe`: the tree cannot
//! know whether the elements it points at are still alive.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod check;
mod entry;
mod erase;
mod iter;
mod node;
mod tree;

pub use check::{RbStats, RbViolation};
pub use entry::{cmp_entries, RbEntry};
pub use iter::Iter;
pub use kestrel_ffi::{KernelError, KernelResult};
pub use node::{RbColor, RbDir, RbNode};
pub use tree::RbRoot;

static_assertions::assert_eq_size!(RbRoot, usize);
static_assertions::assert_eq_size!(RbNode, [usize; 4]);
static_assertions::assert_eq_align!(RbNode, usize);
