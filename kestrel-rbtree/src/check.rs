//! Red-black invariant checker
//!
//! Walks the whole tree, so it is O(n). Used by the test suites and, with the
//! `verify` feature, after every mutation in debug builds.

use core::ptr;

use crate::node::{RbColor, RbNode};
use crate::tree::RbRoot;

/// Shape of a tree that passed validation
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RbStats {
    /// Number of linked nodes
    pub len: usize,
    /// Black nodes on every root-to-leaf path, root included
    pub black_height: usize,
    /// Nodes on the longest root-to-leaf path
    pub height: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RbViolation {
    #[error("root node {0:p} is red")]
    RedRoot(*const RbNode),

    #[error("root node {0:p} has a parent")]
    RootHasParent(*const RbNode),

    #[error("red node {parent:p} has red child {child:p}")]
    RedRed {
        parent: *const RbNode,
        child: *const RbNode,
    },

    #[error("node {node:p} has black height {left} on the left and {right} on the right")]
    BlackHeight {
        node: *const RbNode,
        left: usize,
        right: usize,
    },

    #[error("child {child:p} does not point back to parent {parent:p}")]
    BrokenParentLink {
        parent: *const RbNode,
        child: *const RbNode,
    },
}

/// Check invariants 1-5 plus parent back-links
///
/// # Safety
/// Every linked node must be alive.
pub unsafe fn validate(root: &RbRoot) -> Result<RbStats, RbViolation> {
    let top = root.rb_node;
    if top.is_null() {
        return Ok(RbStats::default());
    }

    unsafe {
        if (*top).is_red() {
            return Err(RbViolation::RedRoot(top));
        }
        if !(*top).rb_parent.is_null() {
            return Err(RbViolation::RootHasParent(top));
        }

        let mut len = 0;
        let (black_height, height) = subtree(top, &mut len)?;
        Ok(RbStats {
            len,
            black_height,
            height,
        })
    }
}

/// Returns `(black_height, height)` of the subtree under `node`.
unsafe fn subtree(node: *const RbNode, len: &mut usize) -> Result<(usize, usize), RbViolation> {
    if node.is_null() {
        return Ok((0, 0));
    }

    *len += 1;

    unsafe {
        let mut heights = [(0, 0); 2];
        for (slot, &child) in heights.iter_mut().zip((*node).rb_child.iter()) {
            if child.is_null() {
                continue;
            }
            if !ptr::eq((*child).rb_parent, node) {
                return Err(RbViolation::BrokenParentLink {
                    parent: node,
                    child,
                });
            }
            if (*node).is_red() && (*child).is_red() {
                return Err(RbViolation::RedRed {
                    parent: node,
                    child,
                });
            }
            *slot = subtree(child, len)?;
        }

        let [(left, left_height), (right, right_height)] = heights;
        if left != right {
            return Err(RbViolation::BlackHeight { node, left, right });
        }

        let own = usize::from((*node).rb_color == RbColor::Black);
        Ok((left + own, 1 + left_height.max(right_height)))
    }
}
