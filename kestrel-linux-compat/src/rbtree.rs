//! Linux-compatible red-black tree API adapter
//!
//! Status-returning calls give 0 or `-EINVAL`. Pointer-returning calls give
//! null for a null argument or when there is nothing to return.

use core::ptr::{self, NonNull};

use kestrel_ffi::{c_int, c_uint, KernelError};
use kestrel_rbtree::RbColor;

use crate::error::result_to_errno;

// Re-export core types as Linux-compatible names
pub use kestrel_rbtree::RbNode as rb_node;
pub use kestrel_rbtree::RbRoot as rb_root;

/// Linux-compatible color values
pub const RB_RED: c_uint = RbColor::Red as c_uint;
pub const RB_BLACK: c_uint = RbColor::Black as c_uint;

fn null_argument(func: &'static str) -> c_int {
    tracing::warn!(func, "null argument");
    KernelError::EINVAL.to_errno()
}

fn into_raw(node: Option<NonNull<rb_node>>) -> *mut rb_node {
    node.map_or(ptr::null_mut(), NonNull::as_ptr)
}

/// Reset a node to the detached state (red, no links)
///
/// # Safety
///
/// `node` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn rb_node_init(node: *mut rb_node) -> c_int {
    match unsafe { node.as_mut() } {
        Some(node) => {
            node.init();
            0
        }
        None => null_argument("rb_node_init"),
    }
}

/// Link `node` under `parent` at the slot `rb_link` points to
///
/// `rb_link` is `&root->rb_node` for the first node, otherwise the address of
/// one of `parent`'s child slots, as found by the caller's descent.
///
/// # Safety
///
/// `node` must be valid for writes; `rb_link` must point at an empty slot of
/// `parent` (or at the root slot when `parent` is null).
#[no_mangle]
pub unsafe extern "C" fn rb_link_node(
    node: *mut rb_node,
    parent: *mut rb_node,
    rb_link: *mut *mut rb_node,
) -> c_int {
    if node.is_null() || rb_link.is_null() {
        return null_argument("rb_link_node");
    }

    unsafe {
        (*node).init();
        (*node).set_parent(parent);
        *rb_link = node;
    }
    0
}

/// Rebalance after [`rb_link_node`]
///
/// # Safety
///
/// `node` must have just been linked into `root`.
#[no_mangle]
pub unsafe extern "C" fn rb_balance(root: *mut rb_root, node: *mut rb_node) -> c_int {
    if root.is_null() || node.is_null() {
        return null_argument("rb_balance");
    }
    result_to_errno(unsafe { (*root).insert_fixup(node) })
}

/// Unlink `node` from `root` and rebalance
///
/// # Safety
///
/// `node` must be null or linked into `root`.
#[no_mangle]
pub unsafe extern "C" fn rb_remove(root: *mut rb_root, node: *mut rb_node) -> c_int {
    if root.is_null() || node.is_null() {
        return null_argument("rb_remove");
    }
    result_to_errno(unsafe { (*root).remove(node) })
}

/// Put `new` where `old` is, without rebalancing
///
/// # Safety
///
/// `old` must be linked into `root`; `new` must be detached and sort where
/// `old` does.
#[no_mangle]
pub unsafe extern "C" fn rb_replace(
    root: *mut rb_root,
    old: *mut rb_node,
    new: *mut rb_node,
) -> c_int {
    if root.is_null() || old.is_null() || new.is_null() {
        return null_argument("rb_replace");
    }
    result_to_errno(unsafe { (*root).replace(old, new) })
}

/// Leftmost node
///
/// # Safety
///
/// `root` must be null or a valid tree.
#[no_mangle]
pub unsafe extern "C" fn rb_first(root: *const rb_root) -> *mut rb_node {
    match unsafe { root.as_ref() } {
        Some(root) => into_raw(unsafe { root.first() }),
        None => ptr::null_mut(),
    }
}

/// Rightmost node
///
/// # Safety
///
/// `root` must be null or a valid tree.
#[no_mangle]
pub unsafe extern "C" fn rb_last(root: *const rb_root) -> *mut rb_node {
    match unsafe { root.as_ref() } {
        Some(root) => into_raw(unsafe { root.last() }),
        None => ptr::null_mut(),
    }
}

/// In-order successor
///
/// # Safety
///
/// `node` must be null or linked into a valid tree.
#[no_mangle]
pub unsafe extern "C" fn rb_next(node: *const rb_node) -> *mut rb_node {
    match unsafe { node.as_ref() } {
        Some(node) => into_raw(unsafe { node.next() }),
        None => ptr::null_mut(),
    }
}

/// In-order predecessor
///
/// # Safety
///
/// `node` must be null or linked into a valid tree.
#[no_mangle]
pub unsafe extern "C" fn rb_prev(node: *const rb_node) -> *mut rb_node {
    match unsafe { node.as_ref() } {
        Some(node) => into_raw(unsafe { node.prev() }),
        None => ptr::null_mut(),
    }
}

/// Get color of node
///
/// A null node is an empty subtree and therefore black.
///
/// # Safety
///
/// `node` must be null or a valid pointer
#[no_mangle]
pub unsafe extern "C" fn rb_color(node: *const rb_node) -> c_uint {
    match unsafe { node.as_ref() } {
        Some(node) => node.color() as c_uint,
        None => RB_BLACK,
    }
}

/// Get parent of node
///
/// # Safety
///
/// `node` must be null or a valid pointer
#[no_mangle]
pub unsafe extern "C" fn rb_parent(node: *const rb_node) -> *mut rb_node {
    match unsafe { node.as_ref() } {
        Some(node) => node.parent(),
        None => ptr::null_mut(),
    }
}

/// Check if tree is empty
///
/// # Safety
///
/// `root` must be null or a valid pointer
#[no_mangle]
pub unsafe extern "C" fn rb_empty(root: *const rb_root) -> bool {
    match unsafe { root.as_ref() } {
        Some(root) => root.is_empty(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EINVAL: c_int = -22;

    /// Insert by address, descending through the child slots like C would.
    unsafe fn insert(root: *mut rb_root, node: *mut rb_node) {
        unsafe {
            let mut parent = ptr::null_mut();
            let mut link: *mut *mut rb_node = &mut (*root).rb_node;
            while !(*link).is_null() {
                parent = *link;
                let slot = usize::from((node as usize) >= (parent as usize));
                link = &mut (*parent).rb_child[slot];
            }
            assert_eq!(rb_link_node(node, parent, link), 0);
            assert_eq!(rb_balance(root, node), 0);
        }
    }

    #[test]
    fn test_rb_empty() {
        let root = rb_root::new();
        unsafe {
            assert!(rb_empty(&root));
            assert!(rb_empty(ptr::null()));
            assert!(rb_first(&root).is_null());
            assert!(rb_last(&root).is_null());
        }
    }

    #[test]
    fn test_rb_color() {
        let mut node = rb_node::new();
        unsafe {
            // Initial color is red
            assert_eq!(rb_color(&node), RB_RED);
            assert_eq!(rb_color(ptr::null()), RB_BLACK);

            let mut root = rb_root::new();
            insert(&mut root, &mut node);
            assert_eq!(rb_color(&node), RB_BLACK);
            assert!(rb_parent(&node).is_null());
        }
    }

    #[test]
    fn test_link_balance_walk() {
        let mut root = rb_root::new();
        let mut nodes: [rb_node; 8] = Default::default();
        let base = nodes.as_mut_ptr();

        unsafe {
            for i in [5, 1, 7, 0, 3, 6, 2, 4] {
                insert(&mut root, base.add(i));
            }
            assert!(!rb_empty(&root));
            assert_eq!(rb_first(&root), base.add(0));
            assert_eq!(rb_last(&root), base.add(7));

            let mut node = rb_first(&root);
            for i in 0..8 {
                assert_eq!(node, base.add(i));
                node = rb_next(node);
            }
            assert!(node.is_null());

            let mut node = rb_last(&root);
            for i in (0..8).rev() {
                assert_eq!(node, base.add(i));
                node = rb_prev(node);
            }
            assert!(node.is_null());
        }
    }

    #[test]
    fn test_remove_and_replace() {
        let mut root = rb_root::new();
        let mut nodes: [rb_node; 4] = Default::default();
        let base = nodes.as_mut_ptr();
        let mut spare = rb_node::new();

        unsafe {
            for i in 0..4 {
                insert(&mut root, base.add(i));
            }

            assert_eq!(rb_remove(&mut root, base.add(0)), 0);
            assert_eq!(rb_first(&root), base.add(1));

            assert_eq!(rb_replace(&mut root, base.add(3), &mut spare), 0);
            assert_eq!(rb_last(&root), &mut spare as *mut rb_node);
            assert_eq!(rb_prev(&spare), base.add(2));
        }
    }

    #[test]
    fn test_null_arguments() {
        let mut root = rb_root::new();
        let mut node = rb_node::new();
        let mut slot: *mut rb_node = ptr::null_mut();
        let root_ptr: *mut rb_root = &mut root;
        let node_ptr: *mut rb_node = &mut node;

        unsafe {
            assert_eq!(rb_node_init(ptr::null_mut()), EINVAL);
            assert_eq!(rb_link_node(ptr::null_mut(), ptr::null_mut(), &mut slot), EINVAL);
            assert_eq!(rb_link_node(node_ptr, ptr::null_mut(), ptr::null_mut()), EINVAL);
            assert_eq!(rb_balance(ptr::null_mut(), node_ptr), EINVAL);
            assert_eq!(rb_balance(root_ptr, ptr::null_mut()), EINVAL);
            assert_eq!(rb_remove(ptr::null_mut(), node_ptr), EINVAL);
            assert_eq!(rb_remove(root_ptr, ptr::null_mut()), EINVAL);
            assert_eq!(rb_replace(root_ptr, ptr::null_mut(), node_ptr), EINVAL);
            assert_eq!(rb_replace(ptr::null_mut(), node_ptr, node_ptr), EINVAL);

            assert!(rb_first(ptr::null()).is_null());
            assert!(rb_last(ptr::null()).is_null());
            assert!(rb_next(ptr::null()).is_null());
            assert!(rb_prev(ptr::null()).is_null());
            assert!(rb_parent(ptr::null()).is_null());
        }

        assert!(slot.is_null());
        assert!(root.is_empty());
    }

    #[test]
    fn test_node_init_resets_links() {
        let mut root = rb_root::new();
        let mut nodes: [rb_node; 2] = Default::default();
        let base = nodes.as_mut_ptr();

        unsafe {
            insert(&mut root, base);
            insert(&mut root, base.add(1));
            assert_eq!(rb_remove(&mut root, base.add(1)), 0);

            assert_eq!(rb_node_init(base.add(1)), 0);
            assert_eq!(rb_color(base.add(1)), RB_RED);
            assert!(rb_parent(base.add(1)).is_null());
        }
    }
}
