//! Elements carrying a payload next to their node
//!
//! The core only ever sees [`RbNode`] pointers. `RbEntry<T>` places the node
//! at offset 0 of a `#[repr(C)]` struct, so a node pointer handed back by a
//! traversal converts to its element with a plain cast.

use core::cmp::Ordering;
use core::ptr::NonNull;

use kestrel_ffi::{KernelError, KernelResult};

use crate::node::RbNode;
use crate::tree::RbRoot;

/// Tree element: an embedded node followed by the caller's value
#[repr(C)]
#[derive(Debug)]
pub struct RbEntry<T> {
    node: RbNode,
    value: T,
}

static_assertions::const_assert_eq!(core::mem::offset_of!(RbEntry<u64>, node), 0);
static_assertions::const_assert_eq!(core::mem::offset_of!(RbEntry<[u8; 3]>, node), 0);

impl<T> RbEntry<T> {
    /// Create an element with a detached node
    pub const fn new(value: T) -> Self {
        Self {
            node: RbNode::new(),
            value,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Mutable access to the payload
    ///
    /// Changing anything that affects the element's order while it is linked
    /// silently breaks the tree.
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn node(&self) -> &RbNode {
        &self.node
    }

    /// Reset the embedded node, e.g. after removal
    pub fn init(&mut self) {
        self.node.init();
    }

    /// The embedded node of the element behind `this`
    ///
    /// Null in, null out.
    pub fn node_ptr(this: *mut Self) -> *mut RbNode {
        this.cast()
    }

    /// Recover the element owning `node`
    ///
    /// # Safety
    /// `node` must be the node of a live `RbEntry<T>` with this very `T`, and
    /// the returned reference must not outlive the element.
    pub unsafe fn from_node<'a>(node: NonNull<RbNode>) -> &'a Self {
        unsafe { node.cast::<Self>().as_ref() }
    }

    /// Pointer flavour of [`RbEntry::from_node`]
    pub fn from_node_ptr(node: NonNull<RbNode>) -> NonNull<Self> {
        node.cast()
    }
}

impl RbRoot {
    /// Insert an element ordered by its value
    ///
    /// Equal values keep insertion order.
    ///
    /// # Safety
    /// Every element linked into this tree must be a live `RbEntry<T>`;
    /// `entry` must be detached and stay alive (and in place) while linked.
    pub unsafe fn insert_entry<T: Ord>(&mut self, entry: *mut RbEntry<T>) -> KernelResult<()> {
        if entry.is_null() {
            return Err(KernelError::EINVAL);
        }

        unsafe {
            self.insert(RbEntry::node_ptr(entry), |new, existing| {
                let new = &*(new as *const RbEntry<T>);
                let existing = &*(existing as *const RbEntry<T>);
                new.value.cmp(&existing.value)
            })
        }
    }

    /// Find an element whose value equals `key`
    ///
    /// With duplicates, any one of the equal elements may be returned.
    ///
    /// # Safety
    /// Every element linked into this tree must be a live `RbEntry<T>`.
    pub unsafe fn find_entry<T: Ord>(&self, key: &T) -> Option<NonNull<RbEntry<T>>> {
        let node = unsafe {
            self.find(|node| {
                let entry = &*(node as *const RbNode as *const RbEntry<T>);
                key.cmp(&entry.value)
            })
        };
        node.map(RbEntry::from_node_ptr)
    }

    /// Remove an element
    ///
    /// # Safety
    /// `entry` must be null or linked into this tree.
    pub unsafe fn remove_entry<T>(&mut self, entry: *mut RbEntry<T>) -> KernelResult<()> {
        unsafe { self.remove(RbEntry::node_ptr(entry)) }
    }
}

/// Compare two linked elements by value
///
/// # Safety
/// Both nodes must belong to live `RbEntry<T>` elements.
pub unsafe fn cmp_entries<T: Ord>(a: NonNull<RbNode>, b: NonNull<RbNode>) -> Ordering {
    unsafe { RbEntry::<T>::from_node(a).value.cmp(&RbEntry::<T>::from_node(b).value) }
}
