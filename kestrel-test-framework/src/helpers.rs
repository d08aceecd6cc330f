//! Owning element pool for driving a tree from safe code

use std::ptr::NonNull;

use kestrel_rbtree::check::{validate, RbStats, RbViolation};
use kestrel_rbtree::{KernelError, KernelResult, RbEntry, RbNode, RbRoot};

/// A tree plus every element ever allocated for it
///
/// Elements are heap-allocated and only freed when the pool is dropped, so
/// removed or replaced elements stay valid for the pool's whole lifetime. All
/// elements live in exactly one pool and one tree, which is what makes the
/// unsafe calls below sound.
#[derive(Debug, Default)]
pub struct EntryPool {
    root: RbRoot,
    owned: Vec<NonNull<RbEntry<u64>>>,
}

// SAFETY: the pool exclusively owns every element its tree links to.
unsafe impl Send for EntryPool {}

impl EntryPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &RbRoot {
        &self.root
    }

    /// Raw root for calls through the C interface
    pub fn root_ptr(&mut self) -> *mut RbRoot {
        &mut self.root
    }

    fn alloc(&mut self, value: u64) -> NonNull<RbEntry<u64>> {
        let entry = NonNull::from(Box::leak(Box::new(RbEntry::new(value))));
        self.owned.push(entry);
        entry
    }

    fn value_of(node: NonNull<RbNode>) -> u64 {
        // SAFETY: every node in this pool's tree belongs to an `RbEntry<u64>`
        // the pool keeps alive.
        unsafe { *RbEntry::<u64>::from_node(node).value() }
    }

    /// Allocate an element and insert it by value
    pub fn insert(&mut self, value: u64) -> KernelResult<()> {
        let entry = self.alloc(value);
        unsafe { self.root.insert_entry(entry.as_ptr()) }
    }

    /// Remove one element equal to `value`
    pub fn remove_value(&mut self, value: u64) -> KernelResult<()> {
        let entry = unsafe { self.root.find_entry(&value) }.ok_or(KernelError::ENOENT)?;
        unsafe { self.root.remove_entry(entry.as_ptr()) }
    }

    fn remove_node(&mut self, node: NonNull<RbNode>) -> KernelResult<u64> {
        let value = Self::value_of(node);
        unsafe { self.root.remove(node.as_ptr())? };
        Ok(value)
    }

    /// Remove the smallest element, returning its value
    pub fn pop_first(&mut self) -> KernelResult<Option<u64>> {
        match unsafe { self.root.first() } {
            Some(node) => self.remove_node(node).map(Some),
            None => Ok(None),
        }
    }

    /// Remove the largest element, returning its value
    pub fn pop_last(&mut self) -> KernelResult<Option<u64>> {
        match unsafe { self.root.last() } {
            Some(node) => self.remove_node(node).map(Some),
            None => Ok(None),
        }
    }

    /// Remove whichever element currently sits at the root
    pub fn pop_root(&mut self) -> KernelResult<Option<u64>> {
        match NonNull::new(self.root.rb_node) {
            Some(node) => self.remove_node(node).map(Some),
            None => Ok(None),
        }
    }

    /// Swap every linked element for a fresh one holding `value + shift`
    ///
    /// A uniform shift keeps the relative order, so the tree stays sorted
    /// once every element has been swapped.
    pub fn replace_all(&mut self, shift: u64) -> KernelResult<()> {
        let nodes: Vec<NonNull<RbNode>> = unsafe { self.root.iter().collect() };

        for node in nodes {
            let fresh = self.alloc(Self::value_of(node) + shift);
            unsafe {
                self.root
                    .replace(node.as_ptr(), RbEntry::node_ptr(fresh.as_ptr()))?;
            }
        }

        Ok(())
    }

    /// Values in order, through the double-ended iterator
    pub fn values(&self) -> Vec<u64> {
        unsafe { self.root.iter().map(Self::value_of).collect() }
    }

    /// Values from last to first, stepping with `prev`
    pub fn values_backwards(&self) -> Vec<u64> {
        let mut out = Vec::new();
        let mut cursor = unsafe { self.root.last() };
        while let Some(node) = cursor {
            out.push(Self::value_of(node));
            cursor = unsafe { node.as_ref().prev() };
        }
        out
    }

    /// Value at the root, if any
    pub fn root_value(&self) -> Option<u64> {
        NonNull::new(self.root.rb_node).map(Self::value_of)
    }

    pub fn validate(&self) -> Result<RbStats, RbViolation> {
        unsafe { validate(&self.root) }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl Drop for EntryPool {
    fn drop(&mut self) {
        for entry in self.owned.drain(..) {
            // SAFETY: allocated by `alloc` via `Box::leak`, freed only here.
            unsafe { drop(Box::from_raw(entry.as_ptr())) };
        }
    }
}
