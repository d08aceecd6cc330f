//! In-order iteration over linked nodes

use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::tree::RbRoot;

/// Double-ended in-order walk, created by [`RbRoot::iter`]
///
/// Yields node pointers; recovering the element is up to the caller (see
/// [`RbEntry::from_node`](crate::RbEntry::from_node)).
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    front: Option<NonNull<crate::RbNode>>,
    back: Option<NonNull<crate::RbNode>>,
    _root: PhantomData<&'a RbRoot>,
}

impl<'a> Iter<'a> {
    /// # Safety
    /// See [`RbRoot::iter`].
    pub(crate) unsafe fn new(root: &'a RbRoot) -> Self {
        unsafe {
            Self {
                front: root.first(),
                back: root.last(),
                _root: PhantomData,
            }
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = NonNull<crate::RbNode>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.front?;

        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            // SAFETY: `RbRoot::iter` requires the linked nodes to stay alive
            // and the tree to stay unmodified for the iterator's lifetime.
            self.front = unsafe { current.as_ref().next() };
        }

        Some(current)
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let current = self.back?;

        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            // SAFETY: as in `next`.
            self.back = unsafe { current.as_ref().prev() };
        }

        Some(current)
    }
}

impl FusedIterator for Iter<'_> {}
