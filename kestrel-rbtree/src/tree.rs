//! Tree root, linking, insertion fix-up and replacement

use core::cmp::Ordering;
use core::ptr::{self, NonNull};

use kestrel_ffi::{KernelError, KernelResult};

use crate::iter::Iter;
use crate::node::{extreme, is_red, left_deepest, RbColor, RbDir, RbNode};

/// Red-Black tree root
///
/// Holds a single non-owning pointer to the top node. Every element linked
/// below it must stay alive (and must not move) until it is removed again.
#[repr(C)]
#[derive(Debug)]
pub struct RbRoot {
    pub rb_node: *mut RbNode,
}

// SAFETY: see the impl on `RbNode`. The root is plain pointer data.
unsafe impl Send for RbRoot {}

impl Default for RbRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl RbRoot {
    /// Create a new empty tree
    pub const fn new() -> Self {
        Self {
            rb_node: ptr::null_mut(),
        }
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.rb_node.is_null()
    }

    /// Leftmost node, `None` on an empty tree
    ///
    /// # Safety
    /// All linked nodes must be alive.
    pub unsafe fn first(&self) -> Option<NonNull<RbNode>> {
        if self.rb_node.is_null() {
            return None;
        }
        Some(unsafe { extreme(self.rb_node, RbDir::Left) })
    }

    /// Rightmost node, `None` on an empty tree
    ///
    /// # Safety
    /// All linked nodes must be alive.
    pub unsafe fn last(&self) -> Option<NonNull<RbNode>> {
        if self.rb_node.is_null() {
            return None;
        }
        Some(unsafe { extreme(self.rb_node, RbDir::Right) })
    }

    /// First node of a post-order walk, see [`RbNode::next_postorder`]
    ///
    /// # Safety
    /// All linked nodes must be alive.
    pub unsafe fn first_postorder(&self) -> Option<NonNull<RbNode>> {
        if self.rb_node.is_null() {
            return None;
        }
        Some(unsafe { left_deepest(self.rb_node) })
    }

    /// Ordered, double-ended walk over the linked nodes
    ///
    /// # Safety
    /// All linked nodes must be alive, and the tree must not be mutated while
    /// the iterator is in use.
    pub unsafe fn iter(&self) -> Iter<'_> {
        unsafe { Iter::new(self) }
    }

    /// Attach a detached node below `parent` in slot `dir`
    ///
    /// With a null `parent` the node becomes the root. The node is reset to
    /// red with no children, which is what [`RbRoot::insert_fixup`] expects.
    /// The slot must be empty; finding it is the caller's descent.
    ///
    /// # Safety
    /// `parent` must be null or a node of this tree with an empty `dir` slot.
    pub unsafe fn link_node(
        &mut self,
        node: *mut RbNode,
        parent: *mut RbNode,
        dir: RbDir,
    ) -> KernelResult<()> {
        if node.is_null() {
            return Err(KernelError::EINVAL);
        }

        unsafe {
            (*node).rb_parent = parent;
            (*node).rb_color = RbColor::Red;
            (*node).rb_child = [ptr::null_mut(); 2];

            if parent.is_null() {
                self.rb_node = node;
            } else {
                (*parent).set_child(dir, node);
            }
        }

        Ok(())
    }

    /// Insert a node, descending with `compare`
    ///
    /// `compare(new, existing)` orders the new node against nodes already in
    /// the tree. Nodes comparing equal are placed to the right, so equal keys
    /// come out in insertion order.
    ///
    /// # Safety
    /// `node` must be detached, alive and outlive its membership; `compare`
    /// must be a consistent total order over the linked nodes.
    pub unsafe fn insert<F>(&mut self, node: *mut RbNode, compare: F) -> KernelResult<()>
    where
        F: Fn(*const RbNode, *const RbNode) -> Ordering,
    {
        if node.is_null() {
            return Err(KernelError::EINVAL);
        }

        let mut parent = ptr::null_mut();
        let mut dir = RbDir::Left;
        let mut link = self.rb_node;

        // Find insertion point
        while !link.is_null() {
            parent = link;
            dir = match compare(node, link) {
                Ordering::Less => RbDir::Left,
                _ => RbDir::Right,
            };
            link = unsafe { (*link).child(dir) };
        }

        unsafe {
            self.link_node(node, parent, dir)?;
            self.insert_fixup(node)
        }
    }

    /// Look a node up
    ///
    /// `f(node)` returns how the sought key orders against `node`: `Less`
    /// descends left, `Greater` right, `Equal` stops.
    ///
    /// # Safety
    /// All linked nodes must be alive.
    pub unsafe fn find<F>(&self, f: F) -> Option<NonNull<RbNode>>
    where
        F: Fn(&RbNode) -> Ordering,
    {
        let mut node = self.rb_node;

        while let Some(current) = NonNull::new(node) {
            let current_ref = unsafe { current.as_ref() };
            node = match f(current_ref) {
                Ordering::Less => current_ref.left(),
                Ordering::Greater => current_ref.right(),
                Ordering::Equal => return Some(current),
            };
        }

        None
    }

    /// Rebalance tree after insertion
    ///
    /// `node` has just been linked (see [`RbRoot::link_node`]) and is red.
    /// Restores the red-black invariants with at most two rotations.
    ///
    /// # Safety
    /// `node` must be linked into this tree and still red; the call is not
    /// idempotent.
    pub unsafe fn insert_fixup(&mut self, node: *mut RbNode) -> KernelResult<()> {
        if node.is_null() {
            return Err(KernelError::EINVAL);
        }

        tracing::trace!(node = ?node, "insert fixup");

        unsafe { self.insert_color(node) };
        self.verify();
        Ok(())
    }

    unsafe fn insert_color(&mut self, mut node: *mut RbNode) {
        unsafe {
            let mut parent = (*node).rb_parent;

            // Loop invariant: node is red.
            loop {
                if parent.is_null() {
                    // First node, or case 1 recursed all the way up.
                    (*node).rb_color = RbColor::Black;
                    break;
                }

                if (*parent).is_black() {
                    break;
                }

                // A red parent is never the root, so the grandparent exists.
                let gparent = (*parent).rb_parent;
                let side = if (*gparent).right() == parent {
                    RbDir::Right
                } else {
                    RbDir::Left
                };

                let uncle = (*gparent).child(side.opposite());
                if is_red(uncle) {
                    // Case 1: color flip, then recurse at the grandparent.
                    //
                    //       G            g
                    //      / \          / \
                    //     p   u  -->   P   U
                    //    /            /
                    //   n            n
                    (*uncle).rb_color = RbColor::Black;
                    (*parent).rb_color = RbColor::Black;
                    (*gparent).rb_color = RbColor::Red;
                    node = gparent;
                    parent = (*node).rb_parent;
                    continue;
                }

                let mut inner = (*parent).child(side.opposite());
                if node == inner {
                    // Case 2: node is the inner grandchild, rotate at parent.
                    //
                    //      G             G
                    //     / \           / \
                    //    p   U  -->    n   U
                    //     \           /
                    //      n         p
                    inner = (*node).child(side);
                    (*parent).set_child(side.opposite(), inner);
                    (*node).set_child(side, parent);
                    if !inner.is_null() {
                        (*inner).rb_parent = parent;
                    }
                    (*parent).rb_parent = node;
                    parent = node;
                    inner = (*node).child(side.opposite());
                }

                // Case 3: node is the outer grandchild, rotate at grandparent.
                //
                //        G           P
                //       / \         / \
                //      p   U  -->  n   g
                //     /                 \
                //    n                   U
                (*gparent).set_child(side, inner);
                (*parent).set_child(side.opposite(), gparent);
                if !inner.is_null() {
                    (*inner).rb_parent = gparent;
                }
                self.rotate_set_parents(gparent, parent, RbColor::Red);
                break;
            }
        }
    }

    /// Put `new` in the place of `old`
    ///
    /// Copies color and links, rewires the parent slot (or the root) and both
    /// children. No rebalancing happens, so `new` must order exactly where
    /// `old` did. `old` is left holding stale links.
    ///
    /// # Safety
    /// `old` must be linked into this tree, `new` must be alive and detached.
    pub unsafe fn replace(&mut self, old: *mut RbNode, new: *mut RbNode) -> KernelResult<()> {
        if old.is_null() || new.is_null() {
            return Err(KernelError::EINVAL);
        }

        tracing::debug!(old = ?old, new = ?new, "replace node");

        unsafe {
            let parent = (*old).rb_parent;
            self.change_child(old, new, parent);

            for child in (*old).rb_child {
                if !child.is_null() {
                    (*child).rb_parent = new;
                }
            }

            (*new).rb_parent = parent;
            (*new).rb_color = (*old).rb_color;
            (*new).rb_child = (*old).rb_child;
        }

        self.verify();
        Ok(())
    }

    /// Point whatever referenced `old` (its parent's slot or the root) at `new`
    ///
    /// # Safety
    /// `parent` must be `old`'s parent (null for the root).
    pub(crate) unsafe fn change_child(
        &mut self,
        old: *mut RbNode,
        new: *mut RbNode,
        parent: *mut RbNode,
    ) {
        if parent.is_null() {
            self.rb_node = new;
            return;
        }

        unsafe {
            if (*parent).left() == old {
                (*parent).set_child(RbDir::Left, new);
            } else {
                (*parent).set_child(RbDir::Right, new);
            }
        }
    }

    /// Finish a rotation that lifted `new` above `old`
    ///
    /// `new` takes over `old`'s parent and color; `old` hangs below `new` with
    /// `color`.
    ///
    /// # Safety
    /// Child links of `old` and `new` must already describe the rotated shape.
    pub(crate) unsafe fn rotate_set_parents(
        &mut self,
        old: *mut RbNode,
        new: *mut RbNode,
        color: RbColor,
    ) {
        unsafe {
            let parent = (*old).rb_parent;
            (*new).rb_parent = parent;
            (*new).rb_color = (*old).rb_color;
            (*old).rb_parent = new;
            (*old).rb_color = color;
            self.change_child(old, new, parent);
        }
    }

    #[inline]
    pub(crate) fn verify(&self) {
        #[cfg(feature = "verify")]
        {
            // SAFETY: only reached at the end of a public operation, when the
            // caller's contract already guarantees every linked node is alive.
            let result = unsafe { crate::check::validate(self) };
            debug_assert!(result.is_ok(), "red-black invariant broken: {:?}", result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_address(a: *const RbNode, b: *const RbNode) -> Ordering {
        (a as usize).cmp(&(b as usize))
    }

    #[test]
    fn test_rb_root_empty() {
        let root = RbRoot::new();
        assert!(root.is_empty());
        unsafe {
            assert!(root.first().is_none());
            assert!(root.last().is_none());
            assert!(root.first_postorder().is_none());
        }
    }

    #[test]
    fn test_first_insert_becomes_black_root() {
        let mut root = RbRoot::new();
        let mut node = RbNode::new();
        let ptr = &mut node as *mut RbNode;

        unsafe {
            root.link_node(ptr, ptr::null_mut(), RbDir::Left).unwrap();
            root.insert_fixup(ptr).unwrap();
        }

        assert_eq!(root.rb_node, ptr);
        assert!(node.is_black());
        assert!(node.parent().is_null());
    }

    #[test]
    fn test_null_arguments_are_rejected() {
        let mut root = RbRoot::new();
        let mut node = RbNode::new();

        unsafe {
            assert_eq!(root.insert_fixup(ptr::null_mut()), Err(KernelError::EINVAL));
            assert_eq!(
                root.link_node(ptr::null_mut(), ptr::null_mut(), RbDir::Left),
                Err(KernelError::EINVAL)
            );
            assert_eq!(root.insert(ptr::null_mut(), by_address), Err(KernelError::EINVAL));
            assert_eq!(
                root.replace(ptr::null_mut(), &mut node),
                Err(KernelError::EINVAL)
            );
            assert_eq!(
                root.replace(&mut node, ptr::null_mut()),
                Err(KernelError::EINVAL)
            );
        }

        // Rejected calls leave the tree alone.
        assert!(root.is_empty());
    }

    #[test]
    fn test_ascending_inserts_rotate() {
        let mut root = RbRoot::new();
        let mut nodes = [RbNode::new(), RbNode::new(), RbNode::new()];
        let base = nodes.as_mut_ptr();

        // Address order is ascending, so this is the degenerate sorted case.
        unsafe {
            for i in 0..3 {
                root.insert(base.add(i), by_address).unwrap();
            }

            // Case 3 lifted the middle node.
            assert_eq!(root.rb_node, base.add(1));
            assert!((*base.add(1)).is_black());
            assert!((*base.add(0)).is_red());
            assert!((*base.add(2)).is_red());
            assert_eq!((*base.add(0)).parent(), base.add(1));
            assert_eq!((*base.add(2)).parent(), base.add(1));
        }
    }

    #[test]
    fn test_uncle_red_recolors() {
        let mut root = RbRoot::new();
        let mut nodes = [RbNode::new(), RbNode::new(), RbNode::new(), RbNode::new()];
        let base = nodes.as_mut_ptr();

        unsafe {
            for i in [1, 0, 2, 3] {
                root.insert(base.add(i), by_address).unwrap();
            }

            // The fourth insert saw a red uncle: both children flipped black.
            assert_eq!(root.rb_node, base.add(1));
            assert!((*base.add(0)).is_black());
            assert!((*base.add(2)).is_black());
            assert!((*base.add(3)).is_red());
        }
    }

    #[test]
    fn test_replace_root() {
        let mut root = RbRoot::new();
        let mut nodes = [RbNode::new(), RbNode::new(), RbNode::new()];
        let base = nodes.as_mut_ptr();
        let mut stand_in = RbNode::new();
        let stand_in_ptr = &mut stand_in as *mut RbNode;

        unsafe {
            for i in 0..3 {
                root.insert(base.add(i), by_address).unwrap();
            }
            root.replace(base.add(1), stand_in_ptr).unwrap();

            assert_eq!(root.rb_node, stand_in_ptr);
            assert!((*stand_in_ptr).is_black());
            assert_eq!((*stand_in_ptr).left(), base.add(0));
            assert_eq!((*stand_in_ptr).right(), base.add(2));
            assert_eq!((*base.add(0)).parent(), stand_in_ptr);
            assert_eq!((*base.add(2)).parent(), stand_in_ptr);
        }
    }

    #[test]
    fn test_find_by_address() {
        let mut root = RbRoot::new();
        let mut nodes = [RbNode::new(), RbNode::new(), RbNode::new(), RbNode::new()];
        let base = nodes.as_mut_ptr();

        unsafe {
            for i in [2, 0, 3, 1] {
                root.insert(base.add(i), by_address).unwrap();
            }

            let wanted = base.add(3) as usize;
            let found = root.find(|node| wanted.cmp(&(node as *const RbNode as usize)));
            assert_eq!(found.map(NonNull::as_ptr), Some(base.add(3)));

            let missing = root.find(|_| Ordering::Less);
            assert!(missing.is_none());
        }
    }
}
