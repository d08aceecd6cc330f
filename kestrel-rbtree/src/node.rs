//! Tree node embedded in caller-owned elements

use core::ptr::{self, NonNull};

/// Red-Black tree node color
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RbColor {
    Red = 0,
    Black = 1,
}

/// Child slot of a node
///
/// Every rebalancing case exists in a left and a right flavour. The algorithms
/// are written once against a `RbDir` and its [`opposite`](RbDir::opposite).
#[repr(usize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RbDir {
    Left = 0,
    Right = 1,
}

impl RbDir {
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            RbDir::Left => RbDir::Right,
            RbDir::Right => RbDir::Left,
        }
    }
}

/// Red-Black tree node
///
/// Embedded inside each element. The tree only ever rewrites these fields; it
/// never allocates, moves or frees the surrounding element.
#[repr(C)]
#[derive(Debug)]
pub struct RbNode {
    /// Parent node, null at the root
    pub rb_parent: *mut RbNode,
    pub rb_color: RbColor,
    /// Children indexed by [`RbDir`], null for empty subtrees
    pub rb_child: [*mut RbNode; 2],
}

// SAFETY: a node is plain pointer data. Moving it to another thread is fine as
// long as the owner keeps exclusive access to the whole tree, which the tree
// requires anyway. Nodes are deliberately not `Sync`.
unsafe impl Send for RbNode {}

impl Default for RbNode {
    fn default() -> Self {
        Self::new()
    }
}

impl RbNode {
    /// Create a detached node: red, no parent, no children
    pub const fn new() -> Self {
        Self {
            rb_parent: ptr::null_mut(),
            rb_color: RbColor::Red,
            rb_child: [ptr::null_mut(); 2],
        }
    }

    /// Reset the node to the detached state
    ///
    /// Required before a node that was removed from a tree is linked again.
    pub fn init(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn parent(&self) -> *mut RbNode {
        self.rb_parent
    }

    #[inline]
    pub fn set_parent(&mut self, parent: *mut RbNode) {
        self.rb_parent = parent;
    }

    #[inline]
    pub fn color(&self) -> RbColor {
        self.rb_color
    }

    #[inline]
    pub fn set_color(&mut self, color: RbColor) {
        self.rb_color = color;
    }

    #[inline]
    pub fn is_red(&self) -> bool {
        self.rb_color == RbColor::Red
    }

    #[inline]
    pub fn is_black(&self) -> bool {
        self.rb_color == RbColor::Black
    }

    #[inline]
    pub fn child(&self, dir: RbDir) -> *mut RbNode {
        self.rb_child[dir as usize]
    }

    #[inline]
    pub fn set_child(&mut self, dir: RbDir, child: *mut RbNode) {
        self.rb_child[dir as usize] = child;
    }

    #[inline]
    pub fn left(&self) -> *mut RbNode {
        self.child(RbDir::Left)
    }

    #[inline]
    pub fn right(&self) -> *mut RbNode {
        self.child(RbDir::Right)
    }

    /// In-order successor, or `None` for the last node
    ///
    /// # Safety
    /// The node must be linked into a tree whose nodes are all alive, and the
    /// tree must not be mutated during the call.
    pub unsafe fn next(&self) -> Option<NonNull<RbNode>> {
        unsafe { self.step(RbDir::Right) }
    }

    /// In-order predecessor, or `None` for the first node
    ///
    /// # Safety
    /// Same contract as [`RbNode::next`].
    pub unsafe fn prev(&self) -> Option<NonNull<RbNode>> {
        unsafe { self.step(RbDir::Left) }
    }

    /// Next node of a post-order walk (children before their parent)
    ///
    /// Once a node has been visited its subtree is never looked at again, so
    /// the owner may free each node as soon as this returns its successor.
    ///
    /// # Safety
    /// Same contract as [`RbNode::next`].
    pub unsafe fn next_postorder(&self) -> Option<NonNull<RbNode>> {
        let node = self as *const RbNode as *mut RbNode;
        let parent = NonNull::new(self.rb_parent)?;

        unsafe {
            let right = parent.as_ref().right();
            if parent.as_ref().left() == node && !right.is_null() {
                Some(left_deepest(right))
            } else {
                Some(parent)
            }
        }
    }

    /// One in-order step in `dir`: `Right` is successor, `Left` predecessor.
    ///
    /// # Safety
    /// See [`RbNode::next`].
    unsafe fn step(&self, dir: RbDir) -> Option<NonNull<RbNode>> {
        let mut node = self as *const RbNode as *mut RbNode;

        unsafe {
            // Subtree on the `dir` side: its extreme towards us is the answer.
            let child = (*node).child(dir);
            if !child.is_null() {
                return Some(extreme(child, dir.opposite()));
            }

            // Climb while we come up from the `dir` side; the first ancestor
            // reached from the other side is the answer.
            let mut parent = (*node).rb_parent;
            while !parent.is_null() && node == (*parent).child(dir) {
                node = parent;
                parent = (*node).rb_parent;
            }

            NonNull::new(parent)
        }
    }
}

/// Follow `dir` links from `node` as far as they go
///
/// # Safety
/// `node` must be non-null and every node below it alive.
pub(crate) unsafe fn extreme(mut node: *mut RbNode, dir: RbDir) -> NonNull<RbNode> {
    unsafe {
        while !(*node).child(dir).is_null() {
            node = (*node).child(dir);
        }
        NonNull::new_unchecked(node)
    }
}

/// First node of the post-order walk below `node`
///
/// # Safety
/// `node` must be non-null and every node below it alive.
pub(crate) unsafe fn left_deepest(mut node: *mut RbNode) -> NonNull<RbNode> {
    unsafe {
        loop {
            if !(*node).left().is_null() {
                node = (*node).left();
            } else if !(*node).right().is_null() {
                node = (*node).right();
            } else {
                return NonNull::new_unchecked(node);
            }
        }
    }
}

/// Absent children count as black.
///
/// # Safety
/// `node` must be null or point to a live node.
#[inline]
pub(crate) unsafe fn is_red(node: *const RbNode) -> bool {
    !node.is_null() && unsafe { (*node).is_red() }
}
