//! Node removal: structural splice followed by the deletion fix-up

use core::ptr::{self, NonNull};

use kestrel_ffi::{KernelError, KernelResult};

use crate::node::{is_red, RbColor, RbDir, RbNode};
use crate::tree::RbRoot;

impl RbRoot {
    /// Unlink `node` from the tree and rebalance
    ///
    /// The relative order of every other node is preserved. The removed node
    /// keeps stale links and must be re-initialized before it is linked again;
    /// its memory is untouched and still owned by the caller.
    ///
    /// # Safety
    /// `node` must be null or linked into this tree.
    pub unsafe fn remove(&mut self, node: *mut RbNode) -> KernelResult<()> {
        if node.is_null() {
            return Err(KernelError::EINVAL);
        }

        unsafe {
            match self.erase(node) {
                Some(rebalance) => {
                    tracing::trace!(node = ?node, at = ?rebalance, "erase left a black deficit");
                    self.erase_color(rebalance.as_ptr());
                }
                None => tracing::trace!(node = ?node, "erase needs no rebalance"),
            }
        }

        self.verify();
        Ok(())
    }

    /// Structural removal
    ///
    /// Returns the node below which one path lost a black node, or `None` when
    /// the colors could be fixed locally.
    unsafe fn erase(&mut self, node: *mut RbNode) -> Option<NonNull<RbNode>> {
        unsafe {
            let child = (*node).right();
            let left = (*node).left();
            let rebalance;

            if left.is_null() {
                // At most one child, on the right. If it exists it is red and
                // `node` is black, so it can simply take over node's color.
                let parent = (*node).rb_parent;
                let color = (*node).rb_color;
                self.change_child(node, child, parent);
                if !child.is_null() {
                    (*child).rb_parent = parent;
                    (*child).rb_color = color;
                    rebalance = ptr::null_mut();
                } else if color == RbColor::Black {
                    rebalance = parent;
                } else {
                    rebalance = ptr::null_mut();
                }
            } else if child.is_null() {
                // Only a left child: same as above, mirrored.
                let parent = (*node).rb_parent;
                (*left).rb_parent = parent;
                (*left).rb_color = (*node).rb_color;
                self.change_child(node, left, parent);
                rebalance = ptr::null_mut();
            } else {
                // Two children: the in-order successor takes node's place.
                let mut successor = child;
                let parent;
                let child2;

                let mut tmp = (*child).left();
                if tmp.is_null() {
                    // The successor is node's right child.
                    //
                    //    (n)          (s)
                    //    / \          / \
                    //  (x) (s)  ->  (x) (c)
                    //        \
                    //        (c)
                    parent = successor;
                    child2 = (*successor).right();
                } else {
                    // The successor is leftmost in the right subtree.
                    //
                    //    (n)          (s)
                    //    / \          / \
                    //  (x) (y)  ->  (x) (y)
                    //      /            /
                    //    (p)          (p)
                    //    /            /
                    //  (s)          (c)
                    //    \
                    //    (c)
                    let mut successor_parent;
                    loop {
                        successor_parent = successor;
                        successor = tmp;
                        tmp = (*tmp).left();
                        if tmp.is_null() {
                            break;
                        }
                    }
                    parent = successor_parent;
                    child2 = (*successor).right();
                    (*parent).set_child(RbDir::Left, child2);
                    (*successor).set_child(RbDir::Right, child);
                    (*child).rb_parent = successor;
                }

                (*successor).set_child(RbDir::Left, left);
                (*left).rb_parent = successor;

                let node_parent = (*node).rb_parent;
                let node_color = (*node).rb_color;
                self.change_child(node, successor, node_parent);

                // Decide before the successor inherits node's color.
                if !child2.is_null() {
                    (*child2).rb_parent = parent;
                    (*child2).rb_color = RbColor::Black;
                    rebalance = ptr::null_mut();
                } else if (*successor).is_black() {
                    rebalance = parent;
                } else {
                    rebalance = ptr::null_mut();
                }

                (*successor).rb_parent = node_parent;
                (*successor).rb_color = node_color;
            }

            NonNull::new(rebalance)
        }
    }

    /// Deletion fix-up
    ///
    /// Every path through `parent` and its deficient child (null on the first
    /// round) has one black node fewer than its other paths.
    unsafe fn erase_color(&mut self, mut parent: *mut RbNode) {
        unsafe {
            let mut node: *mut RbNode = ptr::null_mut();

            // Loop invariants: node is black (or null), parent is not null.
            loop {
                // `side` is where the deficit sits, the sibling is opposite.
                let side = if node == (*parent).right() {
                    RbDir::Right
                } else {
                    RbDir::Left
                };
                let away = side.opposite();

                // The sibling subtree has black height >= 1, so it exists.
                let mut sibling = (*parent).child(away);

                if (*sibling).is_red() {
                    // Case 1: rotate at parent towards the deficit.
                    //
                    //     P               S
                    //    / \             / \
                    //   N   s    -->    p   Sr
                    //      / \         / \
                    //     Sl  Sr      N   Sl
                    let near = (*sibling).child(side);
                    (*parent).set_child(away, near);
                    (*sibling).set_child(side, parent);
                    (*near).rb_parent = parent;
                    self.rotate_set_parents(parent, sibling, RbColor::Red);
                    sibling = near;
                }

                let mut far = (*sibling).child(away);
                if !is_red(far) {
                    let near = (*sibling).child(side);
                    if !is_red(near) {
                        // Case 2: sibling color flip.
                        //
                        //    (p)           (p)
                        //    / \           / \
                        //   N   S    -->  N   s
                        //      / \           / \
                        //     Sl  Sr        Sl  Sr
                        (*sibling).rb_color = RbColor::Red;
                        if (*parent).is_red() {
                            (*parent).rb_color = RbColor::Black;
                        } else {
                            node = parent;
                            parent = (*node).rb_parent;
                            if !parent.is_null() {
                                continue;
                            }
                        }
                        break;
                    }

                    // Case 3: rotate at sibling away from the deficit; the
                    // old sibling becomes the far nephew for case 4.
                    //
                    //   (p)           (p)
                    //   / \           / \
                    //  N   S    -->  N   sl
                    //     / \             \
                    //    sl  Sr            S
                    //                       \
                    //                        Sr
                    let inner = (*near).child(away);
                    (*sibling).set_child(side, inner);
                    (*near).set_child(away, sibling);
                    (*parent).set_child(away, near);
                    if !inner.is_null() {
                        (*inner).rb_parent = sibling;
                    }
                    far = sibling;
                    sibling = near;
                }

                // Case 4: rotate at parent towards the deficit, recolor.
                //
                //      (p)             (s)
                //      / \             / \
                //     N   S     -->   P   Sr
                //        / \         / \
                //      (sl) sr      N  (sl)
                let near = (*sibling).child(side);
                (*parent).set_child(away, near);
                (*sibling).set_child(side, parent);
                (*far).rb_parent = sibling;
                (*far).rb_color = RbColor::Black;
                if !near.is_null() {
                    (*near).rb_parent = parent;
                }
                self.rotate_set_parents(parent, sibling, RbColor::Black);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::validate;
    use core::cmp::Ordering;

    fn by_address(a: *const RbNode, b: *const RbNode) -> Ordering {
        (a as usize).cmp(&(b as usize))
    }

    unsafe fn build(root: &mut RbRoot, base: *mut RbNode, order: &[usize]) {
        for &i in order {
            unsafe { root.insert(base.add(i), by_address).unwrap() };
        }
    }

    #[test]
    fn test_remove_null_is_einval() {
        let mut root = RbRoot::new();
        unsafe {
            assert_eq!(root.remove(ptr::null_mut()), Err(KernelError::EINVAL));
        }
    }

    #[test]
    fn test_remove_only_node() {
        let mut root = RbRoot::new();
        let mut node = RbNode::new();
        unsafe {
            root.insert(&mut node, by_address).unwrap();
            root.remove(&mut node).unwrap();
        }
        assert!(root.is_empty());
    }

    #[test]
    fn test_remove_red_leaf_needs_no_fixup() {
        let mut root = RbRoot::new();
        let mut nodes = [RbNode::new(), RbNode::new(), RbNode::new()];
        let base = nodes.as_mut_ptr();

        unsafe {
            build(&mut root, base, &[1, 0, 2]);
            root.remove(base.add(2)).unwrap();

            assert_eq!(root.rb_node, base.add(1));
            assert!((*base.add(1)).right().is_null());
            assert!((*base.add(0)).is_red());
            validate(&root).unwrap();
        }
    }

    #[test]
    fn test_remove_black_leaf_rebalances() {
        let mut root = RbRoot::new();
        let mut nodes = [RbNode::new(), RbNode::new(), RbNode::new(), RbNode::new()];
        let base = nodes.as_mut_ptr();

        unsafe {
            // 1 black root, 0 and 2 black, 3 red below 2.
            build(&mut root, base, &[1, 0, 2, 3]);
            root.remove(base.add(0)).unwrap();

            // Case 4 rotated 2 up to the root.
            assert_eq!(root.rb_node, base.add(2));
            let stats = validate(&root).unwrap();
            assert_eq!(stats.len, 3);
        }
    }

    #[test]
    fn test_remove_node_with_two_children() {
        let mut root = RbRoot::new();
        let mut nodes: [RbNode; 7] = Default::default();
        let base = nodes.as_mut_ptr();

        unsafe {
            build(&mut root, base, &[3, 1, 5, 0, 2, 4, 6]);
            root.remove(base.add(3)).unwrap();

            // Successor 4 moved into the root slot.
            assert_eq!(root.rb_node, base.add(4));
            assert!((*base.add(4)).parent().is_null());
            assert_eq!(validate(&root).unwrap().len, 6);

            let mut seen = [0usize; 6];
            let mut count = 0;
            let mut cursor = root.first();
            while let Some(node) = cursor {
                seen[count] = (node.as_ptr() as usize - base as usize) / core::mem::size_of::<RbNode>();
                count += 1;
                cursor = node.as_ref().next();
            }
            assert_eq!(seen, [0, 1, 2, 4, 5, 6]);
        }
    }

    #[test]
    fn test_remove_all_in_insertion_order() {
        let mut root = RbRoot::new();
        let mut nodes: [RbNode; 16] = Default::default();
        let base = nodes.as_mut_ptr();
        let order = [9, 3, 14, 0, 7, 12, 1, 15, 5, 11, 2, 8, 13, 4, 10, 6];

        unsafe {
            build(&mut root, base, &order);
            for (removed, &i) in order.iter().enumerate() {
                root.remove(base.add(i)).unwrap();
                assert_eq!(validate(&root).unwrap().len, order.len() - removed - 1);
            }
        }
        assert!(root.is_empty());
    }
}
