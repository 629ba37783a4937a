//! Node compaction.
//!
//! Removal never rebalances eagerly. A node that drops below the minimum
//! occupancy is instead drained into a sibling and freed, and the merge
//! walks upward so emptied branches fall out of the tree as well.

use crate::node::{NodeId, Run, MIN_BRANCHES};
use crate::region::Region;

impl<T, J, S> Region<T, J, S>
where
    T: Clone,
    J: Fn(usize, &Run<T>, &Run<T>) -> bool,
    S: Fn(usize, &Run<T>, &mut Run<T>, &mut Run<T>),
{
    /// Merges an underfull leaf into a sibling and releases it.
    pub(crate) fn leaf_compact(&mut self, node: NodeId) {
        debug_assert!(self.node(node).is_leaf());

        let left = self.node(node).prev;
        let right = self.node(node).next;

        // The last leaf has nowhere to merge into and simply stays,
        // however empty.
        if left.is_none() && right.is_none() {
            return;
        }

        let parent = self.node(node).parent.expect("a leaf with siblings has a parent");

        let length = self.node(node).length();
        self.subtract_from_parents(node, length);
        let index = self.child_index(parent, node);
        self.node_mut(parent).children_mut().remove(index);

        if let Some(left) = left {
            self.node_mut(left).next = right;
        }
        if let Some(right) = right {
            self.node_mut(right).prev = left;
        }
        self.node_mut(node).prev = None;
        self.node_mut(node).next = None;

        // Merge into whichever sibling has more room.
        let mut target = match (left, right) {
            (None, Some(sibling)) => sibling,
            (Some(sibling), None) => sibling,
            (Some(l), Some(r)) => {
                if self.node(l).runs().len() > self.node(r).runs().len() {
                    r
                } else {
                    l
                }
            }
            (None, None) => unreachable!(),
        };
        let merge_right = Some(target) == right;

        let runs = std::mem::take(self.node_mut(node).runs_mut());
        let mut added = 0;

        if merge_right {
            // Feed the runs backwards onto the head of the right sibling
            // so they keep their order. Splitting a full target moves its
            // upper half aside while the head stays put.
            for run in runs.into_iter().rev() {
                if self.node_needs_split(target) {
                    self.add_to_parents(target, added);
                    added = 0;
                    self.split_node(target);
                    debug_assert_eq!(self.node(target).prev, left);
                }
                let run_length = run.length;
                self.node_mut(target).runs_mut().push_head(run);
                added += run_length;
            }
        } else {
            // Append to the left sibling. Here a split carries the tail,
            // pushed runs included, into a new node, so follow it.
            for run in runs.into_iter() {
                if self.node_needs_split(target) {
                    self.add_to_parents(target, added);
                    added = 0;
                    target = self.split_node(target);
                }
                let run_length = run.length;
                self.node_mut(target).runs_mut().push_tail(run);
                added += run_length;
            }
        }

        self.add_to_parents(target, added);

        self.debug_validate_node(target, self.node(target).parent);

        self.branch_compact(parent);

        self.release(node);
    }

    /// Merges an underfull branch into a sibling, or collapses a chain of
    /// single children so a drained tree loses height again.
    fn branch_compact(&mut self, node: NodeId) {
        debug_assert!(!self.node(node).is_leaf());

        // The root holds whatever is left, down to a single child.
        if node == self.root {
            return;
        }

        let parent = self.node(node).parent.expect("only the root has no parent");

        if self.node(node).children().len() == 1 && self.node(parent).children().len() == 1 {
            // A spine of lone children: the parent adopts the grandchild
            // directly and this node drops out. The subtree total does
            // not change, so the parent's slot length stays.
            let grandchild = self.node(node).children().first().expect("checked length above").node;
            debug_assert!(self.node(node).prev.is_none());
            debug_assert!(self.node(node).next.is_none());
            debug_assert!(self.node(grandchild).prev.is_none());
            debug_assert!(self.node(grandchild).next.is_none());

            self.node_mut(parent).children_mut()[0].node = grandchild;
            self.node_mut(grandchild).parent = Some(parent);

            self.branch_compact(parent);
            self.release(node);
            return;
        }

        let left = self.node(node).prev;
        let right = self.node(node).next;

        if left.is_none() && right.is_none() {
            return;
        }

        if self.node(node).children().len() >= MIN_BRANCHES {
            return;
        }

        let length = self.node(node).length();
        self.subtract_from_parents(node, length);
        let index = self.child_index(parent, node);
        self.node_mut(parent).children_mut().remove(index);

        if let Some(left) = left {
            self.node_mut(left).next = right;
        }
        if let Some(right) = right {
            self.node_mut(right).prev = left;
        }
        self.node_mut(node).prev = None;
        self.node_mut(node).next = None;

        let mut target = match (left, right) {
            (None, Some(sibling)) => sibling,
            (Some(sibling), None) => sibling,
            (Some(l), Some(r)) => {
                if self.node(l).children().len() > self.node(r).children().len() {
                    r
                } else {
                    l
                }
            }
            (None, None) => unreachable!(),
        };
        let merge_right = Some(target) == right;

        let children = std::mem::take(self.node_mut(node).children_mut());
        let mut added = 0;

        if merge_right {
            for child in children.into_iter().rev() {
                if self.node_needs_split(target) {
                    self.add_to_parents(target, added);
                    added = 0;
                    self.split_node(target);
                    debug_assert_eq!(self.node(target).prev, left);
                }
                self.node_mut(child.node).parent = Some(target);
                self.node_mut(target).children_mut().push_head(child);
                added += child.length;
            }
        } else {
            for child in children.into_iter() {
                if self.node_needs_split(target) {
                    self.add_to_parents(target, added);
                    added = 0;
                    target = self.split_node(target);
                }
                self.node_mut(child.node).parent = Some(target);
                self.node_mut(target).children_mut().push_tail(child);
                added += child.length;
            }
        }

        self.add_to_parents(target, added);

        self.debug_validate_node(target, self.node(target).parent);

        self.branch_compact(parent);

        self.release(node);
    }
}
