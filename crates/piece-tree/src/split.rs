//! Node splitting.
//!
//! Nodes split while they still have two slots of headroom, never when
//! already full, so an edit in flight always has room to land. Ancestors
//! split before descendants, which keeps every parent able to take the
//! extra child slot a lower split produces.

use crate::node::{Child, Kind, Node, NodeId, Run};
use crate::region::Region;

impl<T, J, S> Region<T, J, S>
where
    T: Clone,
    J: Fn(usize, &Run<T>, &Run<T>) -> bool,
    S: Fn(usize, &Run<T>, &mut Run<T>, &mut Run<T>),
{
    pub(crate) fn node_needs_split(&self, node: NodeId) -> bool {
        match &self.node(node).kind {
            Kind::Leaf(runs) => runs.needs_split(),
            Kind::Branch(children) => children.needs_split(),
        }
    }

    /// Splits a node, returning the new right sibling.
    ///
    /// The parent is split first when it is also due, and re-read
    /// afterwards since splitting it may have handed this node to a new
    /// branch.
    pub(crate) fn split_node(&mut self, node: NodeId) -> NodeId {
        self.invalidate_cache();

        if let Some(parent) = self.node(node).parent {
            if self.node_needs_split(parent) {
                self.split_node(parent);
            }
        }

        if self.node(node).is_leaf() {
            self.split_leaf(node)
        } else if node == self.root {
            self.split_root()
        } else {
            self.split_branch(node)
        }
    }

    /// The root splits in place: its children move into two fresh
    /// branches and the root keeps just those two. This is the only way
    /// the tree gains a level.
    fn split_root(&mut self) -> NodeId {
        let root = self.root;
        let (lower, upper) = self.node_mut(root).children_mut().split_in_two();

        let left = self.alloc(Node::branch_with(Some(root), lower));
        let right = self.alloc(Node::branch_with(Some(root), upper));
        self.node_mut(left).next = Some(right);
        self.node_mut(right).prev = Some(left);

        for i in 0..self.node(left).children().len() {
            let child = self.node(left).children()[i].node;
            self.node_mut(child).parent = Some(left);
        }
        for i in 0..self.node(right).children().len() {
            let child = self.node(right).children()[i].node;
            self.node_mut(child).parent = Some(right);
        }

        let left_length = self.node(left).length();
        let right_length = self.node(right).length();
        let children = self.node_mut(root).children_mut();
        children.push_head(Child { length: right_length, node: right });
        children.push_head(Child { length: left_length, node: left });

        self.debug_validate_node(root, None);
        self.debug_validate_node(left, Some(root));
        self.debug_validate_node(right, Some(root));

        right
    }

    fn split_branch(&mut self, node: NodeId) -> NodeId {
        let parent = self.node(node).parent.expect("only the root has no parent");
        debug_assert!(!self.node(parent).children().is_full());

        let upper = self.node_mut(node).children_mut().split_off_upper();
        let right = self.alloc(Node::branch_with(Some(parent), upper));

        // Splice the new node into the level chain just after `node`.
        let after = self.node(node).next;
        self.node_mut(right).next = after;
        if let Some(after) = after {
            self.node_mut(after).prev = Some(right);
        }
        self.node_mut(right).prev = Some(node);
        self.node_mut(node).next = Some(right);

        for i in 0..self.node(right).children().len() {
            let child = self.node(right).children()[i].node;
            self.node_mut(child).parent = Some(right);
        }

        let left_length = self.node(node).length();
        let right_length = self.node(right).length();
        let index = self.child_index(parent, node);
        let children = self.node_mut(parent).children_mut();
        children[index].length = left_length;
        children.insert(index + 1, Child { length: right_length, node: right });

        self.debug_validate_node(node, Some(parent));
        self.debug_validate_node(right, Some(parent));

        right
    }

    fn split_leaf(&mut self, node: NodeId) -> NodeId {
        let parent = self.node(node).parent.expect("only the root has no parent");
        debug_assert!(!self.node(parent).children().is_full());

        let upper = self.node_mut(node).runs_mut().split_off_upper();
        let right = self.alloc(Node::leaf_with(Some(parent), upper));

        let after = self.node(node).next;
        self.node_mut(right).next = after;
        if let Some(after) = after {
            self.node_mut(after).prev = Some(right);
        }
        self.node_mut(right).prev = Some(node);
        self.node_mut(node).next = Some(right);

        let right_length = self.node(right).length();
        let index = self.child_index(parent, node);
        let children = self.node_mut(parent).children_mut();
        debug_assert!(children[index].length > right_length);
        children[index].length -= right_length;
        children.insert(index + 1, Child { length: right_length, node: right });

        self.debug_validate_node(node, Some(parent));
        self.debug_validate_node(right, Some(parent));

        right
    }
}
