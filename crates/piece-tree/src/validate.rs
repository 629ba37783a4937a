//! Structural checking used by debug builds and tests.

use crate::node::{Kind, NodeId, Run};
use crate::region::Region;

impl<T, J, S> Region<T, J, S>
where
    T: Clone,
    J: Fn(usize, &Run<T>, &Run<T>) -> bool,
    S: Fn(usize, &Run<T>, &mut Run<T>, &mut Run<T>),
{
    /// Checks one node against its surroundings. Compiled away outside
    /// debug builds; callers sprinkle this at the end of structural
    /// edits.
    pub(crate) fn debug_validate_node(&self, node: NodeId, parent: Option<NodeId>) {
        if cfg!(debug_assertions) {
            self.validate_node(node, parent);
        }
    }

    fn validate_node(&self, id: NodeId, parent: Option<NodeId>) {
        let node = self.node(id);
        assert_eq!(node.parent, parent);

        if let Some(parent) = parent {
            assert!(!self.node(parent).is_leaf());
            let index = self.child_index(parent, id);
            assert_eq!(self.node(parent).children()[index].length, node.length());
        }

        match &node.kind {
            Kind::Leaf(runs) => {
                for run in runs.iter() {
                    assert!(run.length > 0);
                }
            }
            Kind::Branch(children) => {
                for (i, child) in children.iter().enumerate() {
                    assert!(child.length > 0);
                    assert_eq!(child.length, self.node(child.node).length());
                    assert_eq!(self.node(child.node).parent, Some(id));
                    if i + 1 < children.len() {
                        let next = &children[i + 1];
                        assert_eq!(self.node(child.node).next, Some(next.node));
                        assert_eq!(self.node(next.node).prev, Some(child.node));
                        assert_eq!(self.node(child.node).is_leaf(), self.node(next.node).is_leaf());
                    }
                }
            }
        }
    }

    /// Walks the whole tree and asserts every structural invariant:
    /// parent links, cached subtree lengths, sibling chains per level,
    /// run positivity and the absence of leaked nodes. Only tests drive
    /// this; release code relies on the per-edit node checks.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn validate(&self) {
        let root = self.root;
        assert!(self.node(root).parent.is_none());
        assert!(!self.node(root).is_leaf());
        assert!(!self.node(root).children().is_empty());

        let mut last_at_depth: Vec<Option<NodeId>> = Vec::new();
        let mut visited = 0;
        let total = self.validate_walk(root, None, 0, &mut last_at_depth, &mut visited);

        assert_eq!(total, self.length);
        assert_eq!(visited, self.nodes.len() - self.free.len());

        // The rightmost node of every level ends its chain.
        for last in last_at_depth.iter().flatten() {
            assert!(self.node(*last).next.is_none());
        }
    }

    fn validate_walk(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        depth: usize,
        last_at_depth: &mut Vec<Option<NodeId>>,
        visited: &mut usize,
    ) -> usize {
        *visited += 1;

        let node = self.node(id);
        assert_eq!(node.parent, parent);

        // Nodes of one depth are visited left to right, so the previous
        // visit at this depth must be our chain predecessor.
        if last_at_depth.len() == depth {
            last_at_depth.push(None);
        }
        assert_eq!(node.prev, last_at_depth[depth]);
        if let Some(prev) = last_at_depth[depth] {
            assert_eq!(self.node(prev).next, Some(id));
        }
        last_at_depth[depth] = Some(id);

        match &node.kind {
            Kind::Leaf(runs) => {
                assert!(runs.len() <= runs.capacity());
                let mut total = 0;
                for run in runs.iter() {
                    assert!(run.length > 0);
                    total += run.length;
                }
                total
            }
            Kind::Branch(children) => {
                assert!(!children.is_empty());
                assert!(children.len() <= children.capacity());
                let first_is_leaf = self.node(children[0].node).is_leaf();
                let mut total = 0;
                for child in children.iter() {
                    assert_eq!(self.node(child.node).is_leaf(), first_is_leaf);
                    let child_total =
                        self.validate_walk(child.node, Some(id), depth + 1, last_at_depth, visited);
                    assert_eq!(child.length, child_total);
                    total += child_total;
                }
                total
            }
        }
    }
}
