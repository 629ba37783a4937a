//! Node and slot types for the region tree.

use crate::sorted_array::SortedArray;

/// Maximum child slots per branch node.
pub(crate) const MAX_BRANCHES: usize = 26;
/// A branch holding fewer children than this merges into a sibling.
pub(crate) const MIN_BRANCHES: usize = MAX_BRANCHES / 3;
/// Maximum runs per leaf node.
pub(crate) const MAX_RUNS: usize = 32;
/// A leaf holding fewer runs than this merges into a sibling.
pub(crate) const MIN_RUNS: usize = MAX_RUNS / 3;

/// Index of a node within the region's arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A contiguous span of positions sharing one value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run<T> {
    /// Number of positions covered. Never zero while stored in the tree.
    pub length: usize,
    /// The value carried by every position in the span.
    pub data: T,
}

/// A branch slot: a child node paired with the cached total length of its
/// subtree.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Child {
    pub(crate) length: usize,
    pub(crate) node: NodeId,
}

pub(crate) type RunArray<T> = SortedArray<[Run<T>; MAX_RUNS]>;
pub(crate) type ChildArray = SortedArray<[Child; MAX_BRANCHES]>;

pub(crate) enum Kind<T> {
    Leaf(RunArray<T>),
    Branch(ChildArray),
}

/// One tree node. Branches fan out over child subtrees while leaves hold
/// the runs themselves. Sibling links chain the nodes of every level in
/// ascending offset order.
pub(crate) struct Node<T> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) kind: Kind<T>,
}

impl<T> Node<T> {
    pub(crate) fn new_leaf(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            prev: None,
            next: None,
            kind: Kind::Leaf(RunArray::new()),
        }
    }

    pub(crate) fn new_branch(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            prev: None,
            next: None,
            kind: Kind::Branch(ChildArray::new()),
        }
    }

    pub(crate) fn leaf_with(parent: Option<NodeId>, runs: RunArray<T>) -> Self {
        Self {
            parent,
            prev: None,
            next: None,
            kind: Kind::Leaf(runs),
        }
    }

    pub(crate) fn branch_with(parent: Option<NodeId>, children: ChildArray) -> Self {
        Self {
            parent,
            prev: None,
            next: None,
            kind: Kind::Branch(children),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf(_))
    }

    pub(crate) fn runs(&self) -> &RunArray<T> {
        match &self.kind {
            Kind::Leaf(runs) => runs,
            Kind::Branch(_) => panic!("expected a leaf node"),
        }
    }

    pub(crate) fn runs_mut(&mut self) -> &mut RunArray<T> {
        match &mut self.kind {
            Kind::Leaf(runs) => runs,
            Kind::Branch(_) => panic!("expected a leaf node"),
        }
    }

    pub(crate) fn children(&self) -> &ChildArray {
        match &self.kind {
            Kind::Branch(children) => children,
            Kind::Leaf(_) => panic!("expected a branch node"),
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut ChildArray {
        match &mut self.kind {
            Kind::Branch(children) => children,
            Kind::Leaf(_) => panic!("expected a branch node"),
        }
    }

    /// Total length covered by this node, summed from its own slots.
    pub(crate) fn length(&self) -> usize {
        match &self.kind {
            Kind::Leaf(runs) => runs.iter().map(|run| run.length).sum(),
            Kind::Branch(children) => children.iter().map(|child| child.length).sum(),
        }
    }
}
