//! Track runs of data over a one dimensional space.
//!
//! A [`Region`] is a hybrid of a piece table and a B+Tree. Branch nodes
//! cache the total length of each child subtree so lookups by offset stay
//! logarithmic, while leaves hold runs of caller supplied data packed into
//! fixed capacity arrays. Every level of the tree is additionally chained
//! through sibling links in ascending offset order, which keeps full
//! scans linear without walking back through branches.

use std::cell::Cell;
use std::mem;
use std::ops::Range;

use crate::node::{Child, Kind, Node, NodeId, Run, MIN_RUNS};

/// Decides whether two neighboring runs may be collapsed into one.
///
/// The callback receives the offset of the edit that brought the runs
/// together. Returning `true` fuses them into a single run carrying the
/// left side's data.
pub type JoinFn<T> = fn(usize, &Run<T>, &Run<T>) -> bool;

/// Adjusts the two halves produced when an edit divides a run, whether
/// an insertion landing inside it or a removal taking part of it.
///
/// The callback receives the offset of the run being split along with the
/// original run. Both halves arrive pre-sized with cloned data; the
/// policy may rewrite the data in place but must leave the lengths alone.
pub type SplitFn<T> = fn(usize, &Run<T>, &mut Run<T>, &mut Run<T>);

/// Join policy that keeps every run separate.
pub fn join_never<T>(_offset: usize, _left: &Run<T>, _right: &Run<T>) -> bool {
    false
}

/// Split policy that leaves both halves carrying the original data.
pub fn split_retain<T>(_offset: usize, _run: &Run<T>, _left: &mut Run<T>, _right: &mut Run<T>) {}

/// Remembers the leaf that served the most recent lookup so runs of edits
/// around one spot skip the tree descent.
#[derive(Clone, Copy)]
pub(crate) struct CachedLeaf {
    pub(crate) leaf: NodeId,
    pub(crate) start: usize,
}

/// Runs of data over a one dimensional space, addressed by offset.
///
/// Inserting and removing length shifts everything past the edit, the way
/// typing shifts the rest of a text buffer. What each position carries is
/// up to the caller; the region only tracks lengths and the caller's data.
///
/// # Examples
///
/// ```
/// use piece_tree::Region;
///
/// let mut region: Region<char> = Region::new();
/// region.insert(0, 10, 'a');
/// region.insert(4, 2, 'b');
///
/// let runs: Vec<(usize, usize, char)> = region
///     .iter()
///     .map(|(offset, run)| (offset, run.length, run.data))
///     .collect();
/// assert_eq!(runs, vec![(0, 4, 'a'), (4, 2, 'b'), (6, 6, 'a')]);
/// ```
pub struct Region<T, J = JoinFn<T>, S = SplitFn<T>>
where
    J: Fn(usize, &Run<T>, &Run<T>) -> bool,
    S: Fn(usize, &Run<T>, &mut Run<T>, &mut Run<T>),
{
    pub(crate) nodes: Vec<Node<T>>,
    pub(crate) free: Vec<NodeId>,
    pub(crate) root: NodeId,
    pub(crate) length: usize,
    pub(crate) cache: Cell<Option<CachedLeaf>>,
    join: J,
    split: S,
}

impl<T: Clone> Region<T> {
    /// Creates an empty region with the default policies: runs never
    /// join and split halves keep their data untouched.
    pub fn new() -> Self {
        Self::with_policies(join_never, split_retain)
    }
}

impl<T: Clone> Default for Region<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, J, S> Region<T, J, S>
where
    T: Clone,
    J: Fn(usize, &Run<T>, &Run<T>) -> bool,
    S: Fn(usize, &Run<T>, &mut Run<T>, &mut Run<T>),
{
    /// Creates an empty region with caller supplied join and split
    /// policies.
    pub fn with_policies(join: J, split: S) -> Self {
        let root = NodeId(0);
        let leaf = NodeId(1);
        let mut nodes = vec![Node::new_branch(None), Node::new_leaf(Some(root))];
        nodes[root.index()]
            .children_mut()
            .push_head(Child { length: 0, node: leaf });
        Self {
            nodes,
            free: Vec::new(),
            root,
            length: 0,
            cache: Cell::new(None),
            join,
            split,
        }
    }

    /// Total number of positions covered by the region.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(node);
                id
            }
        }
    }

    /// Returns a node's slot to the free list. The slot is overwritten
    /// with an inert empty leaf so a stale id cannot reach old data.
    pub(crate) fn release(&mut self, id: NodeId) {
        if let Some(cached) = self.cache.get() {
            if cached.leaf == id {
                self.cache.set(None);
            }
        }
        self.nodes[id.index()] = Node::new_leaf(None);
        self.free.push(id);
    }

    pub(crate) fn invalidate_cache(&self) {
        self.cache.set(None);
    }

    pub(crate) fn first_leaf(&self) -> NodeId {
        let mut id = self.root;
        loop {
            match &self.node(id).kind {
                Kind::Branch(children) => {
                    id = children.first().expect("branch nodes hold at least one child").node;
                }
                Kind::Leaf(_) => return id,
            }
        }
    }

    /// Locates the leaf owning `offset`, returning it along with the
    /// offset relative to the leaf's first run.
    ///
    /// The cached leaf from the previous lookup is tried first. The end
    /// offset of the region belongs to the last leaf so appends resolve
    /// without a fresh descent.
    pub(crate) fn search(&self, offset: usize) -> (NodeId, usize) {
        if let Some(cached) = self.cache.get() {
            if offset >= cached.start {
                let end = cached.start + self.node(cached.leaf).length();
                if offset < end || (offset == end && self.node(cached.leaf).next.is_none()) {
                    return (cached.leaf, offset - cached.start);
                }
            }
        }

        let (leaf, within) = if offset == 0 {
            (self.first_leaf(), 0)
        } else {
            self.search_recurse(self.root, offset)
        };

        self.cache.set(Some(CachedLeaf { leaf, start: offset - within }));

        (leaf, within)
    }

    fn search_recurse(&self, id: NodeId, mut offset: usize) -> (NodeId, usize) {
        let children = match &self.node(id).kind {
            Kind::Leaf(_) => return (id, offset),
            Kind::Branch(children) => children,
        };

        for child in children.iter() {
            if offset < child.length {
                return self.search_recurse(child.node, offset);
            }
            offset -= child.length;
        }

        // Fell past every child, which only happens at the very end of
        // the region. Rebase into the rightmost subtree so its last leaf
        // ends up owning the end offset.
        debug_assert!(self.node(id).next.is_none());
        let last = children.last().expect("branch nodes hold at least one child");
        self.search_recurse(last.node, offset + last.length)
    }

    fn try_join(&self, offset: usize, left: &Run<T>, right: &Run<T>) -> Option<Run<T>> {
        if (self.join)(offset, left, right) {
            Some(Run {
                length: left.length + right.length,
                data: left.data.clone(),
            })
        } else {
            None
        }
    }

    fn split_run(&self, at: usize, run: &Run<T>, within: usize) -> (Run<T>, Run<T>) {
        let mut left = Run {
            length: within,
            data: run.data.clone(),
        };
        let mut right = Run {
            length: run.length - within,
            data: run.data.clone(),
        };
        (self.split)(at, run, &mut left, &mut right);
        // The policy may adjust data only, never the lengths.
        debug_assert_eq!(left.length, within);
        debug_assert_eq!(right.length, run.length - within);
        (left, right)
    }

    /// Inserts `length` positions carrying `data` at `offset`. Everything
    /// at and past `offset` shifts right. A zero `length` is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `offset` lies past the end of the region.
    pub fn insert(&mut self, offset: usize, length: usize, data: T) {
        assert!(offset <= self.length);
        if length == 0 {
            return;
        }

        let to_insert = Run { length, data };
        let (mut target, mut within) = self.search(offset);

        if self.node(target).runs().is_empty() {
            // A fresh or fully drained region keeps one empty leaf.
            debug_assert_eq!(offset, 0);
            self.node_mut(target).runs_mut().push_head(to_insert);
        } else {
            if self.node_needs_split(target) {
                self.split_node(target);
                let found = self.search(offset);
                target = found.0;
                within = found.1;
            }
            self.insert_into_leaf(target, offset, within, to_insert);
        }

        // Push the added length up through every ancestor slot. The walk
        // leaves the cache alone so consecutive edits around one spot
        // keep hitting it.
        let mut id = target;
        while let Some(parent) = self.node(id).parent {
            let index = self.child_index(parent, id);
            self.node_mut(parent).children_mut()[index].length += length;
            self.debug_validate_node(id, Some(parent));
            id = parent;
        }

        self.length += length;

        assert_eq!(self.length, self.node(self.root).length());
    }

    fn insert_into_leaf(
        &mut self,
        target: NodeId,
        offset: usize,
        mut within: usize,
        mut to_insert: Run<T>,
    ) {
        let mut runs = mem::take(self.node_mut(target).runs_mut());
        let mut inserted = false;
        let mut i = 0;

        while i < runs.len() {
            let run_len = runs[i].length;

            if within == 0 {
                // Landed on the left edge of this run.
                match self.try_join(offset, &to_insert, &runs[i]) {
                    Some(joined) => runs[i] = joined,
                    None => runs.insert(i, to_insert),
                }
                inserted = true;
                break;
            } else if within == run_len {
                // Landed on the right edge of this run.
                if let Some(joined) = self.try_join(offset, &runs[i], &to_insert) {
                    runs[i] = joined;
                } else if i + 1 < runs.len() {
                    match self.try_join(offset, &to_insert, &runs[i + 1]) {
                        Some(joined) => runs[i + 1] = joined,
                        None => runs.insert(i + 1, to_insert),
                    }
                } else {
                    runs.insert(i + 1, to_insert);
                }
                inserted = true;
                break;
            } else if within < run_len {
                // Lands inside this run, splitting it in two.
                let run_start = offset - within;
                let (left, right) = self.split_run(run_start, &runs[i], within);
                runs[i] = left;
                match self.try_join(offset, &to_insert, &right) {
                    Some(joined) => to_insert = joined,
                    None => runs.insert(i + 1, right),
                }
                match self.try_join(run_start, &runs[i], &to_insert) {
                    Some(joined) => runs[i] = joined,
                    None => runs.insert(i + 1, to_insert),
                }
                inserted = true;
                break;
            }

            within -= run_len;
            i += 1;
        }

        assert!(inserted);
        *self.node_mut(target).runs_mut() = runs;
    }

    /// Removes `length` positions starting at `offset`. Everything past
    /// the removed range shifts left.
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie inside the region.
    pub fn remove(&mut self, offset: usize, length: usize) {
        assert!(length <= self.length);
        assert!(offset < self.length);
        assert!(length <= self.length - offset);

        self.remove_inner(offset, length, 0);
    }

    fn remove_inner(&mut self, offset: usize, length: usize, retries: u32) {
        if length == 0 {
            return;
        }

        let (target, mut within) = self.search(offset);
        let mut to_remove = length;
        let mut removed = 0usize;

        let mut runs = mem::take(self.node_mut(target).runs_mut());
        let mut i = 0;

        while i < runs.len() {
            if to_remove == 0 {
                break;
            }

            let run_len = runs[i].length;
            let run_start = offset - within;

            if within >= run_len {
                // Entirely before the removal.
                within -= run_len;
                i += 1;
            } else if within > 0 {
                if within + to_remove < run_len {
                    // Buried inside this run, leaving a piece on either
                    // side. Both boundaries go through the split policy,
                    // then the surviving halves get a chance to rejoin.
                    let (left, right) = self.split_run(run_start, &runs[i], within);
                    let mut center = Run {
                        length: to_remove,
                        data: runs[i].data.clone(),
                    };
                    let mut trailing = Run {
                        length: run_len - within - to_remove,
                        data: runs[i].data.clone(),
                    };
                    (self.split)(run_start + left.length, &right, &mut center, &mut trailing);
                    debug_assert_eq!(center.length, to_remove);
                    debug_assert_eq!(trailing.length, run_len - within - to_remove);

                    match self.try_join(run_start, &left, &trailing) {
                        Some(joined) => runs[i] = joined,
                        None => {
                            if runs.is_full() {
                                // The extra run has nowhere to go. Put
                                // the untouched runs back, make room and
                                // start the removal over.
                                *self.node_mut(target).runs_mut() = runs;
                                self.split_node(target);
                                debug_assert_eq!(retries, 0);
                                self.remove_inner(offset, length, retries + 1);
                                return;
                            }
                            runs[i] = left;
                            runs.insert(i + 1, trailing);
                        }
                    }
                    removed += to_remove;
                    to_remove = 0;
                    break;
                } else {
                    // Starts inside this run and runs off its end. The
                    // kept head still goes through the split policy.
                    let (left, right) = self.split_run(run_start, &runs[i], within);
                    runs[i] = left;
                    removed += right.length;
                    to_remove -= right.length;
                    within = 0;
                    i += 1;
                }
            } else if to_remove >= run_len {
                // Swallows this run whole.
                runs.remove(i);
                removed += run_len;
                to_remove -= run_len;
            } else {
                // Trims the head of this run, keeping the split tail.
                let (cut, kept) = self.split_run(run_start, &runs[i], to_remove);
                runs[i] = kept;
                removed += cut.length;
                to_remove = 0;
                break;
            }
        }

        let remaining_runs = runs.len();
        *self.node_mut(target).runs_mut() = runs;

        self.length -= removed;
        self.subtract_from_parents(target, removed);

        if remaining_runs < MIN_RUNS {
            self.leaf_compact(target);
        }

        assert_eq!(self.length, self.node(self.root).length());

        // The removal can span leaves. Everything left to remove now sits
        // at the same offset, so go around again.
        if to_remove > 0 {
            self.remove_inner(offset, to_remove, 0);
        }
    }

    /// Replaces `length` positions at `offset` with a single new run
    /// carrying `data`. Equivalent to a remove followed by an insert of
    /// the same length. A zero `length` is a no-op.
    pub fn replace(&mut self, offset: usize, length: usize, data: T) {
        if length == 0 {
            return;
        }
        self.remove(offset, length);
        self.insert(offset, length, data);
    }

    pub(crate) fn add_to_parents(&mut self, node: NodeId, length: usize) {
        if length == 0 {
            return;
        }
        self.invalidate_cache();
        let mut id = node;
        while let Some(parent) = self.node(id).parent {
            let index = self.child_index(parent, id);
            self.node_mut(parent).children_mut()[index].length += length;
            id = parent;
        }
    }

    pub(crate) fn subtract_from_parents(&mut self, node: NodeId, length: usize) {
        if length == 0 {
            return;
        }
        self.invalidate_cache();
        let mut id = node;
        while let Some(parent) = self.node(id).parent {
            let index = self.child_index(parent, id);
            let slot = &mut self.node_mut(parent).children_mut()[index];
            debug_assert!(slot.length >= length);
            slot.length -= length;
            id = parent;
        }
    }

    pub(crate) fn child_index(&self, parent: NodeId, child: NodeId) -> usize {
        let children = self.node(parent).children();
        for (index, slot) in children.iter().enumerate() {
            if slot.node == child {
                return index;
            }
        }
        panic!("node missing from its parent");
    }

    /// Visits every run in order, yielding each run's absolute offset.
    pub fn iter(&self) -> Runs<'_, T> {
        Runs {
            nodes: &self.nodes,
            leaf: Some(self.first_leaf()),
            index: 0,
            offset: 0,
            begin: 0,
            end: usize::MAX,
        }
    }

    /// Visits every run overlapping `range`. Runs straddling either
    /// boundary are yielded whole with their true offset.
    ///
    /// # Panics
    ///
    /// Panics if the range is inverted or reaches past the end of the
    /// region.
    pub fn range(&self, range: Range<usize>) -> Runs<'_, T> {
        let (begin, end) = (range.start, range.end);
        assert!(begin <= end);
        assert!(end <= self.length);

        if begin == end || begin == self.length {
            return Runs {
                nodes: &self.nodes,
                leaf: None,
                index: 0,
                offset: 0,
                begin,
                end,
            };
        }

        let (leaf, within) = if begin == 0 {
            (self.first_leaf(), 0)
        } else {
            self.search(begin)
        };
        debug_assert!(within < self.node(leaf).length());

        Runs {
            nodes: &self.nodes,
            leaf: Some(leaf),
            index: 0,
            offset: begin - within,
            begin,
            end,
        }
    }

    /// Calls `f` on every run in order, stopping early once it returns
    /// true.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(usize, &Run<T>) -> bool,
    {
        for (offset, run) in self.iter() {
            if f(offset, run) {
                return;
            }
        }
    }

    /// Calls `f` on every run overlapping `begin..end`, stopping early
    /// once it returns true. Runs are passed whole, as with
    /// [`Region::range`].
    pub fn for_each_in_range<F>(&self, begin: usize, end: usize, mut f: F)
    where
        F: FnMut(usize, &Run<T>) -> bool,
    {
        for (offset, run) in self.range(begin..end) {
            if f(offset, run) {
                return;
            }
        }
    }
}

/// Iterator over `(offset, run)` pairs, in ascending offset order.
pub struct Runs<'a, T> {
    nodes: &'a [Node<T>],
    leaf: Option<NodeId>,
    index: usize,
    offset: usize,
    begin: usize,
    end: usize,
}

impl<'a, T> Iterator for Runs<'a, T> {
    type Item = (usize, &'a Run<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            let leaf = self.leaf?;
            let node = &nodes[leaf.index()];
            let runs = node.runs();

            if self.index == runs.len() {
                if let Some(next) = node.next {
                    debug_assert_eq!(nodes[next.index()].prev, Some(leaf));
                }
                self.leaf = node.next;
                self.index = 0;
                continue;
            }

            if self.offset >= self.end {
                return None;
            }

            let run = &runs[self.index];
            let offset = self.offset;
            self.index += 1;
            self.offset += run.length;

            // Runs entirely before the requested range are skipped; the
            // first yielded run may still begin before it.
            if offset + run.length <= self.begin {
                continue;
            }

            return Some((offset, run));
        }
    }
}
