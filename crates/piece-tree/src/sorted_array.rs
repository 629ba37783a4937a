//! Ordered inline storage for tree node slots.
//!
//! Every node keeps its entries in one of these rather than a heap
//! allocation per node. Capacity is fixed by the backing array type, so
//! the tree controls fanout by choosing the array size.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::slice;

use smallvec::{Array, SmallVec};

pub(crate) struct SortedArray<A: Array> {
    items: SmallVec<A>,
}

impl<A: Array> SortedArray<A> {
    pub(crate) fn new() -> Self {
        Self { items: SmallVec::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        A::size()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.items.len() == self.capacity()
    }

    /// An insertion may have to split one entry in two and then add a new
    /// entry between the halves, so a node is due for splitting as soon as
    /// fewer than two free slots remain.
    pub(crate) fn needs_split(&self) -> bool {
        self.items.len() >= self.capacity() - 2
    }

    pub(crate) fn first(&self) -> Option<&A::Item> {
        self.items.first()
    }

    pub(crate) fn last(&self) -> Option<&A::Item> {
        self.items.last()
    }

    pub(crate) fn push_head(&mut self, item: A::Item) {
        assert!(!self.is_full());
        self.items.insert(0, item);
    }

    pub(crate) fn push_tail(&mut self, item: A::Item) {
        assert!(!self.is_full());
        self.items.push(item);
    }

    pub(crate) fn insert(&mut self, index: usize, item: A::Item) {
        assert!(!self.is_full());
        assert!(index <= self.items.len());
        self.items.insert(index, item);
    }

    pub(crate) fn remove(&mut self, index: usize) -> A::Item {
        self.items.remove(index)
    }

    /// Moves the upper half out, leaving the lower `len / 2` entries in
    /// place.
    pub(crate) fn split_off_upper(&mut self) -> Self {
        let mid = self.items.len() / 2;
        let upper = self.items.drain(mid..).collect();
        Self { items: upper }
    }

    /// Empties the array into two halves, lower then upper.
    pub(crate) fn split_in_two(&mut self) -> (Self, Self) {
        let mid = self.items.len() / 2;
        let upper = self.items.drain(mid..).collect();
        let lower = std::mem::take(&mut self.items);
        (Self { items: lower }, Self { items: upper })
    }

    pub(crate) fn iter(&self) -> slice::Iter<'_, A::Item> {
        self.items.iter()
    }
}

impl<A: Array> Default for SortedArray<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Array> Index<usize> for SortedArray<A> {
    type Output = A::Item;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<A: Array> IndexMut<usize> for SortedArray<A> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.items[index]
    }
}

impl<A: Array> IntoIterator for SortedArray<A> {
    type Item = A::Item;
    type IntoIter = smallvec::IntoIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<A: Array> fmt::Debug for SortedArray<A>
where
    A::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}
