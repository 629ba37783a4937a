//! Checked/unchecked span bookkeeping for incremental text analysis.
//!
//! A [`DirtyRegion`] shadows a text buffer and remembers which spans a
//! background pass has already processed. Edits mark the touched text
//! unchecked; the pass asks for the next unchecked span, processes it and
//! marks it checked. Spell checking and diagnostics engines both fit this
//! shape: work happens a little at a time, and typing anywhere must not
//! lose track of what became stale.

use piece_tree::Region;

/// Whether a span of positions still needs to be looked at.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Check {
    Unchecked,
    Checked,
}

/// Tracks the checked state of every position in a buffer.
///
/// The total length always matches the buffer being shadowed, so callers
/// feed every insertion and deletion through here.
pub struct DirtyRegion {
    region: Region<Check>,
}

impl DirtyRegion {
    pub fn new() -> Self {
        Self { region: Region::new() }
    }

    /// Number of positions tracked. Matches the shadowed buffer length.
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Records inserted text. The new span needs checking.
    pub fn insert(&mut self, offset: usize, length: usize) {
        if length == 0 {
            return;
        }
        self.region.insert(offset, length, Check::Unchecked);
    }

    /// Records deleted text.
    pub fn remove(&mut self, offset: usize, length: usize) {
        if length == 0 {
            return;
        }
        self.region.remove(offset, length);
    }

    /// Marks a span as processed. A zero length is a no-op.
    pub fn mark_checked(&mut self, offset: usize, length: usize) {
        self.region.replace(offset, length, Check::Checked);
    }

    /// Marks a span as needing another pass, for example after the text
    /// under it changed meaning. A zero length is a no-op.
    pub fn mark_unchecked(&mut self, offset: usize, length: usize) {
        self.region.replace(offset, length, Check::Unchecked);
    }

    /// Offset of the first span still needing a pass.
    pub fn first_unchecked(&self) -> Option<usize> {
        self.region
            .iter()
            .find(|(_, run)| run.data == Check::Unchecked)
            .map(|(offset, _)| offset)
    }

    /// The first unchecked span overlapping `begin..end`, clipped to it.
    /// Useful for prioritizing the visible part of a document.
    pub fn unchecked_in(&self, begin: usize, end: usize) -> Option<(usize, usize)> {
        self.region
            .range(begin..end)
            .find(|(_, run)| run.data == Check::Unchecked)
            .map(|(offset, run)| {
                let start = offset.max(begin);
                let stop = (offset + run.length).min(end);
                (start, stop)
            })
    }

    /// Drops all state and starts over with `length` unchecked
    /// positions, as when the checking backend changes.
    pub fn reset(&mut self, length: usize) {
        let old = self.region.len();
        if old > 0 {
            self.region.remove(0, old);
        }
        if length > 0 {
            self.region.insert(0, length, Check::Unchecked);
        }
    }
}

impl Default for DirtyRegion {
    fn default() -> Self {
        Self::new()
    }
}
