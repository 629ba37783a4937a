//! Track runs of data over a one dimensional space, addressed by offset.
//!
//! The structure is a hybrid of a piece table and a B+Tree. Branches
//! cache subtree lengths so offset lookups stay logarithmic, while
//! leaves pack runs into fixed capacity arrays linked level by level
//! into sibling chains for linear scans. Inserting or removing length
//! shifts everything past the edit point, which is exactly how a text
//! buffer behaves, so the region can shadow one and answer "what state
//! does position N carry" without storing a value per position.
//!
//! What a run carries is up to the caller. Join and split policies decide
//! how runs fuse and divide as edits land, so neighboring spans with
//! equal state can collapse into a single run.
//!
//! ```
//! use piece_tree::{split_retain, Region};
//!
//! // Fuse neighboring runs whenever they carry equal data.
//! let mut marks: Region<bool> = Region::with_policies(|_, l, r| l.data == r.data, split_retain);
//! marks.insert(0, 3, false);
//! marks.insert(3, 4, false);
//! assert_eq!(marks.iter().count(), 1);
//! assert_eq!(marks.len(), 7);
//! ```

mod compact;
mod node;
mod region;
mod sorted_array;
mod split;
mod validate;

#[cfg(test)]
mod proptests;

pub use node::Run;
pub use region::{join_never, split_retain, JoinFn, Region, Runs, SplitFn};
