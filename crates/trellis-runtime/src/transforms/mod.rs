//! Stock stateless transforms.
//!
//! These cover the common column-shuffling steps of a pipeline: merging
//! branches back into one table, keeping/renaming a subset of columns, and
//! dropping columns. All of them are ordinary [`Transform`] implementations;
//! user-supplied transforms sit next to them without any special casing.
//!
//! [`Transform`]: crate::Transform

mod drop;
mod merge;
mod subset;

pub use drop::DropColumns;
pub use merge::MergeColumns;
pub use subset::{ColumnSubset, ColumnSubsetBuilder};
