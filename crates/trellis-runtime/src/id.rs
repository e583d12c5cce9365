//! Node identifier type.

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Unique identifier for a node in a data graph.
///
/// Ids are ordinals assigned by the builder in declaration order, which the
/// scheduler uses as the deterministic tie-break between independent nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a node id from a declaration-order index.
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the declaration-order index of this node.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}
