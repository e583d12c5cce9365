//! Typed references binding a value to its producing node.

use std::fmt;

use serde::{Deserialize, Serialize};
use trellis_data::{ColumnId, ValueKind};

use crate::error::{GraphError, GraphResult};
use crate::id::NodeId;

/// A typed reference to a value produced by a specific graph node.
///
/// Tokens are minted by [`NodeHandle::token`] (and by the frozen graph's
/// [`ResultHandle::token`]), so every token is backed by a declared output of
/// its producer. Wiring a node with a token whose producer is not among its
/// parents is rejected at build time.
///
/// [`NodeHandle::token`]: crate::NodeHandle::token
/// [`ResultHandle::token`]: crate::ResultHandle::token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueToken {
    producer: NodeId,
    id: ColumnId,
}

impl ValueToken {
    pub(crate) fn new(producer: NodeId, id: ColumnId) -> Self {
        Self { producer, id }
    }

    /// Returns the node that produces the referenced value.
    pub const fn producer(&self) -> NodeId {
        self.producer
    }

    /// Returns the referenced column id.
    pub const fn id(&self) -> &ColumnId {
        &self.id
    }

    /// Returns the referenced value name.
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Returns the referenced value kind.
    pub const fn kind(&self) -> ValueKind {
        self.id.kind()
    }
}

impl fmt::Display for ValueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token for '{}' of node {}", self.id.name(), self.producer)
    }
}

/// Resolves `id` against a node's declared outputs, minting a token.
///
/// Both name and kind must match the declaration.
pub(crate) fn resolve_token(
    node: NodeId,
    outputs: &[ColumnId],
    id: &ColumnId,
) -> GraphResult<ValueToken> {
    outputs
        .iter()
        .find(|out| out.name() == id.name() && out.kind() == id.kind())
        .map(|out| ValueToken::new(node, out.clone()))
        .ok_or_else(|| GraphError::UnknownValue {
            node,
            name: id.name().to_string(),
        })
}
