//! Column identifiers and immutable column storage.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};
use crate::value::{Value, ValueKind};

/// A typed column identifier: a name plus the semantic kind of the values
/// stored under it.
///
/// Identity is by name alone; two ids with the same name but different kinds
/// refer to the same column slot and are rejected wherever they would meet
/// (building a data set, declaring a node's outputs). This keeps lookups
/// cheap while still letting every read site state the kind it expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnId {
    name: String,
    kind: ValueKind,
}

impl ColumnId {
    /// Creates a new column id.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Creates a boolean column id.
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Bool)
    }

    /// Creates an integer column id.
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Int)
    }

    /// Creates a floating point column id.
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Float)
    }

    /// Creates a text column id.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Text)
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared value kind.
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns a copy of this id under a different name, keeping the kind.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.kind)
    }
}

impl PartialEq for ColumnId {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ColumnId {}

impl Hash for ColumnId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for ColumnId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ColumnId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// An immutable, reference-counted sequence of cells of one kind.
///
/// Cloning a column is cheap; the cells are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    kind: ValueKind,
    cells: Arc<[Value]>,
}

impl Column {
    /// Creates a column for the given id, kind-checking every cell.
    ///
    /// [`Value::Null`] cells are admitted for any kind.
    pub fn new(id: &ColumnId, cells: Vec<Value>) -> DataResult<Self> {
        for cell in &cells {
            if let Some(actual) = cell.kind() {
                if actual != id.kind() {
                    return Err(DataError::TypeMismatch {
                        column: id.name().to_string(),
                        expected: id.kind(),
                        actual,
                    });
                }
            }
        }
        Ok(Self {
            kind: id.kind(),
            cells: cells.into(),
        })
    }

    /// Returns the kind of the stored cells.
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell at `row`, if in range.
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.cells.get(row)
    }

    /// Returns an iterator over the cells.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter()
    }

    /// Returns the cells as a slice.
    pub fn values(&self) -> &[Value] {
        &self.cells
    }
}
