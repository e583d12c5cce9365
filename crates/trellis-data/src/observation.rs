//! Row views over a data set.

use crate::column::ColumnId;
use crate::dataset::DataSet;
use crate::error::{DataError, DataResult};
use crate::value::{Value, ValueKind};

/// A borrowed view of a single row of a [`DataSet`].
///
/// Every observation of one data set exposes exactly the same column set,
/// by construction of the data set itself.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    data: &'a DataSet,
    row: usize,
}

impl<'a> Observation<'a> {
    pub(crate) fn new(data: &'a DataSet, row: usize) -> Self {
        Self { data, row }
    }

    /// Returns the row index of this observation.
    pub const fn index(&self) -> usize {
        self.row
    }

    /// Returns the cell stored under `id`.
    pub fn get(&self, id: &ColumnId) -> DataResult<&'a Value> {
        self.data.value(self.row, id)
    }

    /// Returns the boolean cell under `id`, `None` if the cell is null.
    pub fn bool_value(&self, id: &ColumnId) -> DataResult<Option<bool>> {
        self.typed(id, ValueKind::Bool).map(|v| v.as_bool())
    }

    /// Returns the integer cell under `id`, `None` if the cell is null.
    pub fn int_value(&self, id: &ColumnId) -> DataResult<Option<i64>> {
        self.typed(id, ValueKind::Int).map(|v| v.as_int())
    }

    /// Returns the floating point cell under `id`, `None` if the cell is null.
    pub fn float_value(&self, id: &ColumnId) -> DataResult<Option<f64>> {
        self.typed(id, ValueKind::Float).map(|v| v.as_float())
    }

    /// Returns the text cell under `id`, `None` if the cell is null.
    pub fn text_value(&self, id: &ColumnId) -> DataResult<Option<&'a str>> {
        self.typed(id, ValueKind::Text).map(|v| v.as_text())
    }

    fn typed(&self, id: &ColumnId, expected: ValueKind) -> DataResult<&'a Value> {
        if id.kind() != expected {
            return Err(DataError::TypeMismatch {
                column: id.name().to_string(),
                expected,
                actual: id.kind(),
            });
        }
        self.get(id)
    }
}

/// Iterator over the rows of a [`DataSet`].
#[derive(Debug)]
pub struct Rows<'a> {
    data: &'a DataSet,
    row: usize,
}

impl<'a> Rows<'a> {
    pub(crate) fn new(data: &'a DataSet) -> Self {
        Self { data, row: 0 }
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Observation<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.data.num_rows() {
            return None;
        }
        let obs = Observation::new(self.data, self.row);
        self.row += 1;
        Some(obs)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.num_rows() - self.row;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows<'_> {}
