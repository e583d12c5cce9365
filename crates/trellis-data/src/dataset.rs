//! Immutable column-oriented data sets.

use crate::column::{Column, ColumnId};
use crate::error::{DataError, DataResult};
use crate::observation::{Observation, Rows};
use crate::value::Value;

/// An immutable table of named, typed columns of equal length.
///
/// Columns are kept sorted by name, so two data sets built from the same
/// columns compare equal regardless of insertion order. Every operation
/// returns a new `DataSet`; columns are reference counted, making those
/// copies cheap to produce and share across concurrent readers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    ids: Vec<ColumnId>,
    columns: Vec<Column>,
}

impl DataSet {
    /// Returns a builder for assembling a data set column by column.
    pub fn builder() -> DataSetBuilder {
        DataSetBuilder::default()
    }

    /// Returns an empty data set with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a single-column data set.
    pub fn single(id: ColumnId, cells: Vec<Value>) -> DataResult<Self> {
        Self::builder().column(id, cells).build()
    }

    /// Creates a data set from row-major data.
    ///
    /// Every row must have exactly one cell per id, kind-compatible with the
    /// id at the same position.
    pub fn from_matrix(ids: &[ColumnId], rows: Vec<Vec<Value>>) -> DataResult<Self> {
        let mut cells: Vec<Vec<Value>> = ids.iter().map(|_| Vec::with_capacity(rows.len())).collect();
        for row in rows {
            if row.len() != ids.len() {
                return Err(DataError::ColumnLengthMismatch {
                    expected: ids.len(),
                    actual: row.len(),
                });
            }
            for (slot, value) in cells.iter_mut().zip(row) {
                slot.push(value);
            }
        }

        let mut builder = Self::builder();
        for (id, column) in ids.iter().zip(cells) {
            builder = builder.column(id.clone(), column);
        }
        builder.build()
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns whether the data set has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column ids, sorted by name.
    pub fn column_ids(&self) -> &[ColumnId] {
        &self.ids
    }

    /// Returns an iterator over `(id, column)` pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&ColumnId, &Column)> {
        self.ids.iter().zip(self.columns.iter())
    }

    /// Returns the column stored under `id`.
    ///
    /// Fails with [`DataError::MissingColumn`] if no column has that name and
    /// [`DataError::TypeMismatch`] if the stored kind differs from the id's.
    pub fn column(&self, id: &ColumnId) -> DataResult<&Column> {
        let idx = self
            .ids
            .binary_search_by(|probe| probe.name().cmp(id.name()))
            .map_err(|_| DataError::MissingColumn {
                name: id.name().to_string(),
            })?;
        let column = &self.columns[idx];
        if column.kind() != id.kind() {
            return Err(DataError::TypeMismatch {
                column: id.name().to_string(),
                expected: id.kind(),
                actual: column.kind(),
            });
        }
        Ok(column)
    }

    /// Returns whether a column with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.ids
            .binary_search_by(|probe| probe.name().cmp(name))
            .is_ok()
    }

    /// Returns the cell at `(row, id)`.
    pub fn value(&self, row: usize, id: &ColumnId) -> DataResult<&Value> {
        let column = self.column(id)?;
        column.get(row).ok_or(DataError::RowOutOfRange {
            row,
            num_rows: self.num_rows(),
        })
    }

    /// Returns a new data set containing exactly the requested columns.
    pub fn project(&self, ids: &[ColumnId]) -> DataResult<Self> {
        let mut builder = Self::builder();
        for id in ids {
            let column = self.column(id)?.clone();
            builder = builder.prebuilt(id.clone(), column);
        }
        builder.build()
    }

    /// Returns a new data set without the named columns.
    ///
    /// Names that do not match any column are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Self {
        let (ids, columns) = self
            .columns()
            .filter(|(id, _)| !names.contains(&id.name()))
            .map(|(id, column)| (id.clone(), column.clone()))
            .unzip();
        Self { ids, columns }
    }

    /// Joins two data sets row for row by position.
    ///
    /// Fails with [`DataError::RowCountMismatch`] if the row counts differ
    /// and [`DataError::DuplicateColumn`] if a column name appears in both.
    pub fn zip(&self, other: &Self) -> DataResult<Self> {
        if self.num_rows() != other.num_rows() {
            return Err(DataError::RowCountMismatch {
                left: self.num_rows(),
                right: other.num_rows(),
            });
        }

        let mut builder = Self::builder();
        for (id, column) in self.columns().chain(other.columns()) {
            builder = builder.prebuilt(id.clone(), column.clone());
        }
        builder.build()
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> Rows<'_> {
        Rows::new(self)
    }

    /// Returns the row at `row`.
    pub fn row(&self, row: usize) -> DataResult<Observation<'_>> {
        if row >= self.num_rows() {
            return Err(DataError::RowOutOfRange {
                row,
                num_rows: self.num_rows(),
            });
        }
        Ok(Observation::new(self, row))
    }
}

/// Builder for [`DataSet`], validating all invariants at [`build`].
///
/// [`build`]: DataSetBuilder::build
#[derive(Debug, Default)]
pub struct DataSetBuilder {
    entries: Vec<(ColumnId, Entry)>,
}

#[derive(Debug)]
enum Entry {
    Cells(Vec<Value>),
    Prebuilt(Column),
}

impl DataSetBuilder {
    /// Adds a column from raw cells; cells are kind-checked at build time.
    pub fn column(mut self, id: ColumnId, cells: Vec<Value>) -> Self {
        self.entries.push((id, Entry::Cells(cells)));
        self
    }

    /// Adds an already constructed column, rechecking its kind against `id`.
    pub fn prebuilt(mut self, id: ColumnId, column: Column) -> Self {
        self.entries.push((id, Entry::Prebuilt(column)));
        self
    }

    /// Validates and builds the data set.
    pub fn build(self) -> DataResult<DataSet> {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (id, entry) in self.entries {
            let column = match entry {
                Entry::Cells(cells) => Column::new(&id, cells)?,
                Entry::Prebuilt(column) => {
                    if column.kind() != id.kind() {
                        return Err(DataError::TypeMismatch {
                            column: id.name().to_string(),
                            expected: id.kind(),
                            actual: column.kind(),
                        });
                    }
                    column
                }
            };
            pairs.push((id, column));
        }

        pairs.sort_by(|(a, _), (b, _)| a.name().cmp(b.name()));

        let mut len = None;
        for window in pairs.windows(2) {
            if window[0].0.name() == window[1].0.name() {
                return Err(DataError::DuplicateColumn {
                    name: window[0].0.name().to_string(),
                });
            }
        }
        for (_, column) in &pairs {
            match len {
                None => len = Some(column.len()),
                Some(expected) if expected != column.len() => {
                    return Err(DataError::ColumnLengthMismatch {
                        expected,
                        actual: column.len(),
                    });
                }
                Some(_) => {}
            }
        }

        let (ids, columns) = pairs.into_iter().unzip();
        Ok(DataSet { ids, columns })
    }
}
