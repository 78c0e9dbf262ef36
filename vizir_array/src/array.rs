// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense row-major value arrays.

use core::ops::Range;

use crate::ValueItem;

/// One row of a [`ValueArray`].
pub type ValueRow = Vec<ValueItem>;

/// Errors returned when building a [`ValueArray`] from caller-provided rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayError {
    /// A row's length disagrees with the first row.
    #[error("row {row} has {found} items, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
}

/// A 2-D array of [`ValueItem`]s where every row has the same length.
///
/// Row and column counts are always derived from the rows themselves, so they cannot drift from
/// the stored data. The column count is the length of the first row (`0` for an empty array).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueArray {
    rows: Vec<ValueRow>,
}

impl ValueArray {
    /// Creates an empty array.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Creates a `rows x columns` array of default items.
    pub fn filled(rows: usize, columns: usize) -> Self {
        Self {
            rows: vec![vec![ValueItem::default(); columns]; rows],
        }
    }

    /// Creates a `rows x columns` array with items produced by `f(row, column)`.
    pub fn from_fn(
        rows: usize,
        columns: usize,
        mut f: impl FnMut(usize, usize) -> ValueItem,
    ) -> Self {
        Self {
            rows: (0..rows)
                .map(|r| (0..columns).map(|c| f(r, c)).collect())
                .collect(),
        }
    }

    /// Builds an array from rows, validating that all rows have the same length.
    pub fn from_rows(rows: Vec<ValueRow>) -> Result<Self, ArrayError> {
        if let Some(first) = rows.first() {
            let expected = first.len();
            if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
                return Err(ArrayError::RaggedRow {
                    row,
                    expected,
                    found: r.len(),
                });
            }
        }
        Ok(Self { rows })
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Returns `(rows, columns)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// Returns `true` if the array holds no items.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[ValueRow] {
        &self.rows
    }

    /// Returns a row by index.
    pub fn row(&self, row: usize) -> Option<&[ValueItem]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Returns an item by position.
    pub fn item(&self, row: usize, column: usize) -> Option<&ValueItem> {
        self.rows.get(row)?.get(column)
    }

    /// Returns a mutable item by position.
    ///
    /// Only the item is exposed mutably; rows cannot be resized through this accessor.
    pub fn item_mut(&mut self, row: usize, column: usize) -> Option<&mut ValueItem> {
        self.rows.get_mut(row)?.get_mut(column)
    }

    /// Returns the `(min, max)` item value over the given rectangle.
    ///
    /// The range is clipped to the array. Limits start at `0.0`, so the result always includes
    /// the zero baseline; an empty rectangle yields `(0.0, 0.0)`.
    pub fn value_limits(&self, rows: Range<usize>, columns: Range<usize>) -> (f64, f64) {
        let mut limits = (0.0_f64, 0.0_f64);
        let row_end = rows.end.min(self.row_count());
        let col_end = columns.end.min(self.column_count());
        for row in self.rows.get(rows.start..row_end).unwrap_or_default() {
            for item in row.get(columns.start..col_end).unwrap_or_default() {
                limits.0 = limits.0.min(item.value);
                limits.1 = limits.1.max(item.value);
            }
        }
        limits
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<ValueRow> {
        &mut self.rows
    }

    /// Returns `true` if `len` is an acceptable length for a row entering this array while
    /// `replacing` rows are removed.
    pub(crate) fn accepts_row_len(&self, len: usize, replacing: usize) -> bool {
        self.row_count() <= replacing || len == self.column_count()
    }
}

/// Item-level mutable access to a [`ValueArray`] that cannot change its dimensions.
///
/// Handed to [`ArrayProxy::overwrite`](crate::ArrayProxy::overwrite) fills.
#[derive(Debug)]
pub struct ItemsMut<'a> {
    array: &'a mut ValueArray,
}

impl<'a> ItemsMut<'a> {
    pub(crate) fn new(array: &'a mut ValueArray) -> Self {
        Self { array }
    }

    /// Returns `(rows, columns)`.
    pub fn dimensions(&self) -> (usize, usize) {
        self.array.dimensions()
    }

    /// Returns an item by position.
    pub fn item(&self, row: usize, column: usize) -> Option<&ValueItem> {
        self.array.item(row, column)
    }

    /// Returns a mutable item by position.
    pub fn item_mut(&mut self, row: usize, column: usize) -> Option<&mut ValueItem> {
        self.array.item_mut(row, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_are_derived_from_rows() {
        let a = ValueArray::filled(3, 4);
        assert_eq!(a.dimensions(), (3, 4));
        assert!(!a.is_empty(), "3x4 is not empty");

        let empty_rows = ValueArray::filled(2, 0);
        assert_eq!(empty_rows.dimensions(), (2, 0));
        assert!(empty_rows.is_empty(), "zero columns hold no items");
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = ValueArray::from_rows(vec![
            vec![ValueItem::new(1.0), ValueItem::new(2.0)],
            vec![ValueItem::new(3.0)],
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ArrayError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn value_limits_include_zero_and_clip_ranges() {
        let a = ValueArray::from_rows(vec![
            vec![ValueItem::new(2.0), ValueItem::new(5.0)],
            vec![ValueItem::new(-1.0), ValueItem::new(3.0)],
        ])
        .unwrap();
        assert_eq!(a.value_limits(0..10, 0..10), (-1.0, 5.0));
        assert_eq!(a.value_limits(0..1, 0..1), (0.0, 2.0));
        assert_eq!(a.value_limits(5..9, 0..2), (0.0, 0.0));
    }

    #[test]
    fn items_mut_writes_items_but_not_shape() {
        let mut a = ValueArray::filled(2, 2);
        let mut items = ItemsMut::new(&mut a);
        assert_eq!(items.dimensions(), (2, 2));
        assert!(items.item_mut(2, 0).is_none(), "row out of range");
        assert!(items.item_mut(0, 2).is_none(), "column out of range");
        items.item_mut(1, 0).unwrap().value = 4.0;
        assert_eq!(items.item(1, 0).map(|i| i.value), Some(4.0));
        assert_eq!(a.dimensions(), (2, 2));
    }
}
