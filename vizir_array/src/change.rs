// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications emitted by [`ArrayProxy`](crate::ArrayProxy).

/// Describes one applied mutation of a proxy's array.
///
/// Notifications are delivered in the order their mutations were applied. Each one names the
/// narrowest description of the change; consumers that only poll the array may miss individual
/// notifications but always observe a consistent array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayChange {
    /// The whole array was replaced or rewritten.
    Reset,
    /// Rows were appended at the end.
    RowsAdded {
        /// Index of the first new row.
        start: usize,
        /// Number of rows added.
        count: usize,
    },
    /// Existing rows were replaced.
    RowsChanged {
        /// Index of the first replaced row.
        start: usize,
        /// Number of rows replaced.
        count: usize,
    },
    /// Rows were removed.
    RowsRemoved {
        /// Index of the first removed row.
        start: usize,
        /// Number of rows removed.
        count: usize,
    },
    /// Rows were inserted before `start`.
    RowsInserted {
        /// Index of the first inserted row.
        start: usize,
        /// Number of rows inserted.
        count: usize,
    },
    /// A single item was replaced.
    ItemChanged {
        /// Row of the item.
        row: usize,
        /// Column of the item.
        column: usize,
    },
    /// The row labels changed.
    RowLabelsChanged,
    /// The column labels changed.
    ColumnLabelsChanged,
}
