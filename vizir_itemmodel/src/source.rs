// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The item source seam: what the pipeline reads and the events it listens to.

use core::ops::Range;
use std::sync::mpsc;

use smallvec::SmallVec;

use crate::{Axis, CellValue, RoleId};

/// Roles named by a [`SourceEvent::CellsChanged`]; empty means "any role".
pub type RoleFilter = SmallVec<[RoleId; 4]>;

/// A tabular data provider.
///
/// Cells are addressed by `(row, column, role)`. The pipeline never owns a source; it holds a
/// shared handle and reads its current state whenever it resolves.
pub trait ItemSource {
    /// Returns the number of rows.
    fn row_count(&self) -> usize;

    /// Returns the number of columns.
    fn column_count(&self) -> usize;

    /// Maps a role name to its id, if the source knows it.
    fn role_id(&self, name: &str) -> Option<RoleId>;

    /// Reads one cell role. Out-of-range positions and unset roles yield [`CellValue::Empty`].
    fn data(&self, row: usize, column: usize, role: RoleId) -> CellValue;

    /// Reads a row ([`Axis::Vertical`]) or column ([`Axis::Horizontal`]) header label.
    fn header_data(&self, axis: Axis, section: usize) -> Option<String>;

    /// Registers a sink that receives this source's mutation events from now on.
    ///
    /// Sources should drop sinks whose [`SourceSink::send`] fails.
    fn connect(&self, sink: SourceSink);
}

/// A mutation of an [`ItemSource`].
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// Values inside a rectangle changed.
    CellsChanged {
        /// Changed rows.
        rows: Range<usize>,
        /// Changed columns.
        columns: Range<usize>,
        /// Changed roles; empty means any role.
        roles: RoleFilter,
    },
    /// Rows were inserted at `range.start`.
    RowsInserted(Range<usize>),
    /// Rows were removed.
    RowsRemoved(Range<usize>),
    /// Rows were moved so that they now start at `destination` (an index into the array as it was
    /// before the move).
    RowsMoved {
        /// Moved rows.
        source: Range<usize>,
        /// Insertion point.
        destination: usize,
    },
    /// Columns were inserted at `range.start`.
    ColumnsInserted(Range<usize>),
    /// Columns were removed.
    ColumnsRemoved(Range<usize>),
    /// Columns were moved; see [`SourceEvent::RowsMoved`].
    ColumnsMoved {
        /// Moved columns.
        source: Range<usize>,
        /// Insertion point.
        destination: usize,
    },
    /// Header labels changed.
    HeadersChanged {
        /// Header orientation.
        axis: Axis,
        /// Changed sections.
        sections: Range<usize>,
    },
    /// The source reordered its contents without a finer description.
    LayoutChanged,
    /// Everything may have changed.
    Reset,
}

/// The sending half of a pipeline's event channel.
///
/// Obtained by a source through [`ItemSource::connect`]. Once the receiving pipeline has gone away
/// (or switched to another source) [`send`](Self::send) returns `false`.
#[derive(Clone, Debug)]
pub struct SourceSink {
    tx: mpsc::Sender<SourceEvent>,
}

impl SourceSink {
    pub(crate) fn new(tx: mpsc::Sender<SourceEvent>) -> Self {
        Self { tx }
    }

    /// Delivers an event. Returns `false` if nobody listens any more.
    pub fn send(&self, event: SourceEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}
