// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory, mutable [`ItemSource`].

use core::cell::RefCell;
use core::ops::Range;

use smallvec::SmallVec;

use crate::{Axis, CellValue, ItemSource, RoleFilter, RoleId, SourceEvent, SourceSink};

#[derive(Clone, Debug, Default)]
struct Cell {
    roles: SmallVec<[(RoleId, CellValue); 3]>,
}

impl Cell {
    fn get(&self, role: RoleId) -> Option<&CellValue> {
        self.roles.iter().find(|(r, _)| *r == role).map(|(_, v)| v)
    }

    /// Stores `value` under `role`; an empty value clears the role. Returns `true` on change.
    fn set(&mut self, role: RoleId, value: CellValue) -> bool {
        let slot = self.roles.iter().position(|(r, _)| *r == role);
        match (slot, value.is_empty()) {
            (None, true) => false,
            (Some(i), true) => {
                self.roles.remove(i);
                true
            }
            (Some(i), false) if self.roles[i].1 == value => false,
            (Some(i), false) => {
                self.roles[i].1 = value;
                true
            }
            (None, false) => {
                self.roles.push((role, value));
                true
            }
        }
    }
}

#[derive(Debug, Default)]
struct Grid {
    rows: Vec<Vec<Cell>>,
    columns: usize,
    row_headers: Vec<Option<String>>,
    column_headers: Vec<Option<String>>,
}

impl Grid {
    fn sized(rows: usize, columns: usize) -> Self {
        Self {
            rows: vec![vec![Cell::default(); columns]; rows],
            columns,
            row_headers: vec![None; rows],
            column_headers: vec![None; columns],
        }
    }
}

/// A table of cells held in memory, each cell storing values under any number of roles.
///
/// Every mutation announces itself to connected pipelines with the narrowest [`SourceEvent`].
/// Mutations take `&self` so the model can be shared (for example through an `Rc`) with the
/// pipeline that reads it.
///
/// Role `0` is always named `"display"`; further roles are registered with
/// [`with_role`](Self::with_role).
#[derive(Debug)]
pub struct TableModel {
    roles: Vec<String>,
    grid: RefCell<Grid>,
    sinks: RefCell<Vec<SourceSink>>,
}

impl Default for TableModel {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl TableModel {
    /// Name of [`RoleId::DISPLAY`].
    pub const DISPLAY_ROLE: &'static str = "display";

    /// Creates a `rows x columns` model of empty cells.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            roles: vec![Self::DISPLAY_ROLE.to_owned()],
            grid: RefCell::new(Grid::sized(rows, columns)),
            sinks: RefCell::new(Vec::new()),
        }
    }

    /// Registers a role name. Registering a known name again has no effect.
    pub fn with_role(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.roles.contains(&name) {
            self.roles.push(name);
        }
        self
    }

    /// Returns the id of a registered role.
    pub fn role(&self, name: &str) -> Option<RoleId> {
        self.roles
            .iter()
            .position(|r| r == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(RoleId)
    }

    /// Sets one cell role. Returns `true` if the stored value changed.
    ///
    /// Out-of-range positions are ignored.
    pub fn set_data(
        &self,
        row: usize,
        column: usize,
        role: RoleId,
        value: impl Into<CellValue>,
    ) -> bool {
        let changed = self
            .grid
            .borrow_mut()
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .is_some_and(|cell| cell.set(role, value.into()));
        if changed {
            self.emit(SourceEvent::CellsChanged {
                rows: row..row + 1,
                columns: column..column + 1,
                roles: RoleFilter::from_slice(&[role]),
            });
        }
        changed
    }

    /// Sets one role over a block of cells whose top-left corner is `(row, column)`.
    ///
    /// The block is clipped to the table. A single event covering the written rectangle is
    /// emitted if any cell changed.
    pub fn set_range(&self, row: usize, column: usize, role: RoleId, block: Vec<Vec<CellValue>>) {
        let mut changed = false;
        let mut extent = (0, 0);
        {
            let mut grid = self.grid.borrow_mut();
            for (r, values) in (row..).zip(block) {
                let Some(cells) = grid.rows.get_mut(r) else {
                    break;
                };
                for (c, value) in (column..).zip(values) {
                    let Some(cell) = cells.get_mut(c) else {
                        break;
                    };
                    changed |= cell.set(role, value);
                    extent = (extent.0.max(r + 1), extent.1.max(c + 1));
                }
            }
        }
        if changed {
            self.emit(SourceEvent::CellsChanged {
                rows: row..extent.0,
                columns: column..extent.1,
                roles: RoleFilter::from_slice(&[role]),
            });
        }
    }

    /// Appends a row whose first cell carries `record`. Returns the new row index.
    ///
    /// This is the usual shape of a list-like source feeding a categorized mapping, where row and
    /// column keys are roles of a single cell. A model without columns gains one.
    pub fn append_record(&self, record: &[(RoleId, CellValue)]) -> usize {
        let row = {
            let mut grid = self.grid.borrow_mut();
            if grid.columns == 0 {
                grid.columns = 1;
                grid.column_headers.push(None);
                for cells in &mut grid.rows {
                    cells.push(Cell::default());
                }
            }
            let mut cells = vec![Cell::default(); grid.columns];
            for (role, value) in record {
                cells[0].set(*role, value.clone());
            }
            grid.rows.push(cells);
            grid.row_headers.push(None);
            grid.rows.len() - 1
        };
        self.emit(SourceEvent::RowsInserted(row..row + 1));
        row
    }

    /// Inserts `count` empty rows before `at` (clamped to the row count).
    pub fn insert_rows(&self, at: usize, count: usize) {
        if count == 0 {
            return;
        }
        let at = {
            let mut grid = self.grid.borrow_mut();
            let at = at.min(grid.rows.len());
            let blank = vec![Cell::default(); grid.columns];
            grid.rows
                .splice(at..at, core::iter::repeat_n(blank, count));
            grid.row_headers
                .splice(at..at, core::iter::repeat_n(None, count));
            at
        };
        self.emit(SourceEvent::RowsInserted(at..at + count));
    }

    /// Removes up to `count` rows starting at `at`.
    pub fn remove_rows(&self, at: usize, count: usize) {
        let Some(range) = self.clamp(at, count, |g| g.rows.len()) else {
            return;
        };
        {
            let mut grid = self.grid.borrow_mut();
            grid.rows.drain(range.clone());
            grid.row_headers.drain(range.clone());
        }
        self.emit(SourceEvent::RowsRemoved(range));
    }

    /// Moves `source` rows before row `destination` (an index before the move).
    ///
    /// Moves into the moved range itself, or with out-of-range indices, are ignored.
    pub fn move_rows(&self, source: Range<usize>, destination: usize) {
        let moved = {
            let mut grid = self.grid.borrow_mut();
            let len = grid.rows.len();
            move_range(&mut grid.rows, len, &source, destination)
                && move_range(&mut grid.row_headers, len, &source, destination)
        };
        if moved {
            self.emit(SourceEvent::RowsMoved {
                source,
                destination,
            });
        }
    }

    /// Inserts `count` empty columns before `at` (clamped to the column count).
    pub fn insert_columns(&self, at: usize, count: usize) {
        if count == 0 {
            return;
        }
        let at = {
            let mut grid = self.grid.borrow_mut();
            let at = at.min(grid.columns);
            for cells in &mut grid.rows {
                cells.splice(at..at, core::iter::repeat_n(Cell::default(), count));
            }
            grid.column_headers
                .splice(at..at, core::iter::repeat_n(None, count));
            grid.columns += count;
            at
        };
        self.emit(SourceEvent::ColumnsInserted(at..at + count));
    }

    /// Removes up to `count` columns starting at `at`.
    pub fn remove_columns(&self, at: usize, count: usize) {
        let Some(range) = self.clamp(at, count, |g| g.columns) else {
            return;
        };
        {
            let mut grid = self.grid.borrow_mut();
            for cells in &mut grid.rows {
                cells.drain(range.clone());
            }
            grid.column_headers.drain(range.clone());
            grid.columns -= range.len();
        }
        self.emit(SourceEvent::ColumnsRemoved(range));
    }

    /// Moves `source` columns before column `destination`; see [`move_rows`](Self::move_rows).
    pub fn move_columns(&self, source: Range<usize>, destination: usize) {
        let moved = {
            let mut grid = self.grid.borrow_mut();
            let len = grid.columns;
            let mut moved = move_range(&mut grid.column_headers, len, &source, destination);
            if moved {
                for cells in &mut grid.rows {
                    moved &= move_range(cells, len, &source, destination);
                }
            }
            moved
        };
        if moved {
            self.emit(SourceEvent::ColumnsMoved {
                source,
                destination,
            });
        }
    }

    /// Sets a row or column header label. Out-of-range sections are ignored.
    pub fn set_header_data(&self, axis: Axis, section: usize, label: Option<String>) {
        let changed = {
            let mut grid = self.grid.borrow_mut();
            let headers = match axis {
                Axis::Horizontal => &mut grid.column_headers,
                Axis::Vertical => &mut grid.row_headers,
            };
            match headers.get_mut(section) {
                Some(slot) if *slot != label => {
                    *slot = label;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.emit(SourceEvent::HeadersChanged {
                axis,
                sections: section..section + 1,
            });
        }
    }

    /// Replaces the whole table with `rows x columns` empty cells and no headers.
    pub fn reset(&self, rows: usize, columns: usize) {
        *self.grid.borrow_mut() = Grid::sized(rows, columns);
        self.emit(SourceEvent::Reset);
    }

    fn clamp(&self, at: usize, count: usize, len: impl Fn(&Grid) -> usize) -> Option<Range<usize>> {
        let len = len(&*self.grid.borrow());
        let end = at.saturating_add(count).min(len);
        (at < end).then_some(at..end)
    }

    fn emit(&self, event: SourceEvent) {
        self.sinks.borrow_mut().retain(|sink| sink.send(event.clone()));
    }
}

/// Rotates `source` in front of `destination`. Returns `false` if the move is invalid or a no-op.
fn move_range<T>(items: &mut [T], len: usize, source: &Range<usize>, destination: usize) -> bool {
    if items.len() != len
        || source.start >= source.end
        || source.end > len
        || destination > len
        || (source.start..=source.end).contains(&destination)
    {
        return false;
    }
    let count = source.len();
    if destination > source.end {
        items[source.start..destination].rotate_left(count);
    } else {
        items[destination..source.end].rotate_right(count);
    }
    true
}

impl ItemSource for TableModel {
    fn row_count(&self) -> usize {
        self.grid.borrow().rows.len()
    }

    fn column_count(&self) -> usize {
        self.grid.borrow().columns
    }

    fn role_id(&self, name: &str) -> Option<RoleId> {
        self.role(name)
    }

    fn data(&self, row: usize, column: usize, role: RoleId) -> CellValue {
        self.grid
            .borrow()
            .rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|cell| cell.get(role))
            .cloned()
            .unwrap_or_default()
    }

    fn header_data(&self, axis: Axis, section: usize) -> Option<String> {
        let grid = self.grid.borrow();
        let headers = match axis {
            Axis::Horizontal => &grid.column_headers,
            Axis::Vertical => &grid.row_headers,
        };
        headers.get(section).cloned().flatten()
    }

    fn connect(&self, sink: SourceSink) {
        self.sinks.borrow_mut().push(sink);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn connected(model: &TableModel) -> mpsc::Receiver<SourceEvent> {
        let (tx, rx) = mpsc::channel();
        model.connect(SourceSink::new(tx));
        rx
    }

    #[test]
    fn set_data_emits_only_on_change() {
        let model = TableModel::new(2, 2).with_role("value");
        let value = model.role("value").unwrap();
        let rx = connected(&model);

        assert!(model.set_data(1, 0, value, 3.0), "new value");
        assert!(!model.set_data(1, 0, value, 3.0), "same value");
        assert!(!model.set_data(5, 0, value, 3.0), "out of range");
        assert_eq!(model.data(1, 0, value), CellValue::Number(3.0));
        assert_eq!(model.data(1, 0, RoleId::DISPLAY), CellValue::Empty);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![SourceEvent::CellsChanged {
                rows: 1..2,
                columns: 0..1,
                roles: RoleFilter::from_slice(&[value]),
            }]
        );
    }

    #[test]
    fn set_range_reports_the_clipped_rectangle() {
        let model = TableModel::new(2, 2);
        let rx = connected(&model);
        model.set_range(
            1,
            0,
            RoleId::DISPLAY,
            vec![vec![1.0.into(), 2.0.into(), 3.0.into()], vec![4.0.into()]],
        );
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![SourceEvent::CellsChanged {
                rows: 1..2,
                columns: 0..2,
                roles: RoleFilter::from_slice(&[RoleId::DISPLAY]),
            }]
        );
        assert_eq!(model.data(1, 1, RoleId::DISPLAY), CellValue::Number(2.0));
    }

    #[test]
    fn moving_rows_follows_destination_before_move() {
        let model = TableModel::new(4, 1);
        for r in 0..4 {
            model.set_data(r, 0, RoleId::DISPLAY, f64::from(u8::try_from(r).unwrap()));
        }
        let rx = connected(&model);
        model.move_rows(0..1, 3);
        let order: Vec<f64> = (0..4)
            .map(|r| model.data(r, 0, RoleId::DISPLAY).to_number())
            .collect();
        assert_eq!(order, vec![1.0, 2.0, 0.0, 3.0]);

        model.move_rows(3..4, 0);
        let order: Vec<f64> = (0..4)
            .map(|r| model.data(r, 0, RoleId::DISPLAY).to_number())
            .collect();
        assert_eq!(order, vec![3.0, 1.0, 2.0, 0.0]);

        model.move_rows(1..2, 2);
        assert_eq!(rx.try_iter().count(), 2, "a no-op move emits nothing");
    }

    #[test]
    fn structural_edits_keep_headers_aligned() {
        let model = TableModel::new(2, 2);
        model.set_header_data(Axis::Horizontal, 1, Some("b".into()));
        model.insert_columns(0, 1);
        assert_eq!(model.column_count(), 3);
        assert_eq!(model.header_data(Axis::Horizontal, 2).as_deref(), Some("b"));
        model.remove_columns(0, 2);
        assert_eq!(model.header_data(Axis::Horizontal, 0).as_deref(), Some("b"));
        model.remove_rows(1, 10);
        assert_eq!(model.row_count(), 1);
    }

    #[test]
    fn dropped_sinks_are_pruned() {
        let model = TableModel::new(1, 1);
        drop(connected(&model));
        model.reset(1, 1);
        assert!(model.sinks.borrow().is_empty(), "dead sink kept");
    }
}
