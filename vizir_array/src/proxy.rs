// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lock-guarded ownership of one [`ValueArray`].

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};

use parking_lot::{Mutex, MutexGuard};

use crate::{ArrayChange, ArrayWriter, ItemsMut, ValueArray, ValueItem, ValueRow};

/// Exclusive access to a proxy's array, obtained with [`ArrayProxy::lock`].
///
/// Writers are blocked for as long as the guard lives, so readers that traverse the whole array
/// should hold one guard for the full traversal and drop it promptly.
pub type ArrayGuard<'a> = MutexGuard<'a, ValueArray>;

type Listener = Arc<dyn Fn(&ArrayChange) + Send + Sync>;

/// Handle returned by [`ArrayProxy::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct Labels {
    rows: Vec<String>,
    columns: Vec<String>,
}

/// Checks a caller contract.
///
/// Violations panic in debug builds. Release builds log a warning and the caller skips the
/// mutation, leaving the array untouched.
macro_rules! require {
    ($cond:expr, $($msg:tt)+) => {{
        let ok = $cond;
        debug_assert!(ok, $($msg)+);
        if !ok {
            tracing::warn!($($msg)+);
        }
        ok
    }};
}

/// Owns one [`ValueArray`] and mediates all access to it through a single exclusive lock.
///
/// All mutations hold the lock only for the data change itself. Listeners are invoked after the
/// lock is released, so they may read or even mutate the proxy again.
///
/// Out-of-range indices and row lengths that disagree with the existing rows are contract
/// violations: they panic in debug builds and are ignored (with a warning) in release builds.
///
/// When a mutation touches both the array and the labels, both are updated before any
/// notification is sent, so a listener reacting to [`ArrayChange::Reset`] sees matching labels.
pub struct ArrayProxy {
    array: Mutex<ValueArray>,
    labels: Mutex<Labels>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
}

impl fmt::Debug for ArrayProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayProxy")
            .field(
                "dimensions",
                &self.array.try_lock().map(|a| a.dimensions()),
            )
            .field("listeners", &self.listeners.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for ArrayProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayProxy {
    /// Creates a proxy owning an empty array.
    pub fn new() -> Self {
        Self {
            array: Mutex::new(ValueArray::new()),
            labels: Mutex::new(Labels::default()),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Locks the array for reading.
    ///
    /// This is the lock every mutation takes; no data is copied.
    pub fn lock(&self) -> ArrayGuard<'_> {
        self.array.lock()
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.array.lock().row_count()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.array.lock().column_count()
    }

    /// Returns `(rows, columns)` read under one lock.
    pub fn dimensions(&self) -> (usize, usize) {
        self.array.lock().dimensions()
    }

    /// Returns a copy of one item.
    pub fn item_at(&self, row: usize, column: usize) -> Option<ValueItem> {
        self.array.lock().item(row, column).cloned()
    }

    /// Returns a copy of one row.
    pub fn row_at(&self, row: usize) -> Option<ValueRow> {
        self.array.lock().row(row).map(<[ValueItem]>::to_vec)
    }

    /// Returns a copy of the whole array.
    ///
    /// Prefer [`lock`](Self::lock) for per-frame reads.
    pub fn snapshot(&self) -> ValueArray {
        self.array.lock().clone()
    }

    /// Returns the row labels.
    pub fn row_labels(&self) -> Vec<String> {
        self.labels.lock().rows.clone()
    }

    /// Returns the column labels.
    pub fn column_labels(&self) -> Vec<String> {
        self.labels.lock().columns.clone()
    }

    /// Replaces the row labels. Returns `true` if they changed.
    pub fn set_row_labels(&self, labels: &[String]) -> bool {
        let changed = replace_labels(&mut self.labels.lock().rows, labels);
        if changed {
            self.emit(&[ArrayChange::RowLabelsChanged]);
        }
        changed
    }

    /// Replaces the column labels. Returns `true` if they changed.
    pub fn set_column_labels(&self, labels: &[String]) -> bool {
        let changed = replace_labels(&mut self.labels.lock().columns, labels);
        if changed {
            self.emit(&[ArrayChange::ColumnLabelsChanged]);
        }
        changed
    }

    /// Replaces the array, keeping the labels.
    ///
    /// `None` stands for an empty array. Returns `true` (and notifies [`ArrayChange::Reset`]) if
    /// the content changed; resetting an empty array to an empty array does nothing.
    pub fn reset(&self, array: Option<ValueArray>) -> bool {
        let old = {
            let mut current = self.array.lock();
            replace_array(&mut current, array)
        };
        let changed = old.is_some();
        // The old rows are freed outside the lock.
        drop(old);
        if changed {
            self.emit(&[ArrayChange::Reset]);
        }
        changed
    }

    /// Replaces the array and both label lists.
    ///
    /// Returns whether the array content changed, as [`reset`](Self::reset) does. The
    /// notifications are [`ArrayChange::Reset`] (if the content changed) followed by one per label
    /// list that differs, sent after the array and the labels are both in place.
    pub fn reset_with_labels(
        &self,
        array: Option<ValueArray>,
        row_labels: Vec<String>,
        column_labels: Vec<String>,
    ) -> bool {
        let (old, rows_changed, columns_changed) = {
            let mut current = self.array.lock();
            let mut labels = self.labels.lock();
            let old = replace_array(&mut current, array);
            let rows_changed = labels.rows != row_labels;
            let columns_changed = labels.columns != column_labels;
            if rows_changed {
                labels.rows = row_labels;
            }
            if columns_changed {
                labels.columns = column_labels;
            }
            (old, rows_changed, columns_changed)
        };
        let changed = old.is_some();
        drop(old);
        self.emit(&batch(changed, rows_changed, columns_changed));
        changed
    }

    /// Rewrites items in place.
    ///
    /// Notifies [`ArrayChange::Reset`] if `fill` returns `true`.
    pub fn overwrite(&self, fill: impl FnOnce(&mut ItemsMut<'_>) -> bool) -> bool {
        let changed = fill(&mut ItemsMut::new(&mut self.array.lock()));
        if changed {
            self.emit(&[ArrayChange::Reset]);
        }
        changed
    }

    /// Rewrites items in place and replaces both label lists.
    ///
    /// Returns what `fill` returned. Notifications follow the same order as
    /// [`reset_with_labels`](Self::reset_with_labels).
    pub fn overwrite_with_labels(
        &self,
        fill: impl FnOnce(&mut ItemsMut<'_>) -> bool,
        row_labels: &[String],
        column_labels: &[String],
    ) -> bool {
        let (changed, rows_changed, columns_changed) = {
            let mut array = self.array.lock();
            let mut labels = self.labels.lock();
            let changed = fill(&mut ItemsMut::new(&mut array));
            (
                changed,
                replace_labels(&mut labels.rows, row_labels),
                replace_labels(&mut labels.columns, column_labels),
            )
        };
        self.emit(&batch(changed, rows_changed, columns_changed));
        changed
    }

    /// Replaces the row at `index`.
    pub fn set_row(&self, index: usize, row: ValueRow) {
        self.set_rows(index, vec![row]);
    }

    /// Replaces consecutive rows starting at `index`.
    pub fn set_rows(&self, index: usize, rows: Vec<ValueRow>) {
        let count = rows.len();
        if count == 0 {
            return;
        }
        let old = {
            let mut array = self.array.lock();
            if !require!(
                index + count <= array.row_count(),
                "set_rows: rows {index}..{} out of range (row count {})",
                index + count,
                array.row_count()
            ) || !rows_fit(&array, &rows, count)
            {
                return;
            }
            array
                .rows_mut()
                .splice(index..index + count, rows)
                .collect::<Vec<_>>()
        };
        drop(old);
        self.emit(&[ArrayChange::RowsChanged {
            start: index,
            count,
        }]);
    }

    /// Appends a row. Returns the index of the new row.
    pub fn add_row(&self, row: ValueRow) -> usize {
        self.add_rows(vec![row])
    }

    /// Appends rows. Returns the index of the first new row.
    pub fn add_rows(&self, rows: Vec<ValueRow>) -> usize {
        let count = rows.len();
        let start = {
            let mut array = self.array.lock();
            let start = array.row_count();
            if count == 0 || !rows_fit(&array, &rows, 0) {
                return start;
            }
            array.rows_mut().extend(rows);
            start
        };
        self.emit(&[ArrayChange::RowsAdded { start, count }]);
        start
    }

    /// Inserts a row before `index`.
    pub fn insert_row(&self, index: usize, row: ValueRow) {
        self.insert_rows(index, vec![row]);
    }

    /// Inserts rows before `index`.
    pub fn insert_rows(&self, index: usize, rows: Vec<ValueRow>) {
        let count = rows.len();
        if count == 0 {
            return;
        }
        {
            let mut array = self.array.lock();
            if !require!(
                index <= array.row_count(),
                "insert_rows: index {index} out of range (row count {})",
                array.row_count()
            ) || !rows_fit(&array, &rows, 0)
            {
                return;
            }
            array.rows_mut().splice(index..index, rows);
        }
        self.emit(&[ArrayChange::RowsInserted {
            start: index,
            count,
        }]);
    }

    /// Removes up to `count` rows starting at `index`.
    ///
    /// `count` is clamped to the rows that exist. Nothing is notified if no row was removed.
    pub fn remove_rows(&self, index: usize, count: usize) {
        let removed = {
            let mut array = self.array.lock();
            let len = array.row_count();
            if !require!(
                index <= len,
                "remove_rows: index {index} out of range (row count {len})"
            ) {
                return;
            }
            let end = index + count.min(len - index);
            array.rows_mut().drain(index..end).collect::<Vec<_>>()
        };
        let count = removed.len();
        drop(removed);
        if count > 0 {
            self.emit(&[ArrayChange::RowsRemoved {
                start: index,
                count,
            }]);
        }
    }

    /// Replaces the item at `(row, column)`.
    pub fn set_item(&self, row: usize, column: usize, item: ValueItem) {
        {
            let mut array = self.array.lock();
            let dims = array.dimensions();
            let Some(slot) = array.item_mut(row, column) else {
                require!(
                    false,
                    "set_item: ({row}, {column}) out of range for {dims:?}"
                );
                return;
            };
            *slot = item;
        }
        self.emit(&[ArrayChange::ItemChanged { row, column }]);
    }

    /// Registers a listener for change notifications.
    ///
    /// Listeners run on the mutating thread after the array lock has been released.
    pub fn subscribe(&self, listener: impl Fn(&ArrayChange) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Registers a listener that forwards notifications into a channel.
    ///
    /// This is the convenient shape for a consumer on another thread.
    pub fn subscribe_channel(&self) -> (ListenerId, mpsc::Receiver<ArrayChange>) {
        let (tx, rx) = mpsc::channel();
        let id = self.subscribe(move |change| {
            // A dropped receiver just stops listening.
            let _ = tx.send(*change);
        });
        (id, rx)
    }

    /// Removes a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(l, _)| *l != id);
        listeners.len() != before
    }

    fn emit(&self, changes: &[ArrayChange]) {
        let listeners: Vec<Listener> = {
            let listeners = self.listeners.lock();
            if listeners.is_empty() || changes.is_empty() {
                return;
            }
            listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for change in changes {
            for listener in &listeners {
                listener(change);
            }
        }
    }
}

impl ArrayWriter for ArrayProxy {
    fn dimensions(&self) -> (usize, usize) {
        Self::dimensions(self)
    }

    fn reset_with_labels(
        &self,
        array: Option<ValueArray>,
        row_labels: Vec<String>,
        column_labels: Vec<String>,
    ) -> bool {
        Self::reset_with_labels(self, array, row_labels, column_labels)
    }

    fn overwrite_with_labels(
        &self,
        fill: &mut dyn FnMut(&mut ItemsMut<'_>) -> bool,
        row_labels: &[String],
        column_labels: &[String],
    ) -> bool {
        Self::overwrite_with_labels(self, fill, row_labels, column_labels)
    }

    fn set_item(&self, row: usize, column: usize, item: ValueItem) {
        Self::set_item(self, row, column, item);
    }
}

/// Swaps `new` into `current`. Returns the old array, or `None` if both are empty.
fn replace_array(current: &mut ValueArray, new: Option<ValueArray>) -> Option<ValueArray> {
    let new = new.unwrap_or_default();
    if current.row_count() == 0 && new.row_count() == 0 {
        return None;
    }
    Some(core::mem::replace(current, new))
}

/// The notifications for a reset or overwrite that also replaced labels, in delivery order.
fn batch(array_changed: bool, rows_changed: bool, columns_changed: bool) -> Vec<ArrayChange> {
    [
        (array_changed, ArrayChange::Reset),
        (rows_changed, ArrayChange::RowLabelsChanged),
        (columns_changed, ArrayChange::ColumnLabelsChanged),
    ]
    .into_iter()
    .filter_map(|(changed, change)| changed.then_some(change))
    .collect()
}

fn replace_labels(current: &mut Vec<String>, new: &[String]) -> bool {
    if current.as_slice() == new {
        return false;
    }
    current.clear();
    current.extend_from_slice(new);
    true
}

/// Checks that `rows` share one length that `array` accepts while `replacing` of its rows go away.
fn rows_fit(array: &ValueArray, rows: &[ValueRow], replacing: usize) -> bool {
    let Some(first) = rows.first() else {
        return true;
    };
    let len = first.len();
    require!(
        rows.iter().all(|r| r.len() == len),
        "rows of differing lengths"
    ) && require!(
        array.accepts_row_len(len, replacing),
        "row length {len} does not match column count {}",
        array.column_count()
    )
}
