// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coalescing of resolve requests into one per event-loop turn.
//!
//! ```text
//! [cells changed]    ─┐
//! [rows/columns ...] ─┼─→ ChangeDebouncer ─→ take() ─→ one resolve
//! [source reset]     ─┤    (coalesce)        (next turn)
//! [mapping changed]  ─┘
//! ```
//!
//! The debouncer holds no timer. The host loop drains its event queue, then calls
//! [`ChangeDebouncer::take`] once; a pending request yields exactly one resolve against the state
//! of the source and mapping at that moment.

use crate::SourceEvent;

/// Why a resolve was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolveTrigger {
    /// Cell values changed and could not be patched.
    CellsChanged,
    /// Rows were inserted.
    RowsInserted,
    /// Rows were removed.
    RowsRemoved,
    /// Rows were moved.
    RowsMoved,
    /// Columns were inserted.
    ColumnsInserted,
    /// Columns were removed.
    ColumnsRemoved,
    /// Columns were moved.
    ColumnsMoved,
    /// Header labels changed.
    HeadersChanged,
    /// The source reordered its contents.
    LayoutChanged,
    /// The source was reset.
    SourceReset,
    /// A different source was attached (or the source was detached).
    SourceChanged,
    /// The mapping changed.
    MappingChanged,
}

impl ResolveTrigger {
    /// Classifies a source event.
    pub fn of(event: &SourceEvent) -> Self {
        match event {
            SourceEvent::CellsChanged { .. } => Self::CellsChanged,
            SourceEvent::RowsInserted(_) => Self::RowsInserted,
            SourceEvent::RowsRemoved(_) => Self::RowsRemoved,
            SourceEvent::RowsMoved { .. } => Self::RowsMoved,
            SourceEvent::ColumnsInserted(_) => Self::ColumnsInserted,
            SourceEvent::ColumnsRemoved(_) => Self::ColumnsRemoved,
            SourceEvent::ColumnsMoved { .. } => Self::ColumnsMoved,
            SourceEvent::HeadersChanged { .. } => Self::HeadersChanged,
            SourceEvent::LayoutChanged => Self::LayoutChanged,
            SourceEvent::Reset => Self::SourceReset,
        }
    }
}

/// A scheduled resolve, as handed out by [`ChangeDebouncer::take`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingResolve {
    /// The request that scheduled the resolve.
    pub first: ResolveTrigger,
    /// The most recent request.
    pub last: ResolveTrigger,
    /// Number of requests coalesced into this resolve.
    pub coalesced: usize,
}

/// Collapses any number of resolve requests into a single pending resolve.
#[derive(Clone, Debug, Default)]
pub struct ChangeDebouncer {
    pending: Option<PendingResolve>,
}

impl ChangeDebouncer {
    /// Creates an idle debouncer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a resolve.
    ///
    /// Returns `true` if this request scheduled one, `false` if one was already pending.
    pub fn request(&mut self, trigger: ResolveTrigger) -> bool {
        match &mut self.pending {
            Some(pending) => {
                pending.last = trigger;
                pending.coalesced += 1;
                tracing::trace!(?trigger, coalesced = pending.coalesced, "resolve already pending");
                false
            }
            None => {
                self.pending = Some(PendingResolve {
                    first: trigger,
                    last: trigger,
                    coalesced: 1,
                });
                tracing::trace!(?trigger, "resolve scheduled");
                true
            }
        }
    }

    /// Returns `true` if a resolve is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the number of requests coalesced into the pending resolve.
    pub fn pending_count(&self) -> usize {
        self.pending.map_or(0, |p| p.coalesced)
    }

    /// Clears and returns the pending resolve. The caller runs it.
    pub fn take(&mut self) -> Option<PendingResolve> {
        self.pending.take()
    }
}
