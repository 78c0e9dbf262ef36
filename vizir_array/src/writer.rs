// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutation interface handed to array producers.

use crate::{ItemsMut, ValueArray, ValueItem};

/// Mutation interface used by code that publishes into an array owner.
///
/// Producers (resolvers, patchers) receive a writer instead of reaching into the owner's
/// representation. Every method takes `&self`: implementations serialize access internally and
/// raise their notifications once the mutation is complete.
pub trait ArrayWriter {
    /// Returns the current `(rows, columns)`.
    fn dimensions(&self) -> (usize, usize);

    /// Replaces the array and its labels.
    ///
    /// `None` stands for an empty array. Returns `true` if the array content changed; replacing an
    /// empty array with another empty array is a no-op. Listeners are notified once the array
    /// and the labels are both in place.
    fn reset_with_labels(
        &self,
        array: Option<ValueArray>,
        row_labels: Vec<String>,
        column_labels: Vec<String>,
    ) -> bool;

    /// Rewrites items in place and replaces the labels, keeping the dimensions.
    ///
    /// `fill` returns `true` if it changed anything. Returns what `fill` returned. Listeners are
    /// notified once the items and the labels are both in place.
    fn overwrite_with_labels(
        &self,
        fill: &mut dyn FnMut(&mut ItemsMut<'_>) -> bool,
        row_labels: &[String],
        column_labels: &[String],
    ) -> bool;

    /// Replaces one item.
    fn set_item(&self, row: usize, column: usize, item: ValueItem);
}
