// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place patching of directly mapped cells.

use core::fmt;
use core::ops::Range;

use vizir_array::ArrayWriter;

use crate::resolver::CellReader;
use crate::{ItemModelMapping, ItemSource, RoleId};

/// Result of [`FineGrainedPatcher::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The changed items were rewritten.
    Patched {
        /// Number of items written.
        items: usize,
    },
    /// The change only touched roles the mapping does not read.
    Irrelevant,
    /// The change cannot be patched; a full resolve is required.
    NeedsResolve,
}

/// Rewrites the output items of changed source cells without a full resolve.
///
/// Only direct mappings can be patched: there a source cell determines exactly one item. The
/// patch is also refused when the source and the array disagree on dimensions or the changed
/// rectangle is outside them.
pub struct FineGrainedPatcher<'a> {
    source: &'a dyn ItemSource,
    mapping: &'a ItemModelMapping,
    writer: &'a dyn ArrayWriter,
}

impl fmt::Debug for FineGrainedPatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FineGrainedPatcher")
            .field("mapping", self.mapping)
            .finish_non_exhaustive()
    }
}

impl<'a> FineGrainedPatcher<'a> {
    /// Creates a patcher writing items read from `source` through `mapping` into `writer`.
    pub fn new(
        source: &'a dyn ItemSource,
        mapping: &'a ItemModelMapping,
        writer: &'a dyn ArrayWriter,
    ) -> Self {
        Self {
            source,
            mapping,
            writer,
        }
    }

    /// Patches the items of source cells `rows x columns` whose `roles` changed.
    ///
    /// An empty `roles` filter means any role may have changed.
    pub fn apply(&self, rows: Range<usize>, columns: Range<usize>, roles: &[RoleId]) -> PatchOutcome {
        if !self.mapping.use_model_categories {
            return PatchOutcome::NeedsResolve;
        }
        let dims = (self.source.row_count(), self.source.column_count());
        if dims != self.writer.dimensions() || rows.end > dims.0 || columns.end > dims.1 {
            return PatchOutcome::NeedsResolve;
        }
        let reader = CellReader::new(self.source, self.mapping);
        if !reader.roles.touches_direct(roles) {
            return PatchOutcome::Irrelevant;
        }
        let mut items = 0;
        for row in rows {
            for column in columns.clone() {
                self.writer.set_item(row, column, reader.item(row, column));
                items += 1;
            }
        }
        tracing::trace!(items, "patched items in place");
        PatchOutcome::Patched { items }
    }
}

#[cfg(test)]
mod tests {
    use vizir_array::ArrayProxy;

    use super::*;
    use crate::{MappingResolver, Resolution, TableModel, publish};

    fn model() -> TableModel {
        let model = TableModel::new(3, 2).with_role("value").with_role("note");
        let value = model.role("value").unwrap();
        for r in 0..3 {
            for c in 0..2 {
                model.set_data(r, c, value, format!("{}", r * 10 + c));
            }
        }
        model
    }

    fn published(model: &TableModel, mapping: &ItemModelMapping) -> ArrayProxy {
        let proxy = ArrayProxy::new();
        let mut out = Resolution::new();
        MappingResolver::new().resolve(Some(model), Some(mapping), &mut out);
        publish(&proxy, &out);
        proxy
    }

    #[test]
    fn patching_matches_a_full_resolve() {
        let model = model();
        let mapping = ItemModelMapping::direct("value");
        let proxy = published(&model, &mapping);
        let value = model.role("value").unwrap();

        model.set_data(2, 1, value, "99");
        let outcome = FineGrainedPatcher::new(&model, &mapping, &proxy).apply(2..3, 1..2, &[value]);
        assert_eq!(outcome, PatchOutcome::Patched { items: 1 });

        let fresh = published(&model, &mapping);
        assert_eq!(proxy.snapshot(), fresh.snapshot());
    }

    #[test]
    fn unmapped_roles_and_categorized_mappings_are_not_patched() {
        let model = model();
        let direct = ItemModelMapping::direct("value");
        let proxy = published(&model, &direct);
        let note = model.role("note").unwrap();
        let patcher = FineGrainedPatcher::new(&model, &direct, &proxy);
        assert_eq!(patcher.apply(0..1, 0..1, &[note]), PatchOutcome::Irrelevant);
        assert_eq!(patcher.apply(0..4, 0..1, &[]), PatchOutcome::NeedsResolve);

        let categorized = ItemModelMapping::categorized("value", "note", "value");
        let patcher = FineGrainedPatcher::new(&model, &categorized, &proxy);
        assert_eq!(patcher.apply(0..1, 0..1, &[]), PatchOutcome::NeedsResolve);
    }
}
