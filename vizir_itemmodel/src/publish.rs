// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Publishing a resolution into an array owner.

use vizir_array::{ArrayWriter, ItemsMut};

use crate::Resolution;

/// How [`publish`] delivered a resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Both the old and the new array are empty; nothing was announced.
    Unchanged,
    /// The dimensions matched and the existing storage was overwritten in place.
    Reused {
        /// Whether any item differed.
        changed: bool,
    },
    /// The array was replaced by a newly allocated one.
    Replaced,
}

/// Hands `resolution` to `writer`.
///
/// When the writer's array already has the resolved dimensions its items are overwritten in
/// place, and a reset is only announced if some item actually changed. Otherwise a new array is
/// allocated and swapped in. Labels are updated in both cases, before any notification is sent.
pub fn publish(writer: &dyn ArrayWriter, resolution: &Resolution) -> PublishOutcome {
    let dims = resolution.dimensions();
    if dims.0 > 0 && dims == writer.dimensions() {
        let changed = writer.overwrite_with_labels(
            &mut |items: &mut ItemsMut<'_>| {
                let mut changed = false;
                for (r, row) in (0..dims.0).filter_map(|r| Some((r, resolution.row(r)?))) {
                    for (c, item) in row.iter().enumerate() {
                        if let Some(slot) = items.item_mut(r, c) {
                            changed |= slot.assign(item);
                        }
                    }
                }
                changed
            },
            resolution.row_labels(),
            resolution.column_labels(),
        );
        PublishOutcome::Reused { changed }
    } else if writer.reset_with_labels(
        Some(resolution.to_array()),
        resolution.row_labels().to_vec(),
        resolution.column_labels().to_vec(),
    ) {
        PublishOutcome::Replaced
    } else {
        PublishOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use vizir_array::{ArrayChange, ArrayProxy};

    use super::*;
    use crate::{ItemModelMapping, MappingResolver, RoleId, TableModel};

    fn resolved(model: &TableModel) -> Resolution {
        let mut out = Resolution::new();
        MappingResolver::new().resolve(Some(model), Some(&ItemModelMapping::direct("")), &mut out);
        out
    }

    #[test]
    fn same_dimensions_reuse_storage() {
        let model = TableModel::new(2, 2);
        let proxy = ArrayProxy::new();
        assert_eq!(publish(&proxy, &resolved(&model)), PublishOutcome::Replaced);
        let storage = proxy.lock().rows().as_ptr();
        let (_, rx) = proxy.subscribe_channel();

        assert_eq!(
            publish(&proxy, &resolved(&model)),
            PublishOutcome::Reused { changed: false }
        );
        assert_eq!(rx.try_iter().count(), 0, "nothing changed, nothing announced");

        model.set_data(0, 1, RoleId::DISPLAY, 2.5);
        assert_eq!(
            publish(&proxy, &resolved(&model)),
            PublishOutcome::Reused { changed: true }
        );
        assert_eq!(proxy.lock().rows().as_ptr(), storage);
        assert_eq!(proxy.item_at(0, 1).map(|i| i.value), Some(2.5));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![ArrayChange::Reset]);
    }

    #[test]
    fn dimension_change_replaces_and_empty_to_empty_is_silent() {
        let proxy = ArrayProxy::new();
        let empty = Resolution::new();
        assert_eq!(publish(&proxy, &empty), PublishOutcome::Unchanged);

        let model = TableModel::new(1, 3);
        assert_eq!(publish(&proxy, &resolved(&model)), PublishOutcome::Replaced);
        assert_eq!(proxy.dimensions(), (1, 3));
        assert_eq!(publish(&proxy, &empty), PublishOutcome::Replaced);
        assert_eq!(proxy.dimensions(), (0, 0));
    }
}
