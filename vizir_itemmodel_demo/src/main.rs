// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rainfall bars fed from a live item model.
//!
//! The main thread plays the host event loop: it edits a [`TableModel`] and lets an
//! [`ItemModelHandler`] resolve the edits once per turn. A render thread waits for array change
//! notifications and lays out bars while holding the proxy's lock.
//!
//! Set `RUST_LOG=debug` (or `trace`) to watch the pipeline.

mod bars;
mod scale;

use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use kurbo::Size;
use tracing_subscriber::EnvFilter;
use vizir_array::{ArrayChange, ArrayProxy};
use vizir_itemmodel::{
    ItemModelHandler, ItemModelMapping, ItemSource, MultiMatch, RoleId, RoleTransform, TableModel,
};

const RAINFALL: [(&str, &str); 8] = [
    ("2000-01", "37.4 mm"),
    ("2000-02", "21.0 mm"),
    ("2000-03", "41.2 mm"),
    ("2001-01", "52.9 mm"),
    ("2001-02", "18.3 mm"),
    ("2001-03", "33.1 mm"),
    ("2002-01", "44.0 mm"),
    ("2002-02", "27.5 mm"),
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let model = Rc::new(TableModel::new(0, 1).with_role("month").with_role("rain"));
    let (Some(month), Some(rain)) = (model.role("month"), model.role("rain")) else {
        tracing::error!("model roles missing");
        return;
    };
    for (when, amount) in RAINFALL {
        model.append_record(&[(month, when.into()), (rain, amount.into())]);
    }

    let mapping = match categorized_mapping() {
        Ok(mapping) => mapping,
        Err(err) => {
            tracing::error!(%err, "invalid mapping");
            return;
        }
    };

    let proxy = Arc::new(ArrayProxy::new());
    let (listener, changes) = proxy.subscribe_channel();
    let render_proxy = Arc::clone(&proxy);
    let render = thread::spawn(move || {
        let size = Size::new(640.0, 320.0);
        let mut frame = 0_u32;
        while let Ok(change) = changes.recv() {
            // Skip ahead to the newest state; the array is read under the lock anyway.
            let skipped = changes.try_iter().count();
            frame += 1;
            let array = render_proxy.lock();
            let bars = bars::layout(&array, size);
            let tallest = bars
                .iter()
                .max_by(|a, b| a.rect.height().total_cmp(&b.rect.height()));
            println!(
                "frame {frame}: {change:?} (+{skipped} more), {}x{} array, {} bars{}",
                array.row_count(),
                array.column_count(),
                bars.len(),
                tallest.map_or(String::new(), |b| format!(
                    ", tallest at ({}, {}) {:.1}px {:?}",
                    b.row,
                    b.column,
                    b.rect.height(),
                    b.fill
                )),
            );
            if matches!(change, ArrayChange::RowLabelsChanged) {
                drop(array);
                println!("  rows: {:?}", render_proxy.row_labels());
            }
        }
    });

    let mut handler = ItemModelHandler::new(Arc::clone(&proxy)).with_mapping(mapping);
    handler.set_source(Some(Rc::clone(&model) as Rc<dyn ItemSource>));
    handler.turn();
    tracing::info!(
        years = ?handler.mapping().map(|m| m.row_categories.names().to_vec()),
        "initial resolve"
    );

    // A burst of edits within one turn resolves once.
    model.append_record(&[(month, "2002-03".into()), (rain, "29.8 mm".into())]);
    model.set_data(0, 0, rain, "40.0 mm");
    model.append_record(&[(month, "2003-01".into()), (rain, "12.5 mm".into())]);
    handler.turn();
    tracing::info!(
        index = ?handler.row_category_index("2003"),
        "2003 discovered"
    );

    // Sum every month per year into a single column.
    handler.edit_mapping(|m| {
        m.column_transform = RoleTransform::new(r"^\d+-\d+$", "total").ok();
        m.multi_match = MultiMatch::Cumulative;
    });
    handler.turn();

    // Switch to the model's own layout: one row per record. Cell edits are now patched in place.
    match RoleTransform::new(r" mm$", "") {
        Ok(millimeters) => handler.set_mapping(Some(
            ItemModelMapping::direct("rain").with_value_transform(millimeters),
        )),
        Err(err) => tracing::error!(%err, "invalid transform"),
    }
    handler.turn();
    model.set_data(1, 0, rain, "25.0 mm");
    model.set_data(1, 0, RoleId::DISPLAY, "note");
    handler.turn();
    tracing::info!(stats = ?handler.stats(), "done");

    // Dropping the listener closes the channel and ends the render loop.
    proxy.unsubscribe(listener);
    if render.join().is_err() {
        tracing::error!("render thread panicked");
    }
}

/// Years as rows, months as columns, values parsed from `"<n> mm"`.
fn categorized_mapping() -> Result<ItemModelMapping, vizir_itemmodel::MappingError> {
    Ok(ItemModelMapping::categorized("month", "month", "rain")
        .with_row_transform(RoleTransform::new(r"^(\d+)-\d+$", r"\1")?)
        .with_column_transform(RoleTransform::new(r"^\d+-(\d+)$", r"\1")?)
        .with_value_transform(RoleTransform::new(r" mm$", "")?))
}
