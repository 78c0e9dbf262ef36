// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariants of item-model resolution.
//!
//! 1. Direct mode mirrors the source shape and converts every cell value.
//! 2. Discovered categories follow first appearance in row-major order, without duplicates.
//! 3. Resolving twice without mutations yields identical arrays.
//! 4. Every multi-match policy agrees with a straightforward fold over the bucket, for both the
//!    value and the auxiliary channel.
//! 5. Any burst of events inside one turn runs exactly one resolve.
//! 6. Patching a cell edit in direct mode equals a full resolve of the edited source.

use std::rc::Rc;
use std::sync::Arc;

use proptest::prelude::*;
use vizir_array::{ArrayProxy, ValueArray};
use vizir_itemmodel::{
    ItemModelHandler, ItemModelMapping, ItemSource, MappingResolver, MultiMatch, Resolution,
    RoleId, TableModel,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn table(cells: &[Vec<i32>]) -> TableModel {
    let columns = cells.first().map_or(0, Vec::len);
    let model = TableModel::new(cells.len(), columns);
    for (r, row) in cells.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            // Alternate text and numbers so both conversion paths are exercised.
            if (r + c) % 2 == 0 {
                model.set_data(r, c, RoleId::DISPLAY, v.to_string());
            } else {
                model.set_data(r, c, RoleId::DISPLAY, f64::from(*v));
            }
        }
    }
    model
}

fn records(records: &[(u8, u8, i32)]) -> TableModel {
    let model = TableModel::new(0, 1)
        .with_role("row")
        .with_role("column")
        .with_role("value");
    let [row, column, value] = ["row", "column", "value"].map(|n| model.role(n).unwrap());
    for (r, c, v) in records {
        model.append_record(&[
            (row, format!("r{r}").into()),
            (column, format!("c{c}").into()),
            (value, f64::from(*v).into()),
        ]);
    }
    model
}

fn records_with_aux(records: &[(u8, u8, i32, i32)]) -> TableModel {
    let model = TableModel::new(0, 1)
        .with_role("row")
        .with_role("column")
        .with_role("value")
        .with_role("aux");
    let [row, column, value, aux] =
        ["row", "column", "value", "aux"].map(|n| model.role(n).unwrap());
    for (r, c, v, a) in records {
        model.append_record(&[
            (row, format!("r{r}").into()),
            (column, format!("c{c}").into()),
            (value, f64::from(*v).into()),
            (aux, a.to_string().into()),
        ]);
    }
    model
}

fn fold(policy: MultiMatch, values: &[f64]) -> f64 {
    match (policy, values) {
        (_, []) => 0.0,
        (MultiMatch::First, [first, ..]) => *first,
        (MultiMatch::Last, [.., last]) => *last,
        (MultiMatch::Cumulative, vs) => vs.iter().sum(),
        (MultiMatch::Average, vs) => {
            vs.iter().sum::<f64>() / f64::from(u32::try_from(vs.len()).unwrap())
        }
    }
}

fn resolve(source: &dyn ItemSource, mapping: &ItemModelMapping) -> Resolution {
    let mut out = Resolution::new();
    MappingResolver::new().resolve(Some(source), Some(mapping), &mut out);
    out
}

fn first_seen(keys: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for k in keys {
        if !seen.contains(&k) {
            seen.push(k);
        }
    }
    seen
}

fn arb_grid() -> impl Strategy<Value = Vec<Vec<i32>>> {
    (0_usize..6, 0_usize..5).prop_flat_map(|(rows, columns)| {
        proptest::collection::vec(proptest::collection::vec(-100_i32..100, columns), rows)
    })
}

fn arb_records() -> impl Strategy<Value = Vec<(u8, u8, i32)>> {
    proptest::collection::vec((0_u8..4, 0_u8..4, -50_i32..50), 0..40)
}

fn arb_records_with_aux() -> impl Strategy<Value = Vec<(u8, u8, i32, i32)>> {
    proptest::collection::vec((0_u8..4, 0_u8..4, -50_i32..50, 0_i32..360), 0..40)
}

fn arb_policy() -> impl Strategy<Value = MultiMatch> {
    prop_oneof![
        Just(MultiMatch::First),
        Just(MultiMatch::Last),
        Just(MultiMatch::Average),
        Just(MultiMatch::Cumulative),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Direct mode
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn direct_mode_mirrors_the_source(cells in arb_grid()) {
        let model = table(&cells);
        let out = resolve(&model, &ItemModelMapping::direct(""));
        prop_assert_eq!(out.dimensions(), (model.row_count(), model.column_count()));
        for (r, row) in cells.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                prop_assert_eq!(out.item(r, c).map(|i| i.value), Some(f64::from(*v)));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Category discovery order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn categories_follow_first_appearance(recs in arb_records()) {
        let model = records(&recs);
        let out = resolve(&model, &ItemModelMapping::categorized("row", "column", "value"));
        let rows = first_seen(recs.iter().map(|(r, _, _)| format!("r{r}")));
        let columns = first_seen(recs.iter().map(|(_, c, _)| format!("c{c}")));
        prop_assert_eq!(out.row_categories().names(), rows.as_slice());
        prop_assert_eq!(out.column_categories().names(), columns.as_slice());
        prop_assert_eq!(out.dimensions(), (rows.len(), columns.len()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resolving_twice_is_idempotent(recs in arb_records(), policy in arb_policy()) {
        let model = records(&recs);
        let mapping = ItemModelMapping::categorized("row", "column", "value")
            .with_multi_match(policy);
        let mut resolver = MappingResolver::new();
        let mut a = Resolution::new();
        let mut b = Resolution::new();
        resolver.resolve(Some(&model), Some(&mapping), &mut a);
        resolver.resolve(Some(&model), Some(&mapping), &mut b);
        prop_assert_eq!(a.to_array(), b.to_array());
        prop_assert_eq!(a.row_labels(), b.row_labels());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Aggregation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn policies_match_a_fold_over_each_bucket(
        recs in arb_records_with_aux(),
        policy in arb_policy(),
    ) {
        let model = records_with_aux(&recs);
        let out = resolve(
            &model,
            &ItemModelMapping::categorized("row", "column", "value")
                .with_aux_role("aux")
                .with_multi_match(policy),
        );
        let (rows, columns) = out.dimensions();
        for r in 0..rows {
            for c in 0..columns {
                let row_key = &out.row_categories().names()[r];
                let column_key = &out.column_categories().names()[c];
                let bucket: Vec<_> = recs
                    .iter()
                    .filter(|(kr, kc, _, _)| {
                        format!("r{kr}") == *row_key && format!("c{kc}") == *column_key
                    })
                    .collect();
                let values: Vec<f64> = bucket.iter().map(|(_, _, v, _)| f64::from(*v)).collect();
                let auxes: Vec<f64> = bucket.iter().map(|(_, _, _, a)| f64::from(*a)).collect();
                let item = out.item(r, c);
                prop_assert_eq!(item.map(|i| i.value), Some(fold(policy, &values)));
                prop_assert_eq!(item.map(|i| i.aux), Some(fold(policy, &auxes)));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Debounce coalescing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn one_resolve_per_turn(inserts in 1_usize..20) {
        let model = Rc::new(table(&[vec![1, 2], vec![3, 4]]));
        let mut handler = ItemModelHandler::new(Arc::new(ArrayProxy::new()))
            .with_mapping(ItemModelMapping::direct(""));
        handler.set_source(Some(Rc::clone(&model) as Rc<dyn ItemSource>));
        handler.turn();
        let before = handler.stats().resolves;

        for i in 0..inserts {
            model.insert_rows(i % 3, 1);
        }
        prop_assert_eq!(handler.process_events(), inserts);
        prop_assert!(handler.run_pending());
        prop_assert!(!handler.run_pending());
        prop_assert_eq!(handler.stats().resolves, before + 1);
        prop_assert_eq!(handler.proxy().dimensions(), (2 + inserts, 2));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Patch equivalence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn patched_edits_equal_a_full_resolve(
        cells in arb_grid(),
        edits in proptest::collection::vec((0_usize..6, 0_usize..5, -100_i32..100), 1..10),
    ) {
        let model = Rc::new(table(&cells));
        let mapping = ItemModelMapping::direct("");
        let mut handler = ItemModelHandler::new(Arc::new(ArrayProxy::new()))
            .with_mapping(mapping.clone());
        handler.set_source(Some(Rc::clone(&model) as Rc<dyn ItemSource>));
        handler.turn();

        for (r, c, v) in edits {
            model.set_data(r, c, RoleId::DISPLAY, f64::from(v));
            prop_assert!(!handler.turn(), "direct cell edits never resolve");
        }
        let expected: ValueArray = resolve(&*model, &mapping).to_array();
        prop_assert_eq!(handler.proxy().snapshot(), expected);
    }
}
