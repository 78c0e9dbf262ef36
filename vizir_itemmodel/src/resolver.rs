// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full re-derivation of a value array from an item source and a mapping.

use std::borrow::Cow;

use hashbrown::HashMap;
use vizir_array::{ValueArray, ValueItem};

use crate::cell::parse_number;
use crate::role::ResolvedRoles;
use crate::{
    Axis, CategoryList, CellValue, ItemModelMapping, ItemSource, MultiMatch, RoleId, RoleTransform,
};

/// What a resolve pass produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolveStatus {
    /// No source is attached; the result is empty.
    #[default]
    NoSource,
    /// No mapping is set; the result is empty.
    NoMapping,
    /// The mapping is categorized but lacks a row or column role; the result is empty.
    InvalidMapping,
    /// Source rows and columns were mapped directly.
    Direct,
    /// Source cells were bucketed into categories.
    Categorized,
}

impl ResolveStatus {
    /// Returns `true` if the pass read the source.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Direct | Self::Categorized)
    }
}

/// The output of a resolve pass: a row-major grid of items plus labels and categories.
///
/// A `Resolution` is meant to be reused across passes so its buffers keep their capacity.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    status: ResolveStatus,
    rows: usize,
    columns: usize,
    items: Vec<ValueItem>,
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    row_categories: CategoryList,
    column_categories: CategoryList,
}

impl Resolution {
    /// Creates an empty resolution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how the last pass went.
    pub fn status(&self) -> ResolveStatus {
        self.status
    }

    /// Returns `(rows, columns)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Returns `true` if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns one item.
    pub fn item(&self, row: usize, column: usize) -> Option<&ValueItem> {
        if column >= self.columns {
            return None;
        }
        self.items.get(row * self.columns + column)
    }

    /// Returns one row.
    pub fn row(&self, row: usize) -> Option<&[ValueItem]> {
        let start = row.checked_mul(self.columns)?;
        self.items.get(start..start + self.columns)
    }

    /// Returns the row labels.
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Returns the column labels.
    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    /// Returns the row categories used by a categorized pass.
    pub fn row_categories(&self) -> &CategoryList {
        &self.row_categories
    }

    /// Returns the column categories used by a categorized pass.
    pub fn column_categories(&self) -> &CategoryList {
        &self.column_categories
    }

    /// Copies the result into a fresh array.
    pub fn to_array(&self) -> ValueArray {
        ValueArray::from_fn(self.rows, self.columns, |r, c| {
            self.item(r, c).cloned().unwrap_or_default()
        })
    }

    /// Stores the categories discovered by a categorized pass into `mapping`.
    ///
    /// Only axes with automatic discovery are written. Returns `true` if `mapping` changed.
    pub fn write_back(&self, mapping: &mut ItemModelMapping) -> bool {
        if self.status != ResolveStatus::Categorized {
            return false;
        }
        let mut changed = false;
        if mapping.auto_row_categories && mapping.row_categories != self.row_categories {
            mapping.row_categories.clone_from(&self.row_categories);
            changed = true;
        }
        if mapping.auto_column_categories && mapping.column_categories != self.column_categories {
            mapping.column_categories.clone_from(&self.column_categories);
            changed = true;
        }
        changed
    }

    fn clear(&mut self, status: ResolveStatus) {
        self.status = status;
        self.rows = 0;
        self.columns = 0;
        self.items.clear();
        self.row_labels.clear();
        self.column_labels.clear();
        self.row_categories.clear();
        self.column_categories.clear();
    }
}

/// Reads mapped items out of source cells.
///
/// Shared by the resolver and the fine-grained patcher so both produce identical items.
pub(crate) struct CellReader<'a> {
    source: &'a dyn ItemSource,
    mapping: &'a ItemModelMapping,
    pub(crate) roles: ResolvedRoles,
}

impl<'a> CellReader<'a> {
    pub(crate) fn new(source: &'a dyn ItemSource, mapping: &'a ItemModelMapping) -> Self {
        Self {
            source,
            mapping,
            roles: ResolvedRoles::resolve(source, mapping),
        }
    }

    /// Builds the item for source cell `(row, column)`.
    pub(crate) fn item(&self, row: usize, column: usize) -> ValueItem {
        let m = self.mapping;
        let value = self.number(row, column, self.roles.value, m.value_transform.as_ref());
        let aux = self.roles.aux.map_or(0.0, |role| {
            self.number(row, column, role, m.aux_transform.as_ref())
        });
        let label = self.roles.label.and_then(|role| {
            let raw = self.source.data(row, column, role);
            (!raw.is_empty()).then(|| transformed(&raw, m.label_transform.as_ref()).into_owned())
        });
        ValueItem { value, aux, label }
    }

    /// Returns the transformed text of a key role.
    pub(crate) fn key(
        &self,
        row: usize,
        column: usize,
        role: RoleId,
        transform: Option<&RoleTransform>,
    ) -> String {
        transformed(&self.source.data(row, column, role), transform).into_owned()
    }

    fn number(
        &self,
        row: usize,
        column: usize,
        role: RoleId,
        transform: Option<&RoleTransform>,
    ) -> f64 {
        let raw = self.source.data(row, column, role);
        match transform {
            None => raw.to_number(),
            Some(t) => parse_number(&t.apply(&raw.to_text())),
        }
    }
}

fn transformed<'v>(value: &'v CellValue, transform: Option<&RoleTransform>) -> Cow<'v, str> {
    let text = value.to_text();
    match transform {
        None => text,
        Some(t) => Cow::Owned(t.apply(&text).into_owned()),
    }
}

/// Accumulator for all source cells sharing one output position.
#[derive(Debug, Default)]
struct Bucket {
    value: f64,
    aux: f64,
    label: Option<String>,
    count: u32,
}

impl Bucket {
    fn add(&mut self, policy: MultiMatch, item: ValueItem) {
        match policy {
            MultiMatch::First if self.count > 0 => {}
            MultiMatch::First | MultiMatch::Last => {
                self.value = item.value;
                self.aux = item.aux;
                self.label = item.label;
            }
            MultiMatch::Average | MultiMatch::Cumulative => {
                self.value += item.value;
                self.aux += item.aux;
                if item.label.is_some() {
                    self.label = item.label;
                }
            }
        }
        self.count = self.count.saturating_add(1);
    }

    fn finish(self, policy: MultiMatch) -> ValueItem {
        let n = match policy {
            MultiMatch::Average => f64::from(self.count.max(1)),
            _ => 1.0,
        };
        ValueItem {
            value: self.value / n,
            aux: self.aux / n,
            label: self.label,
        }
    }
}

/// Derives a dense array from the current state of an item source.
///
/// Holds scratch storage reused between passes.
#[derive(Debug, Default)]
pub struct MappingResolver {
    buckets: HashMap<(usize, usize), Bucket>,
}

impl MappingResolver {
    /// Creates a resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `source` through `mapping` into `out`, replacing its previous content.
    ///
    /// A missing source, a missing mapping or an invalid mapping yields an empty result.
    pub fn resolve(
        &mut self,
        source: Option<&dyn ItemSource>,
        mapping: Option<&ItemModelMapping>,
        out: &mut Resolution,
    ) -> ResolveStatus {
        let status = match (source, mapping) {
            (None, _) => ResolveStatus::NoSource,
            (_, None) => ResolveStatus::NoMapping,
            (_, Some(m)) if !m.is_valid() => ResolveStatus::InvalidMapping,
            (_, Some(m)) if m.use_model_categories => ResolveStatus::Direct,
            _ => ResolveStatus::Categorized,
        };
        out.clear(status);
        match (source, mapping, status) {
            (Some(source), Some(mapping), ResolveStatus::Direct) => {
                resolve_direct(source, mapping, out);
            }
            (Some(source), Some(mapping), ResolveStatus::Categorized) => {
                self.resolve_categorized(source, mapping, out);
            }
            _ => tracing::debug!(?status, "resolving to an empty array"),
        }
        status
    }

    fn resolve_categorized(
        &mut self,
        source: &dyn ItemSource,
        mapping: &ItemModelMapping,
        out: &mut Resolution,
    ) {
        let reader = CellReader::new(source, mapping);
        let roles = reader.roles;
        if !mapping.auto_row_categories {
            out.row_categories.clone_from(&mapping.row_categories);
        }
        if !mapping.auto_column_categories {
            out.column_categories.clone_from(&mapping.column_categories);
        }

        self.buckets.clear();
        for row in 0..source.row_count() {
            for column in 0..source.column_count() {
                let row_key = reader.key(row, column, roles.row, mapping.row_transform.as_ref());
                let column_key =
                    reader.key(row, column, roles.column, mapping.column_transform.as_ref());
                let r = if mapping.auto_row_categories {
                    Some(out.row_categories.push(&row_key))
                } else {
                    out.row_categories.index_of(&row_key)
                };
                let c = if mapping.auto_column_categories {
                    Some(out.column_categories.push(&column_key))
                } else {
                    out.column_categories.index_of(&column_key)
                };
                let (Some(r), Some(c)) = (r, c) else {
                    continue;
                };
                self.buckets
                    .entry((r, c))
                    .or_default()
                    .add(mapping.multi_match, reader.item(row, column));
            }
        }

        out.rows = out.row_categories.len();
        out.columns = out.column_categories.len();
        out.items
            .resize(out.rows * out.columns, ValueItem::default());
        for ((r, c), bucket) in self.buckets.drain() {
            out.items[r * out.columns + c] = bucket.finish(mapping.multi_match);
        }
        out.row_labels.extend_from_slice(out.row_categories.names());
        out.column_labels
            .extend_from_slice(out.column_categories.names());
    }
}

fn resolve_direct(source: &dyn ItemSource, mapping: &ItemModelMapping, out: &mut Resolution) {
    let reader = CellReader::new(source, mapping);
    out.rows = source.row_count();
    out.columns = source.column_count();
    out.items.reserve(out.rows * out.columns);
    for row in 0..out.rows {
        for column in 0..out.columns {
            out.items.push(reader.item(row, column));
        }
    }
    out.row_labels.extend(
        (0..out.rows).map(|i| source.header_data(Axis::Vertical, i).unwrap_or_default()),
    );
    out.column_labels.extend(
        (0..out.columns).map(|i| source.header_data(Axis::Horizontal, i).unwrap_or_default()),
    );
}
