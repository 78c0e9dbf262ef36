// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative mapping from source roles to array positions and values.

use hashbrown::HashMap;

use crate::RoleTransform;

/// How several source cells landing in the same output cell are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MultiMatch {
    /// Keep the first contribution.
    First,
    /// Keep the last contribution.
    #[default]
    Last,
    /// Mean of all contributions.
    Average,
    /// Sum of all contributions.
    Cumulative,
}

/// An ordered list of unique category names with constant-time index lookup.
#[derive(Clone, Debug, Default)]
pub struct CategoryList {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoryList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name` unless it is already present. Returns its index either way.
    pub fn push(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.names.len();
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), i);
        i
    }

    /// Returns the index of `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns the number of categories.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Removes all names, keeping the allocations.
    pub fn clear(&mut self) {
        self.names.clear();
        self.index.clear();
    }
}

impl PartialEq for CategoryList {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl<S: AsRef<str>> FromIterator<S> for CategoryList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for name in iter {
            list.push(name.as_ref());
        }
        list
    }
}

/// Declares how an item source is resolved into a value array.
///
/// In direct mode (`use_model_categories`) source rows and columns map 1:1 onto array rows and
/// columns, and header labels become the array's labels. Otherwise every source cell is placed
/// by the text of its row and column roles: those keys are looked up in the category lists (or
/// discovered in first-seen order when the matching `auto_*` flag is set) and cells sharing a
/// position are combined with [`multi_match`](Self::multi_match).
///
/// A categorized mapping without both a row and a column role resolves to an empty array.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemModelMapping {
    /// Map source rows and columns directly.
    pub use_model_categories: bool,
    /// Role whose text selects the output row (categorized mode).
    pub row_role: String,
    /// Role whose text selects the output column (categorized mode).
    pub column_role: String,
    /// Role holding the value; empty means the display role.
    pub value_role: String,
    /// Role holding the auxiliary value; empty means none.
    pub aux_role: String,
    /// Role holding the item label; empty means none.
    pub label_role: String,
    /// Row categories. Overwritten with the discovered list after each resolve when
    /// `auto_row_categories` is set.
    pub row_categories: CategoryList,
    /// Column categories; see `row_categories`.
    pub column_categories: CategoryList,
    /// Discover row categories from the data.
    pub auto_row_categories: bool,
    /// Discover column categories from the data.
    pub auto_column_categories: bool,
    /// Transform applied to the row role text.
    pub row_transform: Option<RoleTransform>,
    /// Transform applied to the column role text.
    pub column_transform: Option<RoleTransform>,
    /// Transform applied to the value role text before numeric conversion.
    pub value_transform: Option<RoleTransform>,
    /// Transform applied to the auxiliary role text before numeric conversion.
    pub aux_transform: Option<RoleTransform>,
    /// Transform applied to the label role text.
    pub label_transform: Option<RoleTransform>,
    /// Combination policy for cells sharing a position.
    pub multi_match: MultiMatch,
}

impl Default for ItemModelMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemModelMapping {
    /// Creates a categorized mapping with automatic categories and no roles.
    pub fn new() -> Self {
        Self {
            use_model_categories: false,
            row_role: String::new(),
            column_role: String::new(),
            value_role: String::new(),
            aux_role: String::new(),
            label_role: String::new(),
            row_categories: CategoryList::new(),
            column_categories: CategoryList::new(),
            auto_row_categories: true,
            auto_column_categories: true,
            row_transform: None,
            column_transform: None,
            value_transform: None,
            aux_transform: None,
            label_transform: None,
            multi_match: MultiMatch::default(),
        }
    }

    /// Creates a direct mapping reading `value_role`.
    pub fn direct(value_role: impl Into<String>) -> Self {
        Self {
            use_model_categories: true,
            value_role: value_role.into(),
            ..Self::new()
        }
    }

    /// Creates a categorized mapping.
    pub fn categorized(
        row_role: impl Into<String>,
        column_role: impl Into<String>,
        value_role: impl Into<String>,
    ) -> Self {
        Self {
            row_role: row_role.into(),
            column_role: column_role.into(),
            value_role: value_role.into(),
            ..Self::new()
        }
    }

    /// Sets the auxiliary role.
    pub fn with_aux_role(mut self, role: impl Into<String>) -> Self {
        self.aux_role = role.into();
        self
    }

    /// Sets the label role.
    pub fn with_label_role(mut self, role: impl Into<String>) -> Self {
        self.label_role = role.into();
        self
    }

    /// Uses fixed row categories.
    pub fn with_row_categories(mut self, categories: CategoryList) -> Self {
        self.row_categories = categories;
        self.auto_row_categories = false;
        self
    }

    /// Uses fixed column categories.
    pub fn with_column_categories(mut self, categories: CategoryList) -> Self {
        self.column_categories = categories;
        self.auto_column_categories = false;
        self
    }

    /// Sets the row key transform.
    pub fn with_row_transform(mut self, transform: RoleTransform) -> Self {
        self.row_transform = Some(transform);
        self
    }

    /// Sets the column key transform.
    pub fn with_column_transform(mut self, transform: RoleTransform) -> Self {
        self.column_transform = Some(transform);
        self
    }

    /// Sets the value transform.
    pub fn with_value_transform(mut self, transform: RoleTransform) -> Self {
        self.value_transform = Some(transform);
        self
    }

    /// Sets the auxiliary value transform.
    pub fn with_aux_transform(mut self, transform: RoleTransform) -> Self {
        self.aux_transform = Some(transform);
        self
    }

    /// Sets the label transform.
    pub fn with_label_transform(mut self, transform: RoleTransform) -> Self {
        self.label_transform = Some(transform);
        self
    }

    /// Sets the multi-match policy.
    pub fn with_multi_match(mut self, policy: MultiMatch) -> Self {
        self.multi_match = policy;
        self
    }

    /// Replaces roles and categories at once.
    ///
    /// An empty category list turns on discovery for that axis; a non-empty one turns it off.
    pub fn remap(
        &mut self,
        row_role: &str,
        column_role: &str,
        value_role: &str,
        row_categories: CategoryList,
        column_categories: CategoryList,
    ) {
        row_role.clone_into(&mut self.row_role);
        column_role.clone_into(&mut self.column_role);
        value_role.clone_into(&mut self.value_role);
        self.auto_row_categories = row_categories.is_empty();
        self.auto_column_categories = column_categories.is_empty();
        self.row_categories = row_categories;
        self.column_categories = column_categories;
    }

    /// Returns `false` for a categorized mapping missing its row or column role.
    pub fn is_valid(&self) -> bool {
        self.use_model_categories || !(self.row_role.is_empty() || self.column_role.is_empty())
    }

    /// Returns the index of a row category.
    pub fn row_category_index(&self, category: &str) -> Option<usize> {
        self.row_categories.index_of(category)
    }

    /// Returns the index of a column category.
    pub fn column_category_index(&self, category: &str) -> Option<usize> {
        self.column_categories.index_of(category)
    }
}
