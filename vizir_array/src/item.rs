// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single array items.

/// One cell of a [`ValueArray`](crate::ValueArray).
///
/// Every item carries a numeric `value`. The auxiliary channel (`aux`) holds a secondary number
/// such as a bar rotation or a surface position, and `label` an optional per-item text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueItem {
    /// Primary numeric value.
    pub value: f64,
    /// Secondary numeric channel (`0.0` when unused).
    pub aux: f64,
    /// Optional per-item label.
    pub label: Option<String>,
}

impl ValueItem {
    /// Creates an item with the given value, no auxiliary value and no label.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            aux: 0.0,
            label: None,
        }
    }

    /// Sets the auxiliary value.
    pub fn with_aux(mut self, aux: f64) -> Self {
        self.aux = aux;
        self
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Overwrites `self` with `other`, reusing the label allocation when possible.
    ///
    /// Returns `true` if anything changed.
    pub fn assign(&mut self, other: &Self) -> bool {
        if self == other {
            return false;
        }
        self.value = other.value;
        self.aux = other.aux;
        self.label.clone_from(&other.label);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_reports_changes_only() {
        let mut a = ValueItem::new(1.0).with_label("a");
        assert!(!a.assign(&ValueItem::new(1.0).with_label("a")), "identical");
        assert!(a.assign(&ValueItem::new(2.0).with_aux(3.0)), "differs");
        assert_eq!(a, ValueItem::new(2.0).with_aux(3.0));
    }
}
