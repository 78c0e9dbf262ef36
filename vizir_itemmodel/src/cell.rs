// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell values read from an item source.

use std::borrow::Cow;

/// A value stored under one role of one source cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    /// No value.
    #[default]
    Empty,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// Text.
    Text(String),
}

impl CellValue {
    /// Returns `true` for [`CellValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the string form of the value.
    ///
    /// Numbers use their shortest round-trip representation (`5` rather than `5.0`).
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Self::Number(n) => Cow::Owned(format!("{n}")),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Converts the value to a number.
    ///
    /// Text is trimmed and parsed; anything that does not parse converts to `0.0`.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Empty => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::Text(s) => parse_number(s),
        }
    }
}

/// Parses trimmed text as a number, converting failures to `0.0`.
pub(crate) fn parse_number(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Header orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Column headers.
    Horizontal,
    /// Row headers.
    Vertical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_convert_without_failing() {
        assert_eq!(CellValue::from(" 4.5 ").to_number(), 4.5);
        assert_eq!(CellValue::from("n/a").to_number(), 0.0);
        assert_eq!(CellValue::Empty.to_number(), 0.0);
        assert_eq!(CellValue::Bool(true).to_number(), 1.0);
    }

    #[test]
    fn text_form_of_numbers_is_compact() {
        assert_eq!(CellValue::from(5.0).to_text(), "5");
        assert_eq!(CellValue::from(3.25).to_text(), "3.25");
        assert_eq!(CellValue::Empty.to_text(), "");
    }
}
