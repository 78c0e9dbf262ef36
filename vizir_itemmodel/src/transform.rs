// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Regular-expression text transforms applied to role values.

use std::borrow::Cow;

use regex::Regex;

/// Errors returned when configuring an [`ItemModelMapping`](crate::ItemModelMapping).
#[derive(Debug, Clone, thiserror::Error)]
pub enum MappingError {
    /// A transform pattern is not a valid regular expression.
    #[error("invalid pattern `{pattern}`")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// The parser's diagnosis.
        #[source]
        source: regex::Error,
    },
}

/// Rewrites a role's text form with a regular expression before it is used.
///
/// Every match of `pattern` is replaced by `replacement`, in which `\1`, `\2`, ... refer to
/// capture groups. An empty pattern leaves text unchanged.
#[derive(Clone, Debug)]
pub struct RoleTransform {
    regex: Regex,
    replacement: String,
    expanded: String,
}

impl RoleTransform {
    /// Compiles a transform.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, MappingError> {
        let regex = Regex::new(pattern).map_err(|source| MappingError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        let replacement = replacement.into();
        let expanded = expand_backrefs(&replacement);
        Ok(Self {
            regex,
            replacement,
            expanded,
        })
    }

    /// Returns the pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the replacement as configured.
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Applies the transform.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.regex.as_str().is_empty() {
            return Cow::Borrowed(text);
        }
        self.regex.replace_all(text, self.expanded.as_str())
    }
}

impl PartialEq for RoleTransform {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern() && self.replacement == other.replacement
    }
}

/// Rewrites `\N` group references as `${N}` and escapes literal `$`.
fn expand_backrefs(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek().is_some_and(char::is_ascii_digit) => {
                out.push_str("${");
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    out.push(d);
                }
                out.push('}');
            }
            '$' => out.push_str("$$"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backslash_references_select_groups() {
        let t = RoleTransform::new(r"^(\d+)-(\d+)$", r"\2").unwrap();
        assert_eq!(t.apply("2006-01"), "01");
        assert_eq!(t.apply("no match"), "no match");

        let swap = RoleTransform::new(r"(\w+) (\w+)", r"\2 \1 $").unwrap();
        assert_eq!(swap.apply("hello world"), "world hello $");
    }

    #[test]
    fn empty_pattern_is_identity() {
        let t = RoleTransform::new("", "x").unwrap();
        assert_eq!(t.apply("abc"), "abc");
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = RoleTransform::new("(", "").unwrap_err();
        assert!(
            matches!(err, MappingError::InvalidPattern { ref pattern, .. } if pattern == "("),
            "unexpected error {err:?}"
        );
    }
}
