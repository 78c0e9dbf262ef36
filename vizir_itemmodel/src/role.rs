// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Role identifiers and their per-pass resolution.

use crate::{ItemModelMapping, ItemSource};

/// Identifies a named role (a logical data channel) of an [`ItemSource`].
///
/// Sources translate role names into ids once through [`ItemSource::role_id`]; the per-cell loops
/// only deal in ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleId(pub u32);

impl RoleId {
    /// The generic display role, used when no role name (or an unknown one) is mapped.
    pub const DISPLAY: Self = Self(0);
}

/// Role ids of one mapping against one source, resolved once per pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ResolvedRoles {
    pub(crate) row: RoleId,
    pub(crate) column: RoleId,
    pub(crate) value: RoleId,
    pub(crate) aux: Option<RoleId>,
    pub(crate) label: Option<RoleId>,
}

impl ResolvedRoles {
    /// Row, column and value roles fall back to [`RoleId::DISPLAY`]. The optional channels are
    /// absent when their name is empty or unknown to the source.
    pub(crate) fn resolve(source: &dyn ItemSource, mapping: &ItemModelMapping) -> Self {
        let required = |name: &str| {
            if name.is_empty() {
                RoleId::DISPLAY
            } else {
                source.role_id(name).unwrap_or(RoleId::DISPLAY)
            }
        };
        let optional = |name: &str| {
            if name.is_empty() {
                None
            } else {
                source.role_id(name)
            }
        };
        Self {
            row: required(&mapping.row_role),
            column: required(&mapping.column_role),
            value: required(&mapping.value_role),
            aux: optional(&mapping.aux_role),
            label: optional(&mapping.label_role),
        }
    }

    /// Returns `true` if a change limited to `roles` can affect the values read in direct mode.
    ///
    /// An empty filter means every role may have changed.
    pub(crate) fn touches_direct(&self, roles: &[RoleId]) -> bool {
        roles.is_empty()
            || roles.iter().any(|r| {
                *r == self.value || Some(*r) == self.aux || Some(*r) == self.label
            })
    }

    /// Returns `true` if a change limited to `roles` can affect a categorized resolve.
    pub(crate) fn touches_categorized(&self, roles: &[RoleId]) -> bool {
        self.touches_direct(roles) || roles.iter().any(|r| *r == self.row || *r == self.column)
    }
}
