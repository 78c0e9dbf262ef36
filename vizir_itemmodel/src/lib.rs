// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item-model resolution for VizIR value arrays.
//!
//! This crate keeps a [`vizir_array::ArrayProxy`] in sync with a live, mutable tabular
//! [`ItemSource`]:
//! - [`ItemModelMapping`] declares how source cells become array items, either directly (source
//!   rows and columns become array rows and columns) or by category, with a [`MultiMatch`] policy
//!   for cells that land on the same item,
//! - [`MappingResolver`] performs the full re-derivation and [`publish`] hands the result to the
//!   proxy, overwriting the existing storage when the dimensions did not change,
//! - [`FineGrainedPatcher`] rewrites single items for cell edits under a direct mapping, and
//! - [`ChangeDebouncer`] collapses bursts of source events into one resolve per event-loop turn.
//!
//! [`ItemModelHandler`] wires these together; [`TableModel`] is an in-memory source.
//!
//! Resolution is single-threaded. Only the proxy is shared with other threads.

mod cell;
mod debounce;
mod handler;
mod mapping;
mod patch;
mod publish;
mod resolver;
mod role;
mod source;
mod table_model;
mod transform;


pub use cell::{Axis, CellValue};
pub use debounce::{ChangeDebouncer, PendingResolve, ResolveTrigger};
pub use handler::{HandlerStats, ItemModelHandler};
pub use mapping::{CategoryList, ItemModelMapping, MultiMatch};
pub use patch::{FineGrainedPatcher, PatchOutcome};
pub use publish::{PublishOutcome, publish};
pub use resolver::{MappingResolver, Resolution, ResolveStatus};
pub use role::RoleId;
pub use source::{ItemSource, RoleFilter, SourceEvent, SourceSink};
pub use table_model::TableModel;
pub use transform::{MappingError, RoleTransform};
