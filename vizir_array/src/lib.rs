// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense 2-D value arrays shared between a producer and concurrent readers.
//!
//! This crate provides:
//! - [`ValueArray`]: a rectangular array of [`ValueItem`]s whose dimensions are derived from its
//!   rows, and
//! - [`ArrayProxy`]: the single owner of one such array, guarding it with an exclusive lock and
//!   notifying listeners with [`ArrayChange`]s after each applied mutation.
//!
//! A render thread reads the array by holding [`ArrayProxy::lock`] for the duration of a frame.
//! Producers mutate it through the proxy's methods or through the [`ArrayWriter`] trait.

mod array;
mod change;
mod item;
mod proxy;
mod writer;

pub use array::{ArrayError, ItemsMut, ValueArray, ValueRow};
pub use change::ArrayChange;
pub use item::ValueItem;
pub use proxy::{ArrayGuard, ArrayProxy, ListenerId};
pub use writer::ArrayWriter;
