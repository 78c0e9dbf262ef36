// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wiring of source events, coalescing, resolution and publishing.

use core::fmt;
use std::rc::Rc;
use std::sync::{Arc, mpsc};

use vizir_array::ArrayProxy;

use crate::role::ResolvedRoles;
use crate::{
    ChangeDebouncer, FineGrainedPatcher, ItemModelMapping, ItemSource, MappingResolver,
    PatchOutcome, PublishOutcome, Resolution, ResolveTrigger, SourceEvent, SourceSink, publish,
};

/// Counters describing what an [`ItemModelHandler`] has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandlerStats {
    /// Source events handled.
    pub events: u64,
    /// Full resolves run.
    pub resolves: u64,
    /// Cell changes applied by patching.
    pub patches: u64,
    /// Items written by patching.
    pub patched_items: u64,
    /// Cell changes ignored because they touched no mapped role.
    pub ignored: u64,
    /// Resolves published by overwriting the existing array.
    pub reused: u64,
    /// Resolves published by replacing the array.
    pub replaced: u64,
}

/// Keeps an [`ArrayProxy`] in sync with an [`ItemSource`] through an [`ItemModelMapping`].
///
/// The handler lives on the host's event-loop thread. Each loop turn should call
/// [`process_events`](Self::process_events) and then [`run_pending`](Self::run_pending) (or
/// just [`turn`](Self::turn)): events are classified as they are drained, cell edits under a
/// direct mapping are patched immediately, and everything else schedules a single resolve that
/// runs at the end of the turn against the then-current source and mapping.
///
/// Replacing the source or the mapping always schedules a full resolve and disables patching
/// until it has run.
pub struct ItemModelHandler {
    proxy: Arc<ArrayProxy>,
    source: Option<Rc<dyn ItemSource>>,
    mapping: Option<ItemModelMapping>,
    events: Option<mpsc::Receiver<SourceEvent>>,
    debouncer: ChangeDebouncer,
    resolver: MappingResolver,
    resolution: Resolution,
    stats: HandlerStats,
}

impl fmt::Debug for ItemModelHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemModelHandler")
            .field("proxy", &self.proxy)
            .field("has_source", &self.source.is_some())
            .field("mapping", &self.mapping)
            .field("debouncer", &self.debouncer)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl ItemModelHandler {
    /// Creates a handler publishing into `proxy`, with no source and no mapping.
    pub fn new(proxy: Arc<ArrayProxy>) -> Self {
        Self {
            proxy,
            source: None,
            mapping: None,
            events: None,
            debouncer: ChangeDebouncer::new(),
            resolver: MappingResolver::new(),
            resolution: Resolution::new(),
            stats: HandlerStats::default(),
        }
    }

    /// Sets the mapping.
    pub fn with_mapping(mut self, mapping: ItemModelMapping) -> Self {
        self.set_mapping(Some(mapping));
        self
    }

    /// Returns the proxy this handler publishes into.
    pub fn proxy(&self) -> &Arc<ArrayProxy> {
        &self.proxy
    }

    /// Returns the attached source.
    pub fn source(&self) -> Option<&Rc<dyn ItemSource>> {
        self.source.as_ref()
    }

    /// Attaches a source (or detaches with `None`) and schedules a resolve.
    ///
    /// Events still queued from the previous source are discarded, and the previous source stops
    /// reaching this handler.
    pub fn set_source(&mut self, source: Option<Rc<dyn ItemSource>>) {
        self.events = source.as_ref().map(|s| {
            let (tx, rx) = mpsc::channel();
            s.connect(SourceSink::new(tx));
            rx
        });
        self.source = source;
        self.debouncer.request(ResolveTrigger::SourceChanged);
    }

    /// Returns the mapping.
    pub fn mapping(&self) -> Option<&ItemModelMapping> {
        self.mapping.as_ref()
    }

    /// Replaces the mapping. A different mapping schedules a resolve.
    pub fn set_mapping(&mut self, mapping: Option<ItemModelMapping>) {
        if self.mapping != mapping {
            self.mapping = mapping;
            self.debouncer.request(ResolveTrigger::MappingChanged);
        }
    }

    /// Edits the mapping in place, creating a default one if none is set.
    ///
    /// A resolve is scheduled if the edit changed anything.
    pub fn edit_mapping(&mut self, edit: impl FnOnce(&mut ItemModelMapping)) {
        let mapping = self.mapping.get_or_insert_with(ItemModelMapping::new);
        let before = mapping.clone();
        edit(mapping);
        if *mapping != before {
            self.debouncer.request(ResolveTrigger::MappingChanged);
        }
    }

    /// Returns the index of a row category as of the last resolve.
    pub fn row_category_index(&self, category: &str) -> Option<usize> {
        self.mapping.as_ref()?.row_category_index(category)
    }

    /// Returns the index of a column category as of the last resolve.
    pub fn column_category_index(&self, category: &str) -> Option<usize> {
        self.mapping.as_ref()?.column_category_index(category)
    }

    /// Returns `true` if a resolve is scheduled.
    pub fn has_pending_resolve(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Returns activity counters.
    pub fn stats(&self) -> HandlerStats {
        self.stats
    }

    /// Handles one source event: patches it in place when possible, otherwise schedules a
    /// resolve.
    pub fn handle_event(&mut self, event: SourceEvent) {
        self.stats.events += 1;
        if let SourceEvent::CellsChanged {
            rows,
            columns,
            roles,
        } = &event
            && !self.debouncer.is_pending()
            && let (Some(source), Some(mapping)) = (&self.source, &self.mapping)
        {
            if mapping.use_model_categories {
                let patcher = FineGrainedPatcher::new(&**source, mapping, &*self.proxy);
                match patcher.apply(rows.clone(), columns.clone(), roles) {
                    PatchOutcome::Patched { items } => {
                        self.stats.patches += 1;
                        self.stats.patched_items += items as u64;
                        return;
                    }
                    PatchOutcome::Irrelevant => {
                        self.stats.ignored += 1;
                        return;
                    }
                    PatchOutcome::NeedsResolve => {}
                }
            } else if !ResolvedRoles::resolve(&**source, mapping).touches_categorized(roles) {
                self.stats.ignored += 1;
                return;
            }
        }
        self.debouncer.request(ResolveTrigger::of(&event));
    }

    /// Drains and handles the queued source events. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.events.as_ref().and_then(|rx| rx.try_recv().ok()) {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Runs the pending resolve, if any. Returns `true` if one ran.
    pub fn run_pending(&mut self) -> bool {
        let Some(pending) = self.debouncer.take() else {
            return false;
        };
        tracing::debug!(
            first = ?pending.first,
            last = ?pending.last,
            coalesced = pending.coalesced,
            "running coalesced resolve"
        );
        self.resolve_now();
        true
    }

    /// Processes queued events and runs the resulting resolve: one event-loop turn.
    ///
    /// Returns `true` if a resolve ran.
    pub fn turn(&mut self) -> bool {
        self.process_events();
        self.run_pending()
    }

    /// Resolves and publishes immediately, clearing any pending request.
    pub fn resolve_now(&mut self) -> PublishOutcome {
        self.debouncer.take();
        let status = self.resolver.resolve(
            self.source.as_deref(),
            self.mapping.as_ref(),
            &mut self.resolution,
        );
        if let Some(mapping) = &mut self.mapping {
            self.resolution.write_back(mapping);
        }
        let outcome = publish(&*self.proxy, &self.resolution);
        self.stats.resolves += 1;
        match outcome {
            PublishOutcome::Reused { .. } => self.stats.reused += 1,
            PublishOutcome::Replaced => self.stats.replaced += 1,
            PublishOutcome::Unchanged => {}
        }
        let (rows, columns) = self.resolution.dimensions();
        tracing::debug!(?status, rows, columns, ?outcome, "resolved");
        outcome
    }
}
