// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The context table that turns markers into periodic statistics.

use crate::context::{ContextId, StatContext};
use cadence_core::config::DEFAULT_STATISTICS_FREQUENCY_SECS;
use cadence_core::telemetry::{
    ContextSummary, Marker, MarkerFilter, MarkerKind, StatisticsMask, StatisticsSink,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Name of the built-in context timing the computation stage.
pub const UPDATE_CONTEXT_NAME: &str = "Update";
/// Name of the built-in context timing the render stage.
pub const RENDER_CONTEXT_NAME: &str = "Render";
/// Name of the built-in context timing event processing.
pub const EVENT_CONTEXT_NAME: &str = "Event";

#[derive(Debug)]
struct ContextTable {
    contexts: Vec<StatContext>,
    next_id: ContextId,
    statistics_mask: StatisticsMask,
    frequency_secs: u32,
    update_id: ContextId,
    render_id: ContextId,
    event_id: ContextId,
}

impl ContextTable {
    fn insert(&mut self, name: &str, filter: MarkerFilter, interval_secs: u32, enabled: bool) -> ContextId {
        let id = self.next_id;
        self.next_id += 1;
        self.contexts
            .push(StatContext::new(id, name, filter, interval_secs, enabled));
        id
    }

    fn get(&self, id: ContextId) -> Option<&StatContext> {
        self.contexts.iter().find(|c| c.id() == id)
    }

    fn get_mut(&mut self, id: ContextId) -> Option<&mut StatContext> {
        self.contexts.iter_mut().find(|c| c.id() == id)
    }

    fn is_builtin(&self, id: ContextId) -> bool {
        id == self.update_id || id == self.render_id || id == self.event_id
    }

    /// Whether the statistics mask enables logging for `id`.
    fn mask_enables(&self, id: ContextId) -> bool {
        let mask = self.statistics_mask;
        if id == self.update_id || id == self.render_id {
            mask.contains(StatisticsMask::UPDATE_RENDER)
        } else if id == self.event_id {
            mask.contains(StatisticsMask::EVENT_PROCESS)
        } else {
            mask.contains(StatisticsMask::CUSTOM_MARKERS)
        }
    }
}

/// Owns every statistics context and routes markers into them.
///
/// Markers may arrive from any thread. The table is guarded by a single lock
/// that is only held while updating in-memory statistics; summaries are
/// handed to the [`StatisticsSink`] after the lock is released.
pub struct MarkerAggregator {
    table: Mutex<ContextTable>,
    sink: Arc<dyn StatisticsSink>,
}

impl MarkerAggregator {
    /// Creates an aggregator with the built-in `Update`, `Render` and `Event`
    /// contexts, logging as selected by `statistics_mask`.
    pub fn new(
        sink: Arc<dyn StatisticsSink>,
        statistics_mask: StatisticsMask,
        frequency_secs: u32,
    ) -> Self {
        let frequency_secs = effective_frequency(frequency_secs);
        let mut table = ContextTable {
            contexts: Vec::new(),
            next_id: 0,
            statistics_mask,
            frequency_secs,
            update_id: 0,
            render_id: 0,
            event_id: 0,
        };
        let update_render = statistics_mask.contains(StatisticsMask::UPDATE_RENDER);
        table.update_id = table.insert(
            UPDATE_CONTEXT_NAME,
            MarkerFilter::COMPUTE,
            frequency_secs,
            update_render,
        );
        table.render_id = table.insert(
            RENDER_CONTEXT_NAME,
            MarkerFilter::RENDER,
            frequency_secs,
            update_render,
        );
        table.event_id = table.insert(
            EVENT_CONTEXT_NAME,
            MarkerFilter::EVENT_PROCESS,
            frequency_secs,
            statistics_mask.contains(StatisticsMask::EVENT_PROCESS),
        );

        Self {
            table: Mutex::new(table),
            sink,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ContextTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identifiers of the built-in contexts as `(update, render, event)`.
    pub fn builtin_ids(&self) -> (ContextId, ContextId, ContextId) {
        let table = self.lock();
        (table.update_id, table.render_id, table.event_id)
    }

    /// Adds a context. Duplicate names are allowed.
    ///
    /// Logging is enabled when the statistics mask selects custom markers.
    pub fn add_context(&self, name: &str, filter: MarkerFilter, log_interval_secs: u32) -> ContextId {
        let mut table = self.lock();
        let enabled = table
            .statistics_mask
            .contains(StatisticsMask::CUSTOM_MARKERS);
        let id = table.insert(name, filter, log_interval_secs, enabled);
        log::debug!("Added statistics context '{name}' with id {id}");
        id
    }

    /// Removes a context. Unknown ids are ignored.
    pub fn remove_context(&self, id: ContextId) {
        let mut table = self.lock();
        table.contexts.retain(|c| c.id() != id);
    }

    /// Routes a marker into every matching context.
    ///
    /// Start/end kinds open or close intervals; a tick advances every
    /// context's flush clock. Custom kinds need a target context and go
    /// through [`record_custom_marker`](Self::record_custom_marker) instead.
    pub fn record_marker(&self, marker: &Marker) {
        let summaries = {
            let mut table = self.lock();
            match marker.kind {
                MarkerKind::TickEvent => table
                    .contexts
                    .iter_mut()
                    .filter_map(|c| c.on_tick(marker))
                    .collect(),
                MarkerKind::CustomStart | MarkerKind::CustomEnd => Vec::new(),
                kind => {
                    for context in table.contexts.iter_mut().filter(|c| c.accepts(kind)) {
                        context.process_marker(marker);
                    }
                    Vec::new()
                }
            }
        };
        self.emit(summaries);
    }

    /// Routes a start/end marker into one context only.
    pub fn record_custom_marker(&self, marker: &Marker, id: ContextId) {
        let mut table = self.lock();
        if let Some(context) = table.get_mut(id) {
            context.process_marker(marker);
        }
    }

    /// Replaces the statistics mask and flush frequency for every context.
    ///
    /// A frequency of zero selects the default of two seconds.
    pub fn set_logging_level(&self, statistics_mask: StatisticsMask, frequency_secs: u32) {
        let frequency_secs = effective_frequency(frequency_secs);
        let mut table = self.lock();
        table.statistics_mask = statistics_mask;
        table.frequency_secs = frequency_secs;
        let enabled: Vec<bool> = table
            .contexts
            .iter()
            .map(|c| table.mask_enables(c.id()))
            .collect();
        for (context, enabled) in table.contexts.iter_mut().zip(enabled) {
            context.set_log_interval_secs(frequency_secs);
            context.set_logging_enabled(enabled);
        }
    }

    /// Changes the flush frequency of one context. Zero selects the default.
    pub fn set_logging_frequency(&self, frequency_secs: u32, id: ContextId) {
        let mut table = self.lock();
        if let Some(context) = table.get_mut(id) {
            context.set_log_interval_secs(effective_frequency(frequency_secs));
        }
    }

    /// Enables or disables summary emission for one context.
    pub fn enable_logging(&self, enabled: bool, id: ContextId) {
        let mut table = self.lock();
        if let Some(context) = table.get_mut(id) {
            context.set_logging_enabled(enabled);
        }
    }

    /// Name of a context.
    pub fn context_name(&self, id: ContextId) -> Option<String> {
        self.lock().get(id).map(|c| c.name().to_string())
    }

    /// Description of a marker within a context, e.g. `"Physics_START"`.
    pub fn marker_description(&self, kind: MarkerKind, id: ContextId) -> Option<String> {
        self.lock().get(id).map(|c| c.marker_description(kind))
    }

    /// Current statistics of a context without flushing it.
    pub fn snapshot(&self, id: ContextId) -> Option<ContextSummary> {
        self.lock().get(id).map(StatContext::summary)
    }

    /// Identifiers of every live context, in creation order.
    pub fn context_ids(&self) -> Vec<ContextId> {
        self.lock().contexts.iter().map(StatContext::id).collect()
    }

    /// `true` when `id` names one of the built-in contexts.
    pub fn is_builtin(&self, id: ContextId) -> bool {
        self.lock().is_builtin(id)
    }

    /// Current flush frequency applied by [`set_logging_level`](Self::set_logging_level).
    pub fn frequency_secs(&self) -> u32 {
        self.lock().frequency_secs
    }

    fn emit(&self, summaries: Vec<ContextSummary>) {
        for summary in &summaries {
            self.sink.log_statistics(summary);
        }
    }
}

fn effective_frequency(frequency_secs: u32) -> u32 {
    if frequency_secs == 0 {
        DEFAULT_STATISTICS_FREQUENCY_SECS
    } else {
        frequency_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::telemetry::FrameTimestamp;

    #[derive(Default)]
    struct CollectingSink(Mutex<Vec<ContextSummary>>);

    impl StatisticsSink for CollectingSink {
        fn log_statistics(&self, summary: &ContextSummary) {
            self.0.lock().unwrap().push(summary.clone());
        }
    }

    fn marker(kind: MarkerKind, micros: u64) -> Marker {
        Marker::at(kind, FrameTimestamp::from_micros(micros))
    }

    fn aggregator(mask: StatisticsMask) -> (MarkerAggregator, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::default());
        (MarkerAggregator::new(sink.clone(), mask, 1), sink)
    }

    #[test]
    fn test_builtin_contexts_exist() {
        let (agg, _) = aggregator(StatisticsMask::EMPTY);
        let (update, render, event) = agg.builtin_ids();
        assert_eq!(agg.context_name(update).as_deref(), Some("Update"));
        assert_eq!(agg.context_name(render).as_deref(), Some("Render"));
        assert_eq!(agg.context_name(event).as_deref(), Some("Event"));
        assert!(agg.is_builtin(render));
    }

    #[test]
    fn test_render_markers_reach_render_context_only() {
        let (agg, _) = aggregator(StatisticsMask::ALL);
        let (update, render, _) = agg.builtin_ids();
        agg.record_marker(&marker(MarkerKind::RenderStart, 0));
        agg.record_marker(&marker(MarkerKind::RenderEnd, 3_000));
        assert_eq!(agg.snapshot(render).unwrap().samples, 1);
        assert_eq!(agg.snapshot(update).unwrap().samples, 0);
    }

    #[test]
    fn test_tick_flushes_enabled_contexts_only() {
        let (agg, sink) = aggregator(StatisticsMask::UPDATE_RENDER);
        agg.record_marker(&marker(MarkerKind::TickEvent, 0));
        agg.record_marker(&marker(MarkerKind::EventProcessStart, 10));
        agg.record_marker(&marker(MarkerKind::EventProcessEnd, 20));
        agg.record_marker(&marker(MarkerKind::ComputeStart, 100));
        agg.record_marker(&marker(MarkerKind::ComputeEnd, 1_100));
        agg.record_marker(&marker(MarkerKind::TickEvent, 1_000_000));

        let logged = sink.0.lock().unwrap();
        let names: Vec<_> = logged.iter().map(|s| s.context.as_str()).collect();
        assert_eq!(names, vec!["Update", "Render"]);
        assert_eq!(logged[0].samples, 1);

        let (_, _, event) = agg.builtin_ids();
        assert_eq!(
            agg.snapshot(event).unwrap().samples,
            0,
            "Disabled contexts still reset at the flush"
        );
    }

    #[test]
    fn test_custom_context_lifecycle() {
        let (agg, _) = aggregator(StatisticsMask::CUSTOM_MARKERS);
        let id = agg.add_context("Physics", MarkerFilter::CUSTOM_EVENTS, 1);
        let other = agg.add_context("Physics", MarkerFilter::CUSTOM_EVENTS, 1);
        assert_ne!(id, other, "Duplicate names get distinct ids");

        agg.record_custom_marker(&marker(MarkerKind::CustomStart, 0), id);
        agg.record_custom_marker(&marker(MarkerKind::CustomEnd, 500), id);
        agg.record_marker(&marker(MarkerKind::CustomStart, 600));
        assert_eq!(agg.snapshot(id).unwrap().samples, 1);
        assert_eq!(agg.snapshot(other).unwrap().samples, 0);

        assert_eq!(
            agg.marker_description(MarkerKind::CustomEnd, id).as_deref(),
            Some("Physics_END")
        );

        agg.remove_context(id);
        assert!(agg.snapshot(id).is_none());
        agg.record_custom_marker(&marker(MarkerKind::CustomEnd, 700), id);
        agg.remove_context(id);
    }

    #[test]
    fn test_set_logging_level_applies_mask_and_default_frequency() {
        let (agg, sink) = aggregator(StatisticsMask::EMPTY);
        let custom = agg.add_context("Loader", MarkerFilter::CUSTOM_EVENTS, 5);
        agg.set_logging_level(StatisticsMask::CUSTOM_MARKERS, 0);
        assert_eq!(agg.frequency_secs(), 2);

        agg.record_marker(&marker(MarkerKind::TickEvent, 0));
        agg.record_custom_marker(&marker(MarkerKind::CustomStart, 0), custom);
        agg.record_custom_marker(&marker(MarkerKind::CustomEnd, 10), custom);
        agg.record_marker(&marker(MarkerKind::TickEvent, 2_000_000));

        let logged = sink.0.lock().unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].context, "Loader");
    }

    #[test]
    fn test_enable_logging_and_frequency_per_context() {
        let (agg, sink) = aggregator(StatisticsMask::EMPTY);
        let (_, render, _) = agg.builtin_ids();
        agg.enable_logging(true, render);
        agg.set_logging_frequency(3, render);

        agg.record_marker(&marker(MarkerKind::TickEvent, 0));
        agg.record_marker(&marker(MarkerKind::TickEvent, 2_000_000));
        assert!(sink.0.lock().unwrap().is_empty());
        agg.record_marker(&marker(MarkerKind::TickEvent, 3_000_000));
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_markers_and_context_churn() {
        let (agg, _) = aggregator(StatisticsMask::EMPTY);
        let agg = Arc::new(agg);
        let (_, render, _) = agg.builtin_ids();
        let custom: Vec<_> = (0..3)
            .map(|i| agg.add_context(&format!("Worker{i}"), MarkerFilter::CUSTOM_EVENTS, 1))
            .collect();

        let mut handles: Vec<_> = custom
            .iter()
            .map(|&id| {
                let agg = Arc::clone(&agg);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        agg.record_custom_marker(&marker(MarkerKind::CustomStart, i * 10), id);
                        agg.record_custom_marker(&marker(MarkerKind::CustomEnd, i * 10 + 5), id);
                    }
                })
            })
            .collect();
        handles.push({
            let agg = Arc::clone(&agg);
            std::thread::spawn(move || {
                for i in 0..100 {
                    agg.record_marker(&marker(MarkerKind::RenderStart, i * 10));
                    agg.record_marker(&marker(MarkerKind::RenderEnd, i * 10 + 2));
                }
            })
        });
        handles.push({
            let agg = Arc::clone(&agg);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let id = agg.add_context("Transient", MarkerFilter::CUSTOM_EVENTS, 1);
                    agg.record_custom_marker(&marker(MarkerKind::CustomStart, 0), id);
                    agg.remove_context(id);
                }
            })
        });
        for handle in handles {
            handle.join().unwrap();
        }

        for id in custom {
            let stats = agg.snapshot(id).unwrap();
            assert_eq!(stats.samples, 100);
        }
        assert_eq!(agg.snapshot(render).unwrap().samples, 100);
        assert_eq!(agg.context_ids().len(), 6, "Transient contexts are all gone");
    }
}
