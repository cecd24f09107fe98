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

//! A named statistics context.

use crate::stats::FrameTimeStats;
use cadence_core::telemetry::{ContextSummary, FrameTimestamp, Marker, MarkerFilter, MarkerKind};

/// Identifier of a statistics context.
pub type ContextId = u32;

const MICROSECONDS_PER_SECOND: u64 = 1_000_000;

/// Accumulates interval statistics for the marker families it filters on and
/// flushes a summary every log interval.
#[derive(Debug, Clone)]
pub struct StatContext {
    id: ContextId,
    name: String,
    filter: MarkerFilter,
    log_interval_us: u64,
    stats: FrameTimeStats,
    logging_enabled: bool,
    reference_tick: Option<FrameTimestamp>,
}

impl StatContext {
    /// Creates a context. A `log_interval_secs` of zero never flushes.
    pub fn new(
        id: ContextId,
        name: impl Into<String>,
        filter: MarkerFilter,
        log_interval_secs: u32,
        logging_enabled: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            filter,
            log_interval_us: u64::from(log_interval_secs) * MICROSECONDS_PER_SECOND,
            stats: FrameTimeStats::new(),
            logging_enabled,
            reference_tick: None,
        }
    }

    /// Context identifier.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Context name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Marker families this context consumes.
    pub fn filter(&self) -> MarkerFilter {
        self.filter
    }

    /// Whether summaries are emitted at each flush.
    pub fn logging_enabled(&self) -> bool {
        self.logging_enabled
    }

    /// Enables or disables summary emission. Statistics keep accumulating.
    pub fn set_logging_enabled(&mut self, enabled: bool) {
        self.logging_enabled = enabled;
    }

    /// Changes the log interval.
    pub fn set_log_interval_secs(&mut self, secs: u32) {
        self.log_interval_us = u64::from(secs) * MICROSECONDS_PER_SECOND;
    }

    /// Log interval in microseconds.
    pub fn log_interval_us(&self) -> u64 {
        self.log_interval_us
    }

    /// `true` if this context consumes markers of `kind`.
    pub fn accepts(&self, kind: MarkerKind) -> bool {
        self.filter.intersects(kind.filter())
    }

    /// Opens or closes an interval. Kinds that are neither start nor end are
    /// ignored.
    pub fn process_marker(&mut self, marker: &Marker) {
        if marker.kind.is_start() {
            self.stats.start_time(marker.timestamp);
        } else if marker.kind.is_end() {
            self.stats.end_time(marker.timestamp);
        }
    }

    /// Advances the flush clock with a tick.
    ///
    /// Returns the summary to log when the interval elapsed and logging is
    /// enabled. Statistics are reset at every flush either way.
    pub fn on_tick(&mut self, tick: &Marker) -> Option<ContextSummary> {
        if self.log_interval_us == 0 {
            return None;
        }
        let Some(reference) = self.reference_tick else {
            self.reference_tick = Some(tick.timestamp);
            return None;
        };
        if tick.timestamp.micros_since(reference) < self.log_interval_us {
            return None;
        }

        let summary = self.logging_enabled.then(|| self.summary());
        self.stats.reset();
        self.reference_tick = None;
        summary
    }

    /// Current statistics without flushing.
    pub fn summary(&self) -> ContextSummary {
        self.stats.summary(&self.name)
    }

    /// Description of a marker as seen by this context.
    pub fn marker_description(&self, kind: MarkerKind) -> String {
        if kind.is_start() {
            format!("{}_START", self.name)
        } else if kind.is_end() {
            format!("{}_END", self.name)
        } else {
            kind.name().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(kind: MarkerKind, micros: u64) -> Marker {
        Marker::at(kind, FrameTimestamp::from_micros(micros))
    }

    #[test]
    fn test_first_tick_only_seeds_reference() {
        let mut ctx = StatContext::new(1, "Render", MarkerFilter::RENDER, 1, true);
        ctx.process_marker(&marker(MarkerKind::RenderStart, 0));
        ctx.process_marker(&marker(MarkerKind::RenderEnd, 4_000));
        assert!(ctx.on_tick(&marker(MarkerKind::TickEvent, 5_000_000)).is_none());
        assert_eq!(ctx.summary().samples, 1, "Seeding must not reset");
    }

    #[test]
    fn test_flush_after_interval_resets() {
        let mut ctx = StatContext::new(1, "Render", MarkerFilter::RENDER, 1, true);
        ctx.on_tick(&marker(MarkerKind::TickEvent, 0));
        ctx.process_marker(&marker(MarkerKind::RenderStart, 100));
        ctx.process_marker(&marker(MarkerKind::RenderEnd, 2_100));

        assert!(ctx.on_tick(&marker(MarkerKind::TickEvent, 999_999)).is_none());
        let summary = ctx
            .on_tick(&marker(MarkerKind::TickEvent, 1_000_000))
            .expect("interval elapsed");
        assert_eq!(summary.context, "Render");
        assert_eq!(summary.samples, 1);
        assert_eq!(summary.max_ms, 2.0);
        assert_eq!(ctx.summary().samples, 0, "Flush must reset the accumulator");

        // The next tick seeds a new reference.
        assert!(ctx.on_tick(&marker(MarkerKind::TickEvent, 3_000_000)).is_none());
    }

    #[test]
    fn test_disabled_context_resets_silently() {
        let mut ctx = StatContext::new(2, "Update", MarkerFilter::COMPUTE, 1, false);
        ctx.on_tick(&marker(MarkerKind::TickEvent, 0));
        ctx.process_marker(&marker(MarkerKind::ComputeStart, 10));
        ctx.process_marker(&marker(MarkerKind::ComputeEnd, 20));
        assert!(ctx.on_tick(&marker(MarkerKind::TickEvent, 2_000_000)).is_none());
        assert_eq!(ctx.summary().samples, 0);
    }

    #[test]
    fn test_zero_interval_never_flushes() {
        let mut ctx = StatContext::new(3, "Never", MarkerFilter::RENDER, 0, true);
        for t in 0..5 {
            assert!(ctx
                .on_tick(&marker(MarkerKind::TickEvent, t * 10_000_000))
                .is_none());
        }
    }

    #[test]
    fn test_marker_description() {
        let ctx = StatContext::new(4, "Physics", MarkerFilter::CUSTOM_EVENTS, 2, true);
        assert_eq!(ctx.marker_description(MarkerKind::CustomStart), "Physics_START");
        assert_eq!(ctx.marker_description(MarkerKind::CustomEnd), "Physics_END");
        assert_eq!(ctx.marker_description(MarkerKind::TickEvent), "TICK_EVENT");
    }
}
