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

//! The performance service: single entry point for markers from any thread.

use crate::aggregator::MarkerAggregator;
use crate::context::ContextId;
use crate::fanout::{LogStatisticsSink, TelemetryFanout};
use cadence_core::config::TelemetryConfig;
use cadence_core::telemetry::{
    Marker, MarkerFilter, MarkerKind, MarkerRecorder, StatisticsMask, StatisticsSink,
    TimestampOutput,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Combines the [`MarkerAggregator`] and the [`TelemetryFanout`].
///
/// Recording is a no-op while neither statistics nor timestamp output is
/// selected and no network channel is attached.
pub struct PerformanceService {
    aggregator: MarkerAggregator,
    fanout: TelemetryFanout,
    logging_enabled: AtomicBool,
}

impl PerformanceService {
    /// Creates a service logging summaries through [`LogStatisticsSink`].
    pub fn new(config: &TelemetryConfig, fanout: TelemetryFanout) -> Self {
        Self::with_statistics_sink(config, fanout, Arc::new(LogStatisticsSink))
    }

    /// Creates a service with a custom statistics sink.
    pub fn with_statistics_sink(
        config: &TelemetryConfig,
        fanout: TelemetryFanout,
        statistics_sink: Arc<dyn StatisticsSink>,
    ) -> Self {
        let statistics_mask = StatisticsMask::from_bits_truncate(config.statistics_mask);
        let output = TimestampOutput::from_bits_truncate(config.timestamp_output);
        fanout.set_output(output);
        let service = Self {
            aggregator: MarkerAggregator::new(
                statistics_sink,
                statistics_mask,
                config.statistics_frequency_secs,
            ),
            fanout,
            logging_enabled: AtomicBool::new(false),
        };
        service.refresh_enabled(statistics_mask, output);
        service
    }

    fn refresh_enabled(&self, statistics_mask: StatisticsMask, output: TimestampOutput) {
        let enabled =
            !statistics_mask.is_empty() || !output.is_empty() || self.fanout.has_network();
        self.logging_enabled.store(enabled, Ordering::Release);
        log::debug!(
            "Performance logging {} (statistics {:?}, output {:?})",
            if enabled { "enabled" } else { "disabled" },
            statistics_mask,
            output
        );
    }

    /// `true` while markers are being recorded.
    pub fn is_logging_enabled(&self) -> bool {
        self.logging_enabled.load(Ordering::Acquire)
    }

    /// Replaces the statistics mask, timestamp output mask and flush frequency.
    pub fn set_logging(
        &self,
        statistics_mask: StatisticsMask,
        output: TimestampOutput,
        frequency_secs: u32,
    ) {
        self.aggregator
            .set_logging_level(statistics_mask, frequency_secs);
        self.fanout.set_output(output);
        self.refresh_enabled(statistics_mask, output);
    }

    /// Adds an application context timing custom markers.
    pub fn add_context(&self, name: &str) -> ContextId {
        let frequency = self.aggregator.frequency_secs();
        self.aggregator
            .add_context(name, MarkerFilter::CUSTOM_EVENTS, frequency)
    }

    /// Removes an application context.
    pub fn remove_context(&self, id: ContextId) {
        self.aggregator.remove_context(id);
    }

    /// Records a custom start/end marker against one context.
    pub fn add_custom_marker(&self, kind: MarkerKind, id: ContextId) {
        if !self.is_logging_enabled() {
            return;
        }
        let marker = Marker::now(kind);
        let Some(description) = self.aggregator.marker_description(kind, id) else {
            return;
        };
        self.aggregator.record_custom_marker(&marker, id);
        self.fanout.emit(&marker, &description);
    }

    /// Changes how often a context flushes.
    pub fn set_statistics_frequency(&self, frequency_secs: u32, id: ContextId) {
        self.aggregator.set_logging_frequency(frequency_secs, id);
    }

    /// Enables or disables summaries for one context.
    pub fn enable_statistics_log(&self, enabled: bool, id: ContextId) {
        self.aggregator.enable_logging(enabled, id);
    }

    /// The underlying aggregator.
    pub fn aggregator(&self) -> &MarkerAggregator {
        &self.aggregator
    }

    /// The underlying fan-out.
    pub fn fanout(&self) -> &TelemetryFanout {
        &self.fanout
    }
}

impl MarkerRecorder for PerformanceService {
    fn add_marker(&self, kind: MarkerKind) {
        if !self.is_logging_enabled() {
            return;
        }
        let marker = Marker::now(kind);
        self.aggregator.record_marker(&marker);
        self.fanout.emit(&marker, kind.name());
    }
}
