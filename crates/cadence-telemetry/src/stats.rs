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

//! Running timing statistics for start/end interval pairs.

use cadence_core::telemetry::{ContextSummary, FrameTimestamp};

/// Accumulates the durations of completed start/end intervals.
///
/// Only sums are kept, so the memory footprint does not grow with the number
/// of samples. Mean and standard deviation are derived on demand.
#[derive(Debug, Clone, Default)]
pub struct FrameTimeStats {
    open_start: Option<FrameTimestamp>,
    min_us: u64,
    max_us: u64,
    total_us: u64,
    sum_squares_us: f64,
    count: u32,
}

impl FrameTimeStats {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an interval. An already open interval is restarted.
    pub fn start_time(&mut self, timestamp: FrameTimestamp) {
        self.open_start = Some(timestamp);
    }

    /// Closes the open interval and accumulates its duration.
    ///
    /// Ignored when no interval is open.
    pub fn end_time(&mut self, timestamp: FrameTimestamp) {
        let Some(start) = self.open_start.take() else {
            return;
        };
        let duration = timestamp.micros_since(start);
        if self.count == 0 {
            self.min_us = duration;
            self.max_us = duration;
        } else {
            self.min_us = self.min_us.min(duration);
            self.max_us = self.max_us.max(duration);
        }
        self.total_us += duration;
        self.sum_squares_us += (duration as f64) * (duration as f64);
        self.count += 1;
    }

    /// Zeroes every field, including the open interval.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of completed intervals.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Shortest interval, in milliseconds.
    pub fn min_ms(&self) -> f64 {
        self.min_us as f64 / 1000.0
    }

    /// Longest interval, in milliseconds.
    pub fn max_ms(&self) -> f64 {
        self.max_us as f64 / 1000.0
    }

    /// Sum of all intervals, in seconds.
    pub fn total_seconds(&self) -> f64 {
        self.total_us as f64 / 1_000_000.0
    }

    /// Mean and population standard deviation, both in milliseconds.
    pub fn calculate_mean(&self) -> (f64, f64) {
        if self.count == 0 {
            return (0.0, 0.0);
        }
        let n = f64::from(self.count);
        let mean_us = self.total_us as f64 / n;
        let variance = (self.sum_squares_us / n - mean_us * mean_us).max(0.0);
        (mean_us / 1000.0, variance.sqrt() / 1000.0)
    }

    /// Snapshot of the statistics under the given context name.
    pub fn summary(&self, context: &str) -> ContextSummary {
        let (mean_ms, std_dev_ms) = self.calculate_mean();
        ContextSummary {
            context: context.to_string(),
            min_ms: self.min_ms(),
            max_ms: self.max_ms(),
            total_s: self.total_seconds(),
            mean_ms,
            std_dev_ms,
            samples: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(micros: u64) -> FrameTimestamp {
        FrameTimestamp::from_micros(micros)
    }

    fn record(stats: &mut FrameTimeStats, start: u64, duration: u64) {
        stats.start_time(ts(start));
        stats.end_time(ts(start + duration));
    }

    #[test]
    fn test_known_durations() {
        let mut stats = FrameTimeStats::new();
        record(&mut stats, 0, 10_000);
        record(&mut stats, 20_000, 20_000);
        record(&mut stats, 50_000, 30_000);

        assert_eq!(stats.count(), 3);
        assert_eq!(stats.min_ms(), 10.0);
        assert_eq!(stats.max_ms(), 30.0);
        assert!((stats.total_seconds() - 0.06).abs() < 1e-9);

        let (mean, std_dev) = stats.calculate_mean();
        assert!((mean - 20.0).abs() < 1e-9, "mean was {mean}");
        let expected = (200.0f64 / 3.0).sqrt();
        assert!((std_dev - expected).abs() < 1e-6, "std-dev was {std_dev}");
    }

    #[test]
    fn test_end_without_start_is_ignored() {
        let mut stats = FrameTimeStats::new();
        stats.end_time(ts(5_000));
        assert_eq!(stats.count(), 0);

        record(&mut stats, 0, 1_000);
        stats.end_time(ts(9_000));
        assert_eq!(stats.count(), 1, "A second end must not reuse the closed start");
    }

    #[test]
    fn test_restarted_interval_measures_from_latest_start() {
        let mut stats = FrameTimeStats::new();
        stats.start_time(ts(0));
        stats.start_time(ts(4_000));
        stats.end_time(ts(5_000));
        assert_eq!(stats.max_ms(), 1.0);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut stats = FrameTimeStats::new();
        record(&mut stats, 0, 2_000);
        stats.start_time(ts(10_000));

        stats.reset();
        let once = stats.summary("ctx");
        stats.reset();
        let twice = stats.summary("ctx");

        assert_eq!(once, twice);
        assert_eq!(once.samples, 0);
        assert_eq!(once.total_s, 0.0);
        stats.end_time(ts(20_000));
        assert_eq!(stats.count(), 0, "Reset must also drop the open interval");
    }

    #[test]
    fn test_empty_mean_is_zero() {
        assert_eq!(FrameTimeStats::new().calculate_mean(), (0.0, 0.0));
    }
}
