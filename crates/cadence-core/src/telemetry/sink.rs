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

//! Contracts for the destinations that markers and statistics are fanned out to.

use super::marker::Marker;
use crate::cadence_bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

cadence_bitflags! {
    /// Which local timestamp outputs receive every marker.
    pub struct TimestampOutput: u32 {
        /// The process log.
        const LOG = 1 << 0;
        /// The kernel trace interface.
        const KERNEL_TRACE = 1 << 1;
        /// The system trace interface.
        const SYSTEM_TRACE = 1 << 2;
    }
}

cadence_bitflags! {
    /// Which statistics contexts periodically log their summaries.
    pub struct StatisticsMask: u32 {
        /// The built-in `Update` and `Render` contexts.
        const UPDATE_RENDER = 1 << 0;
        /// The built-in `Event` context.
        const EVENT_PROCESS = 1 << 1;
        /// Every application-created context.
        const CUSTOM_MARKERS = 1 << 2;
    }
}

/// A low-level trace interface receiving every marker.
pub trait TraceSink: Send + Sync {
    /// `true` when concurrent calls to [`trace`](Self::trace) must be
    /// serialized by the caller. All sinks answering `true` share one lock.
    fn requires_external_serialization(&self) -> bool;

    /// Emits one marker.
    fn trace(&self, marker: &Marker, description: &str);
}

/// The network channel used by remote clients to receive markers.
///
/// Implementations are internally thread-safe and must drop data rather than
/// block when a client is slow or gone.
pub trait MarkerTransport: Send + Sync {
    /// `true` while at least one remote client is attached.
    fn is_connected(&self) -> bool;

    /// Queues one marker for every attached client.
    fn transmit(&self, marker: &Marker, description: &str);
}

/// A statistics summary for one context, produced at every flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    /// Context name.
    pub context: String,
    /// Shortest interval, in milliseconds.
    pub min_ms: f64,
    /// Longest interval, in milliseconds.
    pub max_ms: f64,
    /// Sum of all intervals, in seconds.
    pub total_s: f64,
    /// Mean interval, in milliseconds.
    pub mean_ms: f64,
    /// Standard deviation of the intervals, in milliseconds.
    pub std_dev_ms: f64,
    /// Number of completed intervals.
    pub samples: u32,
}

impl fmt::Display for ContextSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, min {:.2} ms, max {:.2} ms, total {:.1} s, avg {:.2} ms, std-dev {:.2} ms",
            self.context, self.min_ms, self.max_ms, self.total_s, self.mean_ms, self.std_dev_ms
        )
    }
}

/// Receives context summaries when a statistics context flushes.
pub trait StatisticsSink: Send + Sync {
    /// Consumes one summary.
    fn log_statistics(&self, summary: &ContextSummary);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_text_shape() {
        let summary = ContextSummary {
            context: "Render".to_string(),
            min_ms: 1.0,
            max_ms: 4.5,
            total_s: 0.1234,
            mean_ms: 2.25,
            std_dev_ms: 0.5,
            samples: 40,
        };
        assert_eq!(
            summary.to_string(),
            "Render, min 1.00 ms, max 4.50 ms, total 0.1 s, avg 2.25 ms, std-dev 0.50 ms"
        );
    }

    #[test]
    fn test_output_mask_bits() {
        let mask = TimestampOutput::from_bits_truncate(0b101);
        assert!(mask.contains(TimestampOutput::LOG));
        assert!(!mask.contains(TimestampOutput::KERNEL_TRACE));
        assert!(mask.contains(TimestampOutput::SYSTEM_TRACE));
    }
}
