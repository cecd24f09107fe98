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

//! Multiplexes markers to the network channel, trace interfaces, and the log.

use cadence_core::telemetry::{
    ContextSummary, Marker, MarkerTransport, StatisticsSink, TimestampOutput, TraceSink,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Writes markers to the `log` facade as `"<seconds>.<microseconds>, <description>"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn requires_external_serialization(&self) -> bool {
        false
    }

    fn trace(&self, marker: &Marker, description: &str) {
        log::info!(target: "cadence::markers", "{}, {}", marker.timestamp, description);
    }
}

/// Writes context summaries to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatisticsSink;

impl StatisticsSink for LogStatisticsSink {
    fn log_statistics(&self, summary: &ContextSummary) {
        log::info!(target: "cadence::stats", "{summary}");
    }
}

/// Routes every marker to the configured sinks.
///
/// The network channel receives every marker while a client is connected.
/// The kernel trace, system trace and log sinks are gated by the
/// [`TimestampOutput`] mask. Sinks that require external serialization
/// share one lock; the others are called directly.
pub struct TelemetryFanout {
    output: AtomicU32,
    network: Option<Arc<dyn MarkerTransport>>,
    kernel_trace: Option<Arc<dyn TraceSink>>,
    system_trace: Option<Arc<dyn TraceSink>>,
    log: Arc<dyn TraceSink>,
    trace_lock: Mutex<()>,
}

impl TelemetryFanout {
    /// Creates a fan-out writing to the log when `output` selects it.
    pub fn new(output: TimestampOutput) -> Self {
        Self {
            output: AtomicU32::new(output.bits()),
            network: None,
            kernel_trace: None,
            system_trace: None,
            log: Arc::new(LogTraceSink),
            trace_lock: Mutex::new(()),
        }
    }

    /// Attaches the network channel.
    pub fn with_network(mut self, network: Arc<dyn MarkerTransport>) -> Self {
        self.network = Some(network);
        self
    }

    /// Attaches the kernel trace interface.
    pub fn with_kernel_trace(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.kernel_trace = Some(sink);
        self
    }

    /// Attaches the system trace interface.
    pub fn with_system_trace(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.system_trace = Some(sink);
        self
    }

    /// Replaces the log sink.
    pub fn with_log_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.log = sink;
        self
    }

    /// The current output mask.
    pub fn output(&self) -> TimestampOutput {
        TimestampOutput::from_bits_truncate(self.output.load(Ordering::Relaxed))
    }

    /// Replaces the output mask.
    pub fn set_output(&self, output: TimestampOutput) {
        self.output.store(output.bits(), Ordering::Relaxed);
    }

    /// `true` if a network channel is attached, connected or not.
    pub fn has_network(&self) -> bool {
        self.network.is_some()
    }

    /// Sends one marker to every selected sink.
    pub fn emit(&self, marker: &Marker, description: &str) {
        if let Some(network) = &self.network {
            if network.is_connected() {
                network.transmit(marker, description);
            }
        }

        let output = self.output();
        if output.is_empty() {
            return;
        }
        let selected = [
            (TimestampOutput::KERNEL_TRACE, self.kernel_trace.as_ref()),
            (TimestampOutput::SYSTEM_TRACE, self.system_trace.as_ref()),
            (TimestampOutput::LOG, Some(&self.log)),
        ];
        for (bit, sink) in selected {
            let Some(sink) = sink else { continue };
            if !output.contains(bit) {
                continue;
            }
            if sink.requires_external_serialization() {
                let _guard = self.trace_lock.lock().unwrap_or_else(PoisonError::into_inner);
                sink.trace(marker, description);
            } else {
                sink.trace(marker, description);
            }
        }
    }
}
