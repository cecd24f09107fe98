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

//! # Cadence Telemetry
//!
//! Collects performance markers from any thread, aggregates them into
//! per-context timing statistics and fans them out to the configured sinks.
//! Also hosts the remote control protocol used by network clients to inspect
//! and mutate the scene.

#![warn(missing_docs)]

pub mod aggregator;
pub mod context;
pub mod fanout;
pub mod remote;
pub mod service;
pub mod stats;

pub use aggregator::MarkerAggregator;
pub use context::{ContextId, StatContext};
pub use fanout::{LogStatisticsSink, LogTraceSink, TelemetryFanout};
pub use remote::{RemoteControlChannel, RemoteError, RemoteHandle};
pub use service::PerformanceService;
pub use stats::FrameTimeStats;
