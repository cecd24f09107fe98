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

//! Marker types, timestamps, and the sink contracts of the telemetry pipeline.

pub mod marker;
pub mod sink;
pub mod timestamp;

pub use marker::{Marker, MarkerFilter, MarkerKind, MarkerRecorder, NoopMarkerRecorder};
pub use sink::{
    ContextSummary, MarkerTransport, StatisticsMask, StatisticsSink, TimestampOutput, TraceSink,
};
pub use timestamp::FrameTimestamp;
