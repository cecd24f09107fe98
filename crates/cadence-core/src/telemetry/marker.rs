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

//! Performance markers and the filters that route them.

use super::timestamp::FrameTimestamp;
use crate::cadence_bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

cadence_bitflags! {
    /// Selects which marker families a consumer is interested in.
    pub struct MarkerFilter: u32 {
        /// Display tick events.
        const TICK = 1 << 0;
        /// Computation stage start/end.
        const COMPUTE = 1 << 1;
        /// Render stage start/end.
        const RENDER = 1 << 2;
        /// Event processing start/end.
        const EVENT_PROCESS = 1 << 3;
        /// Application-defined start/end pairs.
        const CUSTOM_EVENTS = 1 << 4;
        /// Pause and resume of the pacing core.
        const LIFECYCLE = 1 << 5;
    }
}

/// The kind of a performance marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkerKind {
    /// A display tick (or its software stand-in) was observed.
    TickEvent,
    /// The computation stage started a unit of work.
    ComputeStart,
    /// The computation stage finished a unit of work.
    ComputeEnd,
    /// The render stage started a frame.
    RenderStart,
    /// The render stage finished a frame.
    RenderEnd,
    /// Input event processing started.
    EventProcessStart,
    /// Input event processing finished.
    EventProcessEnd,
    /// Start of an application-defined interval.
    CustomStart,
    /// End of an application-defined interval.
    CustomEnd,
    /// The pacing core was paused.
    Paused,
    /// The pacing core was resumed.
    Resumed,
}

impl MarkerKind {
    /// Every kind, in declaration order.
    pub const ALL: [MarkerKind; 11] = [
        MarkerKind::TickEvent,
        MarkerKind::ComputeStart,
        MarkerKind::ComputeEnd,
        MarkerKind::RenderStart,
        MarkerKind::RenderEnd,
        MarkerKind::EventProcessStart,
        MarkerKind::EventProcessEnd,
        MarkerKind::CustomStart,
        MarkerKind::CustomEnd,
        MarkerKind::Paused,
        MarkerKind::Resumed,
    ];

    /// Stable upper-case name, used as the default marker description.
    pub const fn name(self) -> &'static str {
        match self {
            MarkerKind::TickEvent => "TICK_EVENT",
            MarkerKind::ComputeStart => "COMPUTE_START",
            MarkerKind::ComputeEnd => "COMPUTE_END",
            MarkerKind::RenderStart => "RENDER_START",
            MarkerKind::RenderEnd => "RENDER_END",
            MarkerKind::EventProcessStart => "EVENT_PROCESS_START",
            MarkerKind::EventProcessEnd => "EVENT_PROCESS_END",
            MarkerKind::CustomStart => "CUSTOM_START",
            MarkerKind::CustomEnd => "CUSTOM_END",
            MarkerKind::Paused => "PAUSED",
            MarkerKind::Resumed => "RESUMED",
        }
    }

    /// The filter bit this kind belongs to.
    pub const fn filter(self) -> MarkerFilter {
        match self {
            MarkerKind::TickEvent => MarkerFilter::TICK,
            MarkerKind::ComputeStart | MarkerKind::ComputeEnd => MarkerFilter::COMPUTE,
            MarkerKind::RenderStart | MarkerKind::RenderEnd => MarkerFilter::RENDER,
            MarkerKind::EventProcessStart | MarkerKind::EventProcessEnd => {
                MarkerFilter::EVENT_PROCESS
            }
            MarkerKind::CustomStart | MarkerKind::CustomEnd => MarkerFilter::CUSTOM_EVENTS,
            MarkerKind::Paused | MarkerKind::Resumed => MarkerFilter::LIFECYCLE,
        }
    }

    /// `true` for kinds that open a timed interval.
    pub const fn is_start(self) -> bool {
        matches!(
            self,
            MarkerKind::ComputeStart
                | MarkerKind::RenderStart
                | MarkerKind::EventProcessStart
                | MarkerKind::CustomStart
        )
    }

    /// `true` for kinds that close a timed interval.
    pub const fn is_end(self) -> bool {
        matches!(
            self,
            MarkerKind::ComputeEnd
                | MarkerKind::RenderEnd
                | MarkerKind::EventProcessEnd
                | MarkerKind::CustomEnd
        )
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable timing event, created on the thread that observed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// What happened.
    pub kind: MarkerKind,
    /// When it happened.
    pub timestamp: FrameTimestamp,
}

impl Marker {
    /// Creates a marker stamped with the current monotonic time.
    pub fn now(kind: MarkerKind) -> Self {
        Self {
            kind,
            timestamp: FrameTimestamp::now(),
        }
    }

    /// Creates a marker with an explicit timestamp.
    pub fn at(kind: MarkerKind, timestamp: FrameTimestamp) -> Self {
        Self { kind, timestamp }
    }
}

/// Entry point through which the pacing threads report markers.
///
/// Implementations must never block the caller for longer than it takes to
/// update in-memory statistics.
pub trait MarkerRecorder: Send + Sync {
    /// Records a marker of the given kind, stamped now.
    fn add_marker(&self, kind: MarkerKind);
}

/// A recorder that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMarkerRecorder;

impl MarkerRecorder for NoopMarkerRecorder {
    fn add_marker(&self, _kind: MarkerKind) {}
}
