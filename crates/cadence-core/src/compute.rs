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

//! Contracts for the external computation and render stages.

use crate::cadence_bitflags;

cadence_bitflags! {
    /// Reasons the computation stage reports for needing further frames.
    pub struct KeepUpdating: u32 {
        /// The stage asked to keep rendering for a while.
        const STAGE_KEEP_RENDERING = 1 << 0;
        /// Animations are in progress.
        const ANIMATIONS_RUNNING = 1 << 1;
        /// Resources are still being loaded.
        const LOADING_RESOURCES = 1 << 2;
        /// Performance monitoring keeps the loop alive.
        const MONITORING_PERFORMANCE = 1 << 3;
        /// A render task waits for synchronization.
        const RENDER_TASK_SYNC = 1 << 4;
    }
}

impl KeepUpdating {
    /// Human-readable description of one flag, used in status logs.
    pub fn describe(flag: &str) -> &'static str {
        match flag {
            "STAGE_KEEP_RENDERING" => "stage keep rendering",
            "ANIMATIONS_RUNNING" => "animations running",
            "LOADING_RESOURCES" => "resources loading",
            "MONITORING_PERFORMANCE" => "monitoring performance",
            "RENDER_TASK_SYNC" => "render task sync",
            _ => "unknown",
        }
    }
}

/// What the computation stage reports after one unit of work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeStatus {
    /// Why more frames are needed. Empty means the stage is idle.
    pub keep_updating: KeepUpdating,
    /// Whether the event thread should be notified after this unit.
    pub needs_notification: bool,
}

impl ComputeStatus {
    /// `true` if the stage wants another frame.
    pub fn keep_computing(&self) -> bool {
        !self.keep_updating.is_empty()
    }
}

/// Timing handed to the computation stage for one unit of work.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTiming {
    /// Seconds since the previous unit of work.
    pub delta_seconds: f32,
    /// Time of the tick that released this unit, in milliseconds.
    pub last_tick_ms: u32,
    /// Predicted time of the tick that will display its result, in milliseconds.
    pub next_tick_ms: u32,
}

/// The external computation entry point, driven by the update thread.
pub trait ComputeStage: Send {
    /// Performs one unit of computation.
    fn compute(&mut self, timing: &FrameTiming) -> ComputeStatus;
}

/// The external render entry point, driven by the render thread.
pub trait RenderStage: Send {
    /// Renders one frame from the latest computed state.
    fn render(&mut self);
}
