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

//! The render thread.

use crate::sync::{Participants, SyncCoordinator};
use cadence_core::compute::RenderStage;
use cadence_core::telemetry::{MarkerKind, MarkerRecorder};
use std::sync::Arc;

/// Renders one frame per computed update.
pub struct RenderDriver {
    sync: Arc<SyncCoordinator>,
    stage: Box<dyn RenderStage>,
    recorder: Arc<dyn MarkerRecorder>,
}

impl RenderDriver {
    /// Creates a driver for `stage`.
    pub fn new(
        stage: Box<dyn RenderStage>,
        sync: Arc<SyncCoordinator>,
        recorder: Arc<dyn MarkerRecorder>,
    ) -> Self {
        Self {
            sync,
            stage,
            recorder,
        }
    }

    /// Thread body. Returns once the coordinator terminates.
    pub fn run(mut self) {
        self.sync.check_in(Participants::RENDER);
        log::info!("Render thread started.");

        while self.sync.await_render_slot() {
            self.recorder.add_marker(MarkerKind::RenderStart);
            self.stage.render();
            self.recorder.add_marker(MarkerKind::RenderEnd);
            self.sync.render_finished();
        }

        self.sync.check_out(Participants::RENDER);
        log::info!("Render thread stopped.");
    }
}
