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

//! Startup, control and shutdown of the three pacing threads.

use crate::error::PacingResult;
use crate::render_driver::RenderDriver;
use crate::sync::{Participants, SyncCoordinator};
use crate::tick_driver::TickDriver;
use crate::update_driver::UpdateDriver;
use crate::worker::WorkerHandle;
use cadence_core::compute::{ComputeStage, RenderStage};
use cadence_core::config::PacingConfig;
use cadence_core::telemetry::MarkerRecorder;
use cadence_core::tick::TickSource;
use std::sync::Arc;
use std::time::Duration;

/// How long startup waits for the threads to check in.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Thread name of the tick driver.
pub const TICK_THREAD_NAME: &str = "cadence-tick";
/// Thread name of the update driver.
pub const UPDATE_THREAD_NAME: &str = "cadence-update";
/// Thread name of the render driver.
pub const RENDER_THREAD_NAME: &str = "cadence-render";

/// The external collaborators driven by the pacing threads.
pub struct PacingStages {
    /// Hardware tick source. `None` always times ticks in software.
    pub tick_source: Option<Box<dyn TickSource>>,
    /// Computation entry point.
    pub compute: Box<dyn ComputeStage>,
    /// Render entry point.
    pub render: Box<dyn RenderStage>,
}

/// A thread body handed to the spawner.
pub type ThreadBody = Box<dyn FnOnce() + Send + 'static>;

/// A running pacing core: the coordinator plus the threads it paces.
///
/// Dropping the core stops and joins every thread.
pub struct PacingCore {
    sync: Arc<SyncCoordinator>,
    workers: Vec<WorkerHandle>,
}

impl PacingCore {
    /// Spawns the tick, update and render threads and starts pacing.
    ///
    /// If any thread cannot be created, the ones already running are
    /// stopped and joined before the error is returned.
    pub fn start(
        config: &PacingConfig,
        stages: PacingStages,
        recorder: Arc<dyn MarkerRecorder>,
    ) -> PacingResult<Self> {
        Self::start_with_spawner(config, stages, recorder, WorkerHandle::spawn::<ThreadBody>)
    }

    /// Like [`start`](Self::start), creating threads through `spawn`.
    pub fn start_with_spawner<S>(
        config: &PacingConfig,
        stages: PacingStages,
        recorder: Arc<dyn MarkerRecorder>,
        mut spawn: S,
    ) -> PacingResult<Self>
    where
        S: FnMut(&str, ThreadBody) -> PacingResult<WorkerHandle>,
    {
        let sync = Arc::new(SyncCoordinator::new(config, Arc::clone(&recorder)));
        sync.initialise();

        let tick = TickDriver::new(
            stages.tick_source,
            config,
            Arc::clone(&sync),
            Arc::clone(&recorder),
        );
        let update = UpdateDriver::new(
            config,
            stages.compute,
            Arc::clone(&sync),
            Arc::clone(&recorder),
        );
        let render = RenderDriver::new(stages.render, Arc::clone(&sync), recorder);

        let bodies: [(&str, Participants, ThreadBody); 3] = [
            (TICK_THREAD_NAME, Participants::TICK, Box::new(move || tick.run())),
            (UPDATE_THREAD_NAME, Participants::UPDATE, Box::new(move || update.run())),
            (RENDER_THREAD_NAME, Participants::RENDER, Box::new(move || render.run())),
        ];

        let mut core = Self {
            sync,
            workers: Vec::with_capacity(bodies.len()),
        };
        let mut pending = Participants::ALL;
        for (name, participant, body) in bodies {
            match spawn(name, body) {
                Ok(worker) => {
                    core.workers.push(worker);
                    pending.remove(participant);
                }
                Err(e) => {
                    log::error!("Pacing startup failed: {e}");
                    core.sync.abandon(pending);
                    core.shutdown_logged();
                    return Err(e);
                }
            }
        }

        if let Err(e) = core.sync.start(STARTUP_TIMEOUT) {
            log::error!("Pacing startup failed: {e}");
            core.shutdown_logged();
            return Err(e);
        }
        Ok(core)
    }

    /// The shared coordinator.
    pub fn sync(&self) -> &Arc<SyncCoordinator> {
        &self.sync
    }

    /// Pauses ticking and updating.
    pub fn pause(&self) -> bool {
        self.sync.pause()
    }

    /// Resumes after a pause.
    pub fn resume(&self) -> bool {
        self.sync.resume()
    }

    /// Wakes the core if it went to sleep.
    pub fn update_request(&self) {
        self.sync.update_request();
    }

    /// Runs one update even while paused.
    pub fn update_once(&self) {
        self.sync.update_once();
    }

    /// Sets the number of ticks per rendered frame.
    pub fn set_render_refresh_rate(&self, vsyncs_per_render: u32) {
        self.sync.set_render_refresh_rate(vsyncs_per_render);
    }

    /// Stops every thread and waits for them.
    ///
    /// Returns the first join error, after all threads were joined.
    pub fn stop(mut self) -> PacingResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> PacingResult<()> {
        self.sync.stop();
        let mut result = Ok(());
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.join() {
                log::error!("{e}");
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    fn shutdown_logged(&mut self) {
        // Join errors are already logged by `shutdown`.
        let _ = self.shutdown();
    }
}

impl Drop for PacingCore {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.shutdown_logged();
        }
    }
}
