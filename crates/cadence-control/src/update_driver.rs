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

//! The update thread: runs the computation stage once per released slot.

use crate::sync::{Participants, SyncCoordinator};
use cadence_core::compute::{ComputeStage, ComputeStatus, KeepUpdating};
use cadence_core::config::PacingConfig;
use cadence_core::telemetry::{MarkerKind, MarkerRecorder};
use std::path::PathBuf;
use std::sync::Arc;

/// Measures the update rate over a fixed window.
#[derive(Debug, Clone)]
pub struct FpsTracker {
    window_secs: f32,
    elapsed_secs: f32,
    frames: u32,
    record_path: Option<PathBuf>,
}

impl FpsTracker {
    /// Creates a tracker over `window_secs`. Returns `None` when the window
    /// is zero or negative.
    pub fn new(window_secs: f32, record_path: Option<PathBuf>) -> Option<Self> {
        (window_secs > 0.0).then(|| Self {
            window_secs,
            elapsed_secs: 0.0,
            frames: 0,
            record_path,
        })
    }

    /// Adds one frame. Returns the rate when the window elapses.
    pub fn track(&mut self, delta_seconds: f32) -> Option<f32> {
        self.elapsed_secs += delta_seconds;
        self.frames += 1;
        if self.elapsed_secs < self.window_secs {
            return None;
        }
        self.flush()
    }

    /// Reports and records the rate of a partial window, if any frames
    /// elapsed.
    pub fn finish(&mut self) -> Option<f32> {
        self.flush()
    }

    fn flush(&mut self) -> Option<f32> {
        if self.frames == 0 || self.elapsed_secs <= 0.0 {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed_secs;
        log::info!("Frame rate: {fps:.2} fps over {:.2} s", self.elapsed_secs);
        if let Some(path) = &self.record_path {
            if let Err(e) = std::fs::write(path, format!("{fps:.2} \n")) {
                log::warn!("Failed to write frame rate to {}: {e}", path.display());
            }
        }
        self.elapsed_secs = 0.0;
        self.frames = 0;
        Some(fps)
    }
}

/// Human-readable list of the reasons in `status`.
pub fn describe_status(status: KeepUpdating) -> String {
    let reasons: Vec<&str> = status.names().map(KeepUpdating::describe).collect();
    if reasons.is_empty() {
        "idle".to_string()
    } else {
        reasons.join(", ")
    }
}

/// Runs the update thread.
pub struct UpdateDriver {
    sync: Arc<SyncCoordinator>,
    stage: Box<dyn ComputeStage>,
    recorder: Arc<dyn MarkerRecorder>,
    fps: Option<FpsTracker>,
    status_interval: u32,
}

impl UpdateDriver {
    /// Creates a driver for `stage`.
    pub fn new(
        config: &PacingConfig,
        stage: Box<dyn ComputeStage>,
        sync: Arc<SyncCoordinator>,
        recorder: Arc<dyn MarkerRecorder>,
    ) -> Self {
        Self {
            sync,
            stage,
            recorder,
            fps: FpsTracker::new(config.fps_tracking_seconds, config.fps_record_path.clone()),
            status_interval: config.update_status_log_frames,
        }
    }

    /// Thread body. Returns once the coordinator terminates.
    pub fn run(mut self) {
        self.sync.check_in(Participants::UPDATE);
        log::info!("Update thread started.");

        // Nothing has run yet, so do not count towards going to sleep.
        let mut status = ComputeStatus {
            keep_updating: KeepUpdating::STAGE_KEEP_RENDERING,
            needs_notification: false,
        };
        let mut frame: u64 = 0;
        while let Some(timing) = self
            .sync
            .await_update_slot(status.needs_notification, status.keep_computing())
        {
            self.recorder.add_marker(MarkerKind::ComputeStart);
            status = self.stage.compute(&timing);
            self.recorder.add_marker(MarkerKind::ComputeEnd);

            frame += 1;
            if let Some(fps) = self.fps.as_mut() {
                fps.track(timing.delta_seconds);
            }
            if self.status_interval != 0 && frame % u64::from(self.status_interval) == 0 {
                log::info!(
                    "Update status (frame {frame}): {}",
                    describe_status(status.keep_updating)
                );
            }
        }

        if let Some(fps) = self.fps.as_mut() {
            fps.finish();
        }
        self.sync.check_out(Participants::UPDATE);
        log::info!("Update thread stopped.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_disabled_for_zero_window() {
        assert!(FpsTracker::new(0.0, None).is_none());
    }

    #[test]
    fn test_tracker_reports_after_window() {
        let mut tracker = FpsTracker::new(0.99, None).unwrap();
        for _ in 0..59 {
            assert!(tracker.track(1.0 / 60.0).is_none());
        }
        let fps = tracker.track(1.0 / 60.0).expect("window elapsed");
        assert!((fps - 60.0).abs() < 0.5, "fps was {fps}");
        assert!(tracker.finish().is_none(), "Window was reset");
    }

    #[test]
    fn test_tracker_writes_record_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fps.txt");
        let mut tracker = FpsTracker::new(0.5, Some(path.clone())).unwrap();
        tracker.track(0.25);
        tracker.track(0.25);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "4.00 \n");

        tracker.track(0.1);
        tracker.finish();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "10.00 \n", "Overwritten per window");
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(KeepUpdating::EMPTY), "idle");
        assert_eq!(
            describe_status(KeepUpdating::ANIMATIONS_RUNNING | KeepUpdating::LOADING_RESOURCES),
            "animations running, resources loading"
        );
    }
}
