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

//! Frame timing prediction for the computation stage.

use cadence_core::compute::FrameTiming;
use cadence_core::telemetry::FrameTimestamp;

/// Number of past updates used to detect a frame-skip pattern.
pub const HISTORY_SIZE: usize = 3;

/// Tracks display ticks and derives, at every update, the time since the
/// previous update and the predicted time of the next display tick.
///
/// When the number of ticks between updates was the same for the last
/// [`HISTORY_SIZE`] updates, the prediction assumes the pattern continues;
/// otherwise it predicts the very next tick.
#[derive(Debug, Clone)]
pub struct FrameTime {
    tick_interval_us: u64,
    last_tick: Option<FrameTimestamp>,
    last_tick_frame: u32,
    previous_update_tick: FrameTimestamp,
    previous_update_frame: u32,
    running: bool,
    first_frame: bool,
    history: [u32; HISTORY_SIZE],
    history_index: usize,
}

impl FrameTime {
    /// Creates a predictor for ticks `tick_interval_us` microseconds apart.
    pub fn new(tick_interval_us: u64) -> Self {
        Self {
            tick_interval_us: tick_interval_us.max(1),
            last_tick: None,
            last_tick_frame: 0,
            previous_update_tick: FrameTimestamp::default(),
            previous_update_frame: 0,
            running: true,
            first_frame: true,
            history: [1; HISTORY_SIZE],
            history_index: 0,
        }
    }

    /// Records a display tick.
    pub fn set_tick(&mut self, frame_number: u32, timestamp: FrameTimestamp) {
        self.last_tick = Some(timestamp);
        self.last_tick_frame = frame_number;
    }

    /// Stops predicting while the core is paused.
    pub fn suspend(&mut self) {
        self.running = false;
    }

    /// Resumes after [`suspend`](Self::suspend). The next update reports no
    /// elapsed time, so the pause is not seen as one long frame.
    pub fn resume(&mut self) {
        self.running = true;
        self.first_frame = true;
    }

    /// Stops predicting while the core sleeps.
    pub fn sleep(&mut self) {
        self.suspend();
    }

    /// Resumes after [`sleep`](Self::sleep).
    pub fn wake_up(&mut self) {
        self.resume();
    }

    /// `true` unless suspended or sleeping.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Computes the timing of the update about to run.
    pub fn predict_next(&mut self) -> FrameTiming {
        let interval_ms = self.tick_interval_us as f64 / 1000.0;
        let Some(last_tick) = self.last_tick.filter(|_| self.running) else {
            let now_ms = to_millis(FrameTimestamp::now());
            return FrameTiming {
                delta_seconds: 0.0,
                last_tick_ms: now_ms,
                next_tick_ms: now_ms.wrapping_add(interval_ms.round() as u32),
            };
        };

        let delta_seconds = if self.first_frame {
            self.first_frame = false;
            self.history = [1; HISTORY_SIZE];
            0.0
        } else {
            let frames = self
                .last_tick_frame
                .wrapping_sub(self.previous_update_frame)
                .max(1);
            self.history[self.history_index] = frames;
            self.history_index = (self.history_index + 1) % HISTORY_SIZE;
            last_tick.micros_since(self.previous_update_tick) as f32 / 1_000_000.0
        };

        let frames_until_next = if self.history.iter().all(|&f| f == self.history[0]) {
            self.history[0]
        } else {
            1
        };

        self.previous_update_tick = last_tick;
        self.previous_update_frame = self.last_tick_frame;

        let last_tick_ms = to_millis(last_tick);
        FrameTiming {
            delta_seconds,
            last_tick_ms,
            next_tick_ms: last_tick_ms
                .wrapping_add((interval_ms * f64::from(frames_until_next)).round() as u32),
        }
    }
}

fn to_millis(timestamp: FrameTimestamp) -> u32 {
    (timestamp.as_micros() / 1000) as u32
}
