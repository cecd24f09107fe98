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

use cadence_core::telemetry::FrameTimestamp;
use cadence_core::tick::{TickError, TickResult, TickSample, TickSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A simulated display that ticks on a fixed period.
///
/// Ticks land on a regular grid of deadlines; a late waiter resynchronises
/// to the grid instead of bursting through the missed ticks. Availability
/// can be toggled from another thread to exercise the software fallback.
#[derive(Debug)]
pub struct IntervalTickSource {
    period: Duration,
    next_deadline: Option<Instant>,
    sequence: u32,
    initialized: bool,
    available: Arc<AtomicBool>,
}

impl IntervalTickSource {
    /// Creates a source ticking every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_deadline: None,
            sequence: 0,
            initialized: false,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Creates a source ticking at `hz` per second.
    pub fn from_hz(hz: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(hz.max(1))))
    }

    /// Shared flag toggling whether the source reports itself usable.
    pub fn availability(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.available)
    }
}

impl TickSource for IntervalTickSource {
    fn initialize(&mut self) -> bool {
        self.initialized = true;
        self.next_deadline = None;
        true
    }

    fn use_hardware(&self) -> bool {
        self.initialized && self.available.load(Ordering::Relaxed)
    }

    fn wait_for_tick(&mut self) -> TickResult<TickSample> {
        if !self.use_hardware() {
            return Err(TickError::Unavailable);
        }
        let now = Instant::now();
        let mut deadline = self.next_deadline.unwrap_or(now + self.period);
        while deadline + self.period < now {
            deadline += self.period;
            self.sequence = self.sequence.wrapping_add(1);
        }
        if let Some(remaining) = deadline.checked_duration_since(now) {
            std::thread::sleep(remaining);
        }
        self.sequence = self.sequence.wrapping_add(1);
        self.next_deadline = Some(deadline + self.period);
        Ok(TickSample {
            sequence: self.sequence,
            timestamp: FrameTimestamp::now(),
        })
    }

    fn terminate(&mut self) {
        self.initialized = false;
        self.next_deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_are_spaced_by_period() {
        let mut source = IntervalTickSource::new(Duration::from_millis(5));
        assert!(source.initialize());
        let start = Instant::now();
        let first = source.wait_for_tick().unwrap();
        let second = source.wait_for_tick().unwrap();
        let third = source.wait_for_tick().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(15));
        assert_eq!((first.sequence, second.sequence, third.sequence), (1, 2, 3));
    }

    #[test]
    fn test_unavailable_until_initialized_and_when_toggled() {
        let mut source = IntervalTickSource::from_hz(1000);
        assert!(!source.use_hardware());
        assert_eq!(source.wait_for_tick(), Err(TickError::Unavailable));

        source.initialize();
        assert!(source.use_hardware());
        source.availability().store(false, Ordering::Relaxed);
        assert!(!source.use_hardware());
        assert!(source.wait_for_tick().is_err());

        source.availability().store(true, Ordering::Relaxed);
        source.terminate();
        assert!(!source.use_hardware());
    }

    #[test]
    fn test_late_waiter_skips_missed_ticks() {
        let mut source = IntervalTickSource::new(Duration::from_millis(2));
        source.initialize();
        source.wait_for_tick().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        let sample = source.wait_for_tick().unwrap();
        assert!(sample.sequence >= 8, "Sequence should count missed ticks, got {}", sample.sequence);
    }
}
