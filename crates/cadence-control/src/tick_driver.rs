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

//! The tick thread: waits out each render cycle and reports it.

use crate::sync::{Participants, SyncCoordinator};
use cadence_core::config::PacingConfig;
use cadence_core::telemetry::{FrameTimestamp, MarkerKind, MarkerRecorder};
use cadence_core::tick::TickSource;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The end of one render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickCycle {
    /// Sequence number of the last tick of the cycle.
    pub frame_number: u32,
    /// When the cycle ended.
    pub timestamp: FrameTimestamp,
    /// `false` only before the first cycle.
    pub valid: bool,
}

/// How the tick thread waits out a render cycle.
///
/// Chosen once when the driver starts.
pub trait TickStrategy: Send {
    /// Blocks for one render cycle of `vsyncs_per_render` ticks.
    fn wait_cycle(&mut self, vsyncs_per_render: u32) -> TickCycle;

    /// Releases any hardware held by the strategy.
    fn terminate(&mut self) {}
}

/// Microseconds to sleep for a software-timed cycle.
///
/// The first tick is due one `period_us` after the previous one, minus the
/// time already spent since; the remaining `vsyncs_per_render - 1` ticks
/// each take a full period.
pub fn software_sleep_us(period_us: u64, elapsed_us: u64, vsyncs_per_render: u32) -> u64 {
    let extra_ticks = u64::from(vsyncs_per_render.max(1) - 1);
    period_us.saturating_sub(elapsed_us) + extra_ticks * period_us
}

/// Times render cycles with a sleep, for when no hardware tick exists.
#[derive(Debug)]
pub struct SoftwareTick {
    period_us: u64,
    last_tick: Option<Instant>,
    frame_number: u32,
}

impl SoftwareTick {
    /// Creates a software tick of `period_us` microseconds.
    pub fn new(period_us: u64) -> Self {
        Self {
            period_us,
            last_tick: None,
            frame_number: 0,
        }
    }

    /// Notes a tick observed elsewhere, so the next software wait is timed
    /// from it.
    pub fn observe_tick(&mut self, frame_number: u32) {
        self.last_tick = Some(Instant::now());
        self.frame_number = frame_number;
    }
}

impl TickStrategy for SoftwareTick {
    fn wait_cycle(&mut self, vsyncs_per_render: u32) -> TickCycle {
        let elapsed_us = self
            .last_tick
            .map_or(0, |t| t.elapsed().as_micros() as u64);
        let sleep_us = software_sleep_us(self.period_us, elapsed_us, vsyncs_per_render);
        std::thread::sleep(Duration::from_micros(sleep_us));

        self.last_tick = Some(Instant::now());
        self.frame_number = self.frame_number.wrapping_add(vsyncs_per_render.max(1));
        TickCycle {
            frame_number: self.frame_number,
            timestamp: FrameTimestamp::now(),
            valid: true,
        }
    }
}

/// Waits on a hardware [`TickSource`], timing in software whenever the
/// hardware is unavailable or a wait fails.
pub struct HardwareTick {
    source: Box<dyn TickSource>,
    fallback: SoftwareTick,
}

impl HardwareTick {
    /// Wraps an initialized source.
    pub fn new(source: Box<dyn TickSource>, period_us: u64) -> Self {
        Self {
            source,
            fallback: SoftwareTick::new(period_us),
        }
    }
}

impl TickStrategy for HardwareTick {
    fn wait_cycle(&mut self, vsyncs_per_render: u32) -> TickCycle {
        let vsyncs = vsyncs_per_render.max(1);
        if !self.source.use_hardware() {
            return self.fallback.wait_cycle(vsyncs);
        }

        let mut last_sample = None;
        for waited in 0..vsyncs {
            match self.source.wait_for_tick() {
                Ok(sample) => {
                    self.fallback.observe_tick(sample.sequence);
                    last_sample = Some(sample);
                }
                Err(e) => {
                    log::debug!("Hardware tick failed ({e}), timing the rest of the cycle in software");
                    return self.fallback.wait_cycle(vsyncs - waited);
                }
            }
        }

        match last_sample {
            Some(sample) => TickCycle {
                frame_number: sample.sequence,
                timestamp: sample.timestamp,
                valid: true,
            },
            None => self.fallback.wait_cycle(vsyncs),
        }
    }

    fn terminate(&mut self) {
        self.source.terminate();
    }
}

/// Runs the tick thread.
pub struct TickDriver {
    source: Option<Box<dyn TickSource>>,
    use_hardware: bool,
    period_us: u64,
    sync: Arc<SyncCoordinator>,
    recorder: Arc<dyn MarkerRecorder>,
}

impl TickDriver {
    /// Creates a driver. With no `source`, or with hardware disabled in
    /// `config`, every cycle is timed in software.
    pub fn new(
        source: Option<Box<dyn TickSource>>,
        config: &PacingConfig,
        sync: Arc<SyncCoordinator>,
        recorder: Arc<dyn MarkerRecorder>,
    ) -> Self {
        Self {
            source,
            use_hardware: config.use_hardware_tick,
            period_us: config.tick_period_us(),
            sync,
            recorder,
        }
    }

    fn select_strategy(&mut self) -> Box<dyn TickStrategy> {
        if let Some(mut source) = self.source.take() {
            if self.use_hardware && source.initialize() {
                log::info!("Using hardware display tick.");
                return Box::new(HardwareTick::new(source, self.period_us));
            }
            source.terminate();
        }
        log::info!("Using software display tick ({} us).", self.period_us);
        Box::new(SoftwareTick::new(self.period_us))
    }

    /// Thread body. Returns once the coordinator terminates.
    pub fn run(mut self) {
        let mut strategy = self.select_strategy();
        self.sync.check_in(Participants::TICK);
        log::info!("Tick thread started.");

        let mut cycle = TickCycle::default();
        let mut vsyncs_per_render = 1;
        while self.sync.await_next_tick_slot(
            cycle.valid,
            cycle.frame_number,
            cycle.timestamp,
            &mut vsyncs_per_render,
        ) {
            cycle = strategy.wait_cycle(vsyncs_per_render);
            self.recorder.add_marker(MarkerKind::TickEvent);
        }

        strategy.terminate();
        self.sync.check_out(Participants::TICK);
        log::info!("Tick thread stopped.");
    }
}
