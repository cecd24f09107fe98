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

//! The rendezvous shared by the tick, update and render threads.
//!
//! All pacing state lives in one [`SyncState`] behind one mutex, paired with
//! one condition variable. Every transition calls `notify_all`, and every
//! wait re-checks its own predicate plus the terminal phase, so a single
//! [`SyncCoordinator::stop`] releases every waiter.

use crate::error::{PacingError, PacingResult};
use crate::frame_time::FrameTime;
use cadence_core::cadence_bitflags;
use cadence_core::compute::FrameTiming;
use cadence_core::config::PacingConfig;
use cadence_core::telemetry::{FrameTimestamp, MarkerKind, MarkerRecorder};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

cadence_bitflags! {
    /// The threads taking part in the rendezvous.
    pub struct Participants: u8 {
        /// The tick thread.
        const TICK = 1 << 0;
        /// The update thread.
        const UPDATE = 1 << 1;
        /// The render thread.
        const RENDER = 1 << 2;
    }
}

/// Lifecycle phase of the pacing core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created, not initialised.
    Stopped,
    /// Threads are being spawned and checking in.
    Initialising,
    /// Ticking and updating.
    Running,
    /// Paused by the application. Frame counters are kept.
    Paused,
    /// Idle: the computation stage asked for no more frames.
    Sleeping,
    /// Shutting down; waiters return at their next slot.
    Terminating,
    /// Every participant has observed termination.
    Terminated,
}

impl Phase {
    /// `true` once [`SyncCoordinator::stop`] has been called.
    pub fn is_terminating(self) -> bool {
        matches!(self, Phase::Terminating | Phase::Terminated)
    }
}

type EventNotifier = Arc<dyn Fn() + Send + Sync>;

struct SyncState {
    phase: Phase,
    participants: Participants,
    checked_in: Participants,
    checked_out: Participants,

    vsyncs_per_render: u32,
    pending_vsyncs_per_render: Option<u32>,
    maximum_updates_ahead: u32,
    sleep_threshold: u32,

    ticks_ahead_of_update: u32,
    updates_ahead_of_render: u32,
    update_in_flight: bool,
    update_resuming: bool,
    update_requested: bool,
    update_once: bool,
    idle_updates: u32,

    frame_counter: u64,
    ticks_observed: u64,
    renders_completed: u64,
    last_tick: Option<FrameTimestamp>,
    frame_time: FrameTime,
}

impl SyncState {
    fn all_checked_out(&self) -> bool {
        self.checked_out.contains(self.participants)
    }

    fn try_terminate(&mut self) {
        if self.phase == Phase::Terminating && self.all_checked_out() {
            self.phase = Phase::Terminated;
            log::debug!("All pacing threads exited");
        }
    }

    fn release_update(&mut self) -> FrameTiming {
        self.update_in_flight = true;
        self.update_once = false;
        self.frame_counter += 1;
        self.frame_time.predict_next()
    }

    fn enter_sleep(&mut self) {
        self.phase = Phase::Sleeping;
        self.idle_updates = 0;
        self.frame_time.sleep();
        log::debug!("No further updates requested, going to sleep");
    }

    fn wake_up(&mut self) {
        self.phase = Phase::Running;
        self.ticks_ahead_of_update = 0;
        self.frame_time.wake_up();
        log::debug!("Woken up by an update request");
    }
}

/// Coordinates the tick, update and render threads.
pub struct SyncCoordinator {
    state: Mutex<SyncState>,
    signal: Condvar,
    recorder: Arc<dyn MarkerRecorder>,
    notifier: Mutex<Option<EventNotifier>>,
}

impl SyncCoordinator {
    /// Creates a coordinator expecting all three threads.
    pub fn new(config: &PacingConfig, recorder: Arc<dyn MarkerRecorder>) -> Self {
        Self::with_participants(config, Participants::ALL, recorder)
    }

    /// Creates a coordinator expecting only `participants` to check in.
    pub fn with_participants(
        config: &PacingConfig,
        participants: Participants,
        recorder: Arc<dyn MarkerRecorder>,
    ) -> Self {
        let state = SyncState {
            phase: Phase::Stopped,
            participants,
            checked_in: Participants::EMPTY,
            checked_out: Participants::EMPTY,
            vsyncs_per_render: config.vsyncs_per_render.max(1),
            pending_vsyncs_per_render: None,
            maximum_updates_ahead: config.maximum_updates_ahead.max(1),
            sleep_threshold: config.sleep_threshold,
            ticks_ahead_of_update: 0,
            updates_ahead_of_render: 0,
            update_in_flight: false,
            update_resuming: false,
            update_requested: false,
            update_once: false,
            idle_updates: 0,
            frame_counter: 0,
            ticks_observed: 0,
            renders_completed: 0,
            last_tick: None,
            frame_time: FrameTime::new(config.tick_period_us()),
        };
        Self {
            state: Mutex::new(state),
            signal: Condvar::new(),
            recorder,
            notifier: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, SyncState>) -> MutexGuard<'a, SyncState> {
        self.signal
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs the callback fired when an update reports that the event
    /// thread needs notifying.
    pub fn set_event_notifier<F>(&self, notifier: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.notifier.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(notifier));
    }

    fn notify_event_thread(&self) {
        let notifier = self
            .notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(notifier) = notifier {
            notifier();
        }
    }

    // -- Lifecycle -----------------------------------------------------------

    /// Moves from `Stopped` to `Initialising`.
    pub fn initialise(&self) {
        let mut state = self.lock();
        if state.phase == Phase::Stopped {
            state.phase = Phase::Initialising;
            self.signal.notify_all();
        }
    }

    /// Registers a participant thread as ready.
    pub fn check_in(&self, participant: Participants) {
        let mut state = self.lock();
        state.checked_in.insert(participant);
        log::debug!("{participant:?} checked in");
        self.signal.notify_all();
    }

    /// Registers a participant thread as finished.
    pub fn check_out(&self, participant: Participants) {
        let mut state = self.lock();
        state.checked_out.insert(participant);
        state.try_terminate();
        self.signal.notify_all();
    }

    /// Withdraws participants whose thread was never launched, so that
    /// termination does not wait for them.
    pub fn abandon(&self, participant: Participants) {
        let mut state = self.lock();
        state.participants.remove(participant);
        state.checked_in.remove(participant);
        state.try_terminate();
        self.signal.notify_all();
    }

    /// Waits for every participant to check in, then starts ticking.
    pub fn start(&self, timeout: Duration) -> PacingResult<()> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        if state.phase == Phase::Stopped {
            state.phase = Phase::Initialising;
        }
        loop {
            if state.phase.is_terminating() {
                return Err(PacingError::Stopped);
            }
            if state.checked_in.contains(state.participants) {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(PacingError::StartupTimeout(timeout));
            }
            state = self
                .signal
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        state.phase = Phase::Running;
        self.signal.notify_all();
        log::info!("Frame pacing started.");
        Ok(())
    }

    /// Requests termination. Every waiter returns at its next slot.
    pub fn stop(&self) {
        let mut state = self.lock();
        if state.phase.is_terminating() {
            return;
        }
        state.phase = Phase::Terminating;
        state.try_terminate();
        self.signal.notify_all();
        log::info!("Frame pacing stopping.");
    }

    /// Pauses ticking and updating. Returns `false` if not running.
    pub fn pause(&self) -> bool {
        {
            let mut state = self.lock();
            if !matches!(state.phase, Phase::Running | Phase::Sleeping) {
                return false;
            }
            state.phase = Phase::Paused;
            state.frame_time.suspend();
            self.signal.notify_all();
        }
        self.recorder.add_marker(MarkerKind::Paused);
        true
    }

    /// Resumes after [`pause`](Self::pause). Returns `false` if not paused.
    ///
    /// The first update after resuming runs without waiting for a tick.
    pub fn resume(&self) -> bool {
        {
            let mut state = self.lock();
            if state.phase != Phase::Paused {
                return false;
            }
            state.phase = Phase::Running;
            state.update_resuming = true;
            state.ticks_ahead_of_update = 0;
            state.idle_updates = 0;
            state.frame_time.resume();
            self.signal.notify_all();
        }
        self.recorder.add_marker(MarkerKind::Resumed);
        true
    }

    /// Asks for more updates, waking the core if it sleeps.
    pub fn update_request(&self) {
        let mut state = self.lock();
        state.update_requested = true;
        state.idle_updates = 0;
        if state.phase == Phase::Sleeping {
            state.wake_up();
        }
        self.signal.notify_all();
    }

    /// Runs exactly one update even while paused or sleeping.
    pub fn update_once(&self) {
        let mut state = self.lock();
        state.update_once = true;
        self.signal.notify_all();
    }

    /// Sets the number of ticks per render cycle, applied at the next tick.
    /// Zero is treated as one.
    pub fn set_render_refresh_rate(&self, vsyncs_per_render: u32) {
        let mut state = self.lock();
        state.pending_vsyncs_per_render = Some(vsyncs_per_render.max(1));
    }

    /// Forwards a marker to the recorder.
    pub fn add_performance_marker(&self, kind: MarkerKind) {
        self.recorder.add_marker(kind);
    }

    // -- Tick side -----------------------------------------------------------

    /// Called by the tick thread after each render cycle.
    ///
    /// Records the tick when `valid`, then blocks while ticking is suspended.
    /// On return `vsyncs_per_render` holds the cycle length to wait next.
    /// Returns `false` once terminating.
    pub fn await_next_tick_slot(
        &self,
        valid: bool,
        frame_number: u32,
        timestamp: FrameTimestamp,
        vsyncs_per_render: &mut u32,
    ) -> bool {
        let mut state = self.lock();
        if valid {
            state.frame_time.set_tick(frame_number, timestamp);
            state.last_tick = Some(timestamp);
            state.ticks_observed += 1;
            state.ticks_ahead_of_update = state.ticks_ahead_of_update.saturating_add(1);
            self.signal.notify_all();
        }

        while !state.phase.is_terminating() && state.phase != Phase::Running {
            state = self.wait(state);
        }
        if state.phase.is_terminating() {
            return false;
        }

        if let Some(vsyncs) = state.pending_vsyncs_per_render.take() {
            if vsyncs != state.vsyncs_per_render {
                log::debug!("Render cycle changed to {vsyncs} tick(s)");
            }
            state.vsyncs_per_render = vsyncs;
        }
        *vsyncs_per_render = state.vsyncs_per_render;
        true
    }

    // -- Update side ---------------------------------------------------------

    /// Called by the update thread before each unit of computation.
    ///
    /// `needs_notification` and `keep_computing` describe the unit that just
    /// finished. Returns the timing for the next unit, or `None` once
    /// terminating.
    pub fn await_update_slot(
        &self,
        needs_notification: bool,
        keep_computing: bool,
    ) -> Option<FrameTiming> {
        let timing = {
            let mut state = self.lock();

            if state.update_in_flight {
                state.update_in_flight = false;
                state.updates_ahead_of_render += 1;
                self.signal.notify_all();
            }

            while !state.phase.is_terminating()
                && state.updates_ahead_of_render >= state.maximum_updates_ahead
            {
                state = self.wait(state);
            }

            if keep_computing || state.update_requested {
                state.idle_updates = 0;
            } else if state.phase == Phase::Running && state.sleep_threshold > 0 {
                state.idle_updates += 1;
                if state.idle_updates >= state.sleep_threshold {
                    state.enter_sleep();
                }
            }
            state.update_requested = false;

            loop {
                if state.phase.is_terminating() {
                    break None;
                }
                match state.phase {
                    Phase::Running => {
                        if state.update_resuming {
                            state.update_resuming = false;
                            break Some(state.release_update());
                        }
                        if state.ticks_ahead_of_update > 0 {
                            state.ticks_ahead_of_update = 0;
                            break Some(state.release_update());
                        }
                    }
                    Phase::Paused | Phase::Sleeping if state.update_once => {
                        break Some(state.release_update());
                    }
                    _ => {}
                }
                state = self.wait(state);
            }
        };

        if needs_notification {
            self.notify_event_thread();
        }
        timing
    }

    // -- Render side ---------------------------------------------------------

    /// Called by the render thread before each frame. Blocks until a
    /// computed frame is available. Returns `false` once terminating.
    pub fn await_render_slot(&self) -> bool {
        let mut state = self.lock();
        loop {
            if state.phase.is_terminating() {
                return false;
            }
            if state.updates_ahead_of_render > 0 {
                state.updates_ahead_of_render -= 1;
                self.signal.notify_all();
                return true;
            }
            state = self.wait(state);
        }
    }

    /// Called by the render thread after each frame.
    pub fn render_finished(&self) {
        let mut state = self.lock();
        state.renders_completed += 1;
        self.signal.notify_all();
    }

    // -- Observers -----------------------------------------------------------

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Number of updates released so far.
    pub fn frame_counter(&self) -> u64 {
        self.lock().frame_counter
    }

    /// Number of valid ticks reported so far.
    pub fn ticks_observed(&self) -> u64 {
        self.lock().ticks_observed
    }

    /// Number of frames rendered so far.
    pub fn renders_completed(&self) -> u64 {
        self.lock().renders_completed
    }

    /// Computed frames not yet taken by the render thread.
    pub fn updates_ahead_of_render(&self) -> u32 {
        self.lock().updates_ahead_of_render
    }

    /// Current render cycle length in ticks.
    pub fn vsyncs_per_render(&self) -> u32 {
        self.lock().vsyncs_per_render
    }

    /// Timestamp of the latest valid tick.
    pub fn last_tick(&self) -> Option<FrameTimestamp> {
        self.lock().last_tick
    }

    /// Blocks until the phase is `Terminated` or `timeout` elapses.
    /// Returns `true` if terminated.
    pub fn wait_terminated(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .signal
            .wait_timeout_while(state, timeout, |s| s.phase != Phase::Terminated)
            .unwrap_or_else(PoisonError::into_inner);
        state.phase == Phase::Terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::telemetry::NoopMarkerRecorder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const SHORT: Duration = Duration::from_millis(50);

    fn coordinator(participants: Participants) -> Arc<SyncCoordinator> {
        Arc::new(SyncCoordinator::with_participants(
            &PacingConfig::default(),
            participants,
            Arc::new(NoopMarkerRecorder),
        ))
    }

    fn running(participants: Participants) -> Arc<SyncCoordinator> {
        running_with(&PacingConfig::default(), participants)
    }

    fn running_with(config: &PacingConfig, participants: Participants) -> Arc<SyncCoordinator> {
        let sync = Arc::new(SyncCoordinator::with_participants(
            config,
            participants,
            Arc::new(NoopMarkerRecorder),
        ));
        sync.initialise();
        for p in [Participants::TICK, Participants::UPDATE, Participants::RENDER] {
            if participants.contains(p) {
                sync.check_in(p);
            }
        }
        sync.start(SHORT).unwrap();
        sync
    }

    fn tick(sync: &SyncCoordinator, frame: u32) -> bool {
        let mut vsyncs = 0;
        sync.await_next_tick_slot(
            true,
            frame,
            FrameTimestamp::from_micros(u64::from(frame) * 16_667),
            &mut vsyncs,
        )
    }

    #[test]
    fn test_start_times_out_without_participants() {
        let sync = coordinator(Participants::ALL);
        sync.check_in(Participants::TICK);
        assert!(matches!(
            sync.start(SHORT),
            Err(PacingError::StartupTimeout(_))
        ));
        assert_eq!(sync.phase(), Phase::Initialising);
    }

    #[test]
    fn test_update_waits_for_tick() {
        let sync = running(Participants::TICK | Participants::UPDATE);
        let worker = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || sync.await_update_slot(false, true))
        };
        thread::sleep(SHORT);
        assert_eq!(sync.frame_counter(), 0, "No tick yet, no update");
        assert!(tick(&sync, 1));
        assert!(worker.join().unwrap().is_some());
        assert_eq!(sync.frame_counter(), 1);
    }

    #[test]
    fn test_one_update_per_tick_burst() {
        let sync = running(Participants::TICK | Participants::UPDATE);
        tick(&sync, 1);
        tick(&sync, 2);
        tick(&sync, 3);
        assert!(sync.await_update_slot(false, true).is_some());

        let worker = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || sync.await_update_slot(false, true))
        };
        thread::sleep(SHORT);
        assert_eq!(sync.frame_counter(), 1, "Queued ticks release one update only");
        sync.stop();
        assert!(worker.join().unwrap().is_none());
    }

    #[test]
    fn test_update_throttled_by_render() {
        let sync = running(Participants::TICK | Participants::UPDATE | Participants::RENDER);
        let max = PacingConfig::default().maximum_updates_ahead;
        // Complete `max` updates with no render consuming them.
        for frame in 1..=max {
            tick(&sync, frame);
            assert!(sync.await_update_slot(false, true).is_some());
        }
        tick(&sync, max + 1);
        let worker = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || sync.await_update_slot(false, true))
        };
        thread::sleep(SHORT);
        assert_eq!(sync.updates_ahead_of_render(), max);
        assert_eq!(u64::from(max), sync.frame_counter(), "Update must wait for render");

        assert!(sync.await_render_slot());
        sync.render_finished();
        assert!(worker.join().unwrap().is_some());
        assert_eq!(sync.frame_counter(), u64::from(max) + 1);
    }

    #[test]
    fn test_render_waits_for_update() {
        let sync = running(Participants::ALL);
        let worker = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || sync.await_render_slot())
        };
        thread::sleep(SHORT);
        tick(&sync, 1);
        sync.await_update_slot(false, true);
        // Completing the update happens at the next slot request.
        let updater = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || sync.await_update_slot(false, true))
        };
        assert!(worker.join().unwrap(), "Render released by completed update");
        sync.render_finished();
        assert_eq!(sync.renders_completed(), 1);
        sync.stop();
        assert!(updater.join().unwrap().is_none());
    }

    #[test]
    fn test_pause_suspends_tick_and_resume_releases_update() {
        let sync = running(Participants::TICK | Participants::UPDATE);
        assert!(sync.pause());
        assert!(!sync.pause(), "Already paused");

        let ticker = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || tick(&sync, 1))
        };
        let updater = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || sync.await_update_slot(false, true))
        };
        thread::sleep(SHORT);
        assert!(!ticker.is_finished(), "Tick thread must block while paused");
        assert_eq!(sync.frame_counter(), 0);

        assert!(sync.resume());
        assert!(ticker.join().unwrap());
        let timing = updater.join().unwrap().expect("released after resume");
        assert_eq!(timing.delta_seconds, 0.0);
    }

    #[test]
    fn test_update_once_while_paused() {
        let sync = running(Participants::TICK | Participants::UPDATE);
        sync.pause();
        let updater = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || sync.await_update_slot(false, true))
        };
        thread::sleep(SHORT);
        sync.update_once();
        assert!(updater.join().unwrap().is_some());
        assert_eq!(sync.phase(), Phase::Paused);
        assert_eq!(sync.frame_counter(), 1);
    }

    #[test]
    fn test_sleep_after_idle_updates_and_wake_on_request() {
        let config = PacingConfig {
            maximum_updates_ahead: 16,
            ..Default::default()
        };
        let sync = running_with(&config, Participants::TICK | Participants::UPDATE);
        let threshold = config.sleep_threshold;
        for frame in 1..threshold {
            tick(&sync, frame);
            assert!(sync.await_update_slot(false, false).is_some());
        }
        assert_eq!(sync.phase(), Phase::Running);

        let updater = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || sync.await_update_slot(false, false))
        };
        thread::sleep(SHORT);
        assert_eq!(sync.phase(), Phase::Sleeping);

        sync.update_request();
        assert_eq!(sync.phase(), Phase::Running);
        tick(&sync, 100);
        assert!(updater.join().unwrap().is_some());
    }

    #[test]
    fn test_render_refresh_rate_applied_at_next_tick() {
        let sync = running(Participants::TICK);
        sync.set_render_refresh_rate(0);
        let mut vsyncs = 0;
        assert!(sync.await_next_tick_slot(false, 0, FrameTimestamp::default(), &mut vsyncs));
        assert_eq!(vsyncs, 1, "Zero is clamped to one");
        sync.set_render_refresh_rate(3);
        assert!(sync.await_next_tick_slot(false, 0, FrameTimestamp::default(), &mut vsyncs));
        assert_eq!(vsyncs, 3);
        assert_eq!(sync.vsyncs_per_render(), 3);
    }

    #[test]
    fn test_stop_releases_every_waiter() {
        let sync = running(Participants::ALL);
        sync.pause();
        let handles = vec![
            {
                let sync = Arc::clone(&sync);
                thread::spawn(move || {
                    let ok = tick(&sync, 1);
                    sync.check_out(Participants::TICK);
                    ok
                })
            },
            {
                let sync = Arc::clone(&sync);
                thread::spawn(move || {
                    let ok = sync.await_update_slot(false, true).is_some();
                    sync.check_out(Participants::UPDATE);
                    ok
                })
            },
            {
                let sync = Arc::clone(&sync);
                thread::spawn(move || {
                    let ok = sync.await_render_slot();
                    sync.check_out(Participants::RENDER);
                    ok
                })
            },
        ];
        thread::sleep(SHORT);
        sync.stop();
        for handle in handles {
            assert!(!handle.join().unwrap(), "Waiters report termination");
        }
        assert!(sync.wait_terminated(Duration::from_secs(1)));
        assert!(!tick(&sync, 2), "No waiter blocks after stop");
        assert!(sync.await_update_slot(false, true).is_none());
        assert!(!sync.await_render_slot());
    }

    #[test]
    fn test_stop_before_check_in_waits_for_check_out() {
        let sync = coordinator(Participants::TICK);
        sync.initialise();
        sync.stop();
        assert_eq!(sync.phase(), Phase::Terminating);

        sync.check_in(Participants::TICK);
        assert_eq!(sync.phase(), Phase::Terminating);
        assert!(!sync.wait_terminated(SHORT));

        sync.check_out(Participants::TICK);
        assert_eq!(sync.phase(), Phase::Terminated);
    }

    #[test]
    fn test_abandoned_participant_not_awaited() {
        let sync = coordinator(Participants::ALL);
        sync.initialise();
        sync.check_in(Participants::TICK);
        sync.stop();
        sync.abandon(Participants::UPDATE | Participants::RENDER);
        assert_eq!(sync.phase(), Phase::Terminating, "Tick thread still alive");

        sync.check_out(Participants::TICK);
        assert!(sync.wait_terminated(SHORT));
    }

    #[test]
    fn test_event_notifier_fires_on_request() {
        let sync = running(Participants::TICK | Participants::UPDATE);
        let count = Arc::new(AtomicUsize::new(0));
        {
            let count = Arc::clone(&count);
            sync.set_event_notifier(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        tick(&sync, 1);
        sync.await_update_slot(false, true);
        tick(&sync, 2);
        sync.await_update_slot(true, true);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
