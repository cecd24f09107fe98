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

//! Configuration of the pacing core and the telemetry pipeline.
//!
//! Values come from a JSON file, from `CADENCE_*` environment variables, or
//! from both: [`CadenceConfig::apply_overrides`] layers environment values
//! over whatever was loaded first.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable names read by [`CadenceConfig::apply_overrides`].
pub mod env {
    /// Ticks per rendered frame.
    pub const VSYNCS_PER_RENDER: &str = "CADENCE_VSYNCS_PER_RENDER";
    /// Display refresh rate used by the software tick.
    pub const TARGET_FPS: &str = "CADENCE_TARGET_FPS";
    /// FPS tracking window in seconds.
    pub const FPS_TRACKING: &str = "CADENCE_FPS_TRACKING";
    /// File the tracked FPS is written to.
    pub const FPS_RECORD_PATH: &str = "CADENCE_FPS_RECORD_PATH";
    /// Frames between update status logs.
    pub const UPDATE_STATUS_INTERVAL: &str = "CADENCE_UPDATE_STATUS_INTERVAL";
    /// Statistics logging bitmask.
    pub const LOG_PERFORMANCE_STATS: &str = "CADENCE_LOG_PERFORMANCE_STATS";
    /// Statistics logging frequency in seconds.
    pub const LOG_PERFORMANCE_STATS_FREQUENCY: &str = "CADENCE_LOG_PERFORMANCE_STATS_FREQUENCY";
    /// Timestamp output bitmask.
    pub const PERFORMANCE_TIMESTAMP_OUTPUT: &str = "CADENCE_PERFORMANCE_TIMESTAMP_OUTPUT";
    /// Non-zero enables the network control server.
    pub const NETWORK_CONTROL: &str = "CADENCE_NETWORK_CONTROL";
}

/// Default statistics flush interval, in seconds.
pub const DEFAULT_STATISTICS_FREQUENCY_SECS: u32 = 2;

/// Default first port tried by the network control server.
pub const DEFAULT_NETWORK_PORT: u16 = 3031;

/// Frame pacing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Display refresh rate assumed by the software tick, in Hz.
    pub target_fps: u32,
    /// Number of display ticks per rendered frame. Zero is treated as one.
    pub vsyncs_per_render: u32,
    /// How many computed frames may wait for the render stage.
    pub maximum_updates_ahead: u32,
    /// Consecutive idle frames before the core goes to sleep.
    pub sleep_threshold: u32,
    /// Whether to use the hardware tick when one is available.
    pub use_hardware_tick: bool,
    /// FPS tracking window in seconds. Zero disables tracking.
    pub fps_tracking_seconds: f32,
    /// Where the tracked FPS is written, if anywhere.
    pub fps_record_path: Option<PathBuf>,
    /// Frames between update status logs. Zero disables them.
    pub update_status_log_frames: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            vsyncs_per_render: 1,
            maximum_updates_ahead: 2,
            sleep_threshold: 3,
            use_hardware_tick: true,
            fps_tracking_seconds: 0.0,
            fps_record_path: None,
            update_status_log_frames: 0,
        }
    }
}

impl PacingConfig {
    /// One display tick in microseconds, rounded (16667 at 60 Hz).
    pub fn tick_period_us(&self) -> u64 {
        let fps = u64::from(self.target_fps.max(1));
        (1_000_000 + fps / 2) / fps
    }
}

/// Telemetry parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Statistics logging bitmask (see `StatisticsMask`).
    pub statistics_mask: u32,
    /// Statistics flush interval in seconds. Zero selects the default.
    pub statistics_frequency_secs: u32,
    /// Timestamp output bitmask (see `TimestampOutput`).
    pub timestamp_output: u32,
    /// Whether the network control server runs.
    pub network_control: bool,
    /// First port tried by the network control server.
    pub network_port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            statistics_mask: 0,
            statistics_frequency_secs: DEFAULT_STATISTICS_FREQUENCY_SECS,
            timestamp_output: 0,
            network_control: false,
            network_port: DEFAULT_NETWORK_PORT,
        }
    }
}

/// Full configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Frame pacing.
    pub pacing: PacingConfig,
    /// Telemetry.
    pub telemetry: TelemetryConfig,
}

impl CadenceConfig {
    /// Parses a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Invalid cadence configuration")
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Writes the configuration as pretty JSON.
    pub fn to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write config file {}", path.as_ref().display()))
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Applies `CADENCE_*` overrides fetched through `lookup`.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let pacing = &mut self.pacing;
        override_parsed(&lookup, env::VSYNCS_PER_RENDER, &mut pacing.vsyncs_per_render);
        override_parsed(&lookup, env::TARGET_FPS, &mut pacing.target_fps);
        override_parsed(&lookup, env::FPS_TRACKING, &mut pacing.fps_tracking_seconds);
        override_parsed(
            &lookup,
            env::UPDATE_STATUS_INTERVAL,
            &mut pacing.update_status_log_frames,
        );
        if let Some(path) = lookup(env::FPS_RECORD_PATH).filter(|p| !p.is_empty()) {
            pacing.fps_record_path = Some(PathBuf::from(path));
        }

        let telemetry = &mut self.telemetry;
        override_parsed(&lookup, env::LOG_PERFORMANCE_STATS, &mut telemetry.statistics_mask);
        override_parsed(
            &lookup,
            env::LOG_PERFORMANCE_STATS_FREQUENCY,
            &mut telemetry.statistics_frequency_secs,
        );
        override_parsed(
            &lookup,
            env::PERFORMANCE_TIMESTAMP_OUTPUT,
            &mut telemetry.timestamp_output,
        );
        let mut network = u32::from(telemetry.network_control);
        override_parsed(&lookup, env::NETWORK_CONTROL, &mut network);
        telemetry.network_control = network != 0;
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => log::warn!("Ignoring {key}={raw:?}: not a valid value"),
        }
    }
}
