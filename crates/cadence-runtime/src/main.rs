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

//! Runs the pacing core against a simulated display for a fixed time.
//!
//! Configuration comes from an optional JSON file, then `CADENCE_*`
//! environment variables. With network control enabled, clients can
//! connect (default port 3031), watch markers, dump the scene and move
//! the slider's `target` property.

mod demo;

use anyhow::Context;
use cadence_control::{PacingCore, PacingStages};
use cadence_core::config::CadenceConfig;
use cadence_core::telemetry::{MarkerKind, MarkerRecorder, TimestampOutput};
use cadence_core::tick::TickSource;
use cadence_infra::{
    IntervalTickSource, NetworkPerformanceServer, NetworkServerConfig, NullTickSource,
    TraceFileSink,
};
use cadence_telemetry::{PerformanceService, RemoteControlChannel, TelemetryFanout};
use clap::Parser;
use demo::{DemoScene, SettlingCompute, SharedMotion, TraceRender};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const MAIN_LOOP_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Parser, Debug)]
#[command(name = "cadence-runtime", version)]
struct Cli {
    /// JSON configuration file. Environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to run, in seconds.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,

    /// Move the slider to a new target this often, in seconds. 0 disables.
    #[arg(long, default_value_t = 3.0)]
    retarget_every: f32,

    /// Append markers to this file (selected by output bit 2).
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Run without a display tick, always timing in software.
    #[arg(long, default_value_t = false)]
    headless: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seconds: f32,
    ticks: u64,
    frames: u64,
    renders: u64,
    final_position: f32,
}

fn load_config(cli: &Cli) -> anyhow::Result<CadenceConfig> {
    let mut config = match &cli.config {
        Some(path) => CadenceConfig::from_file(path)?,
        None => CadenceConfig::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok());
    log::debug!("Effective configuration: {config:?}");
    Ok(config)
}

fn tick_source(cli: &Cli, config: &CadenceConfig) -> Option<Box<dyn TickSource>> {
    if cli.headless {
        Some(Box::new(NullTickSource))
    } else if config.pacing.use_hardware_tick {
        Some(Box::new(IntervalTickSource::from_hz(config.pacing.target_fps)))
    } else {
        None
    }
}

fn main() -> anyhow::Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let channel = RemoteControlChannel::new();
    let mut fanout = TelemetryFanout::new(TimestampOutput::from_bits_truncate(
        config.telemetry.timestamp_output,
    ));
    if let Some(path) = &cli.trace {
        fanout = fanout.with_kernel_trace(Arc::new(TraceFileSink::open(path)?));
    }
    let server = if config.telemetry.network_control {
        let server = NetworkPerformanceServer::start(
            NetworkServerConfig::from_telemetry(&config.telemetry),
            channel.handle(),
        )
        .context("Failed to start the performance server")?;
        fanout = fanout.with_network(server.clone());
        Some(server)
    } else {
        None
    };
    let service = Arc::new(PerformanceService::new(&config.telemetry, fanout));

    let motion = SharedMotion::default();
    let mut demo = DemoScene::new();
    let stages = PacingStages {
        tick_source: tick_source(&cli, &config),
        compute: Box::new(SettlingCompute::new(motion.clone(), Arc::clone(&service))),
        render: Box::new(TraceRender::new(motion.clone())),
    };
    let core = PacingCore::start(&config.pacing, stages, service.clone())?;

    let started = Instant::now();
    let run_for = Duration::from_secs_f32(cli.seconds.max(0.0));
    let retarget_every = Duration::from_secs_f32(cli.retarget_every.max(0.0));
    let mut last_retarget = started;
    let mut flip = false;

    while started.elapsed() < run_for {
        if let Some(server) = &server {
            service.add_marker(MarkerKind::EventProcessStart);
            let handled = channel.process_pending(&mut demo.scene, server.as_ref());
            service.add_marker(MarkerKind::EventProcessEnd);
            if handled > 0 {
                if let Some(target) = demo.target().filter(|t| *t != motion.target()) {
                    log::info!("Remote client moved the target to {target}");
                    motion.set_target(target);
                    core.update_request();
                }
            }
        }

        if !retarget_every.is_zero() && last_retarget.elapsed() >= retarget_every {
            last_retarget = Instant::now();
            flip = !flip;
            motion.set_target(if flip { 100.0 } else { 0.0 });
            core.update_request();
        }

        demo.publish(&motion);
        thread::sleep(MAIN_LOOP_INTERVAL);
    }

    let sync = Arc::clone(core.sync());
    core.stop()?;
    if let Some(server) = &server {
        server.stop();
    }

    let summary = RunSummary {
        seconds: started.elapsed().as_secs_f32(),
        ticks: sync.ticks_observed(),
        frames: sync.frame_counter(),
        renders: sync.renders_completed(),
        final_position: motion.position(),
    };
    log::info!("Run summary: {}", serde_json::to_string(&summary)?);
    Ok(())
}
