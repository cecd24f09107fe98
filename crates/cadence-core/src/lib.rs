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

//! # Cadence Core
//!
//! Foundational crate containing the traits, plain data types, and interface
//! contracts shared by the frame-pacing core and the telemetry pipeline.
//!
//! Nothing in here spawns threads or touches the network: the concrete
//! behaviour lives in `cadence-control`, `cadence-telemetry` and
//! `cadence-infra`.

#![warn(missing_docs)]

pub mod compute;
pub mod config;
pub mod scene;
pub mod telemetry;
pub mod tick;
pub mod utils;

pub use compute::{ComputeStage, ComputeStatus, FrameTiming, KeepUpdating, RenderStage};
pub use config::{CadenceConfig, PacingConfig, TelemetryConfig};
pub use telemetry::{FrameTimestamp, Marker, MarkerFilter, MarkerKind, MarkerRecorder};
pub use tick::{TickError, TickSample, TickSource};
