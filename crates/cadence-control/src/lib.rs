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

//! # Cadence Control
//!
//! The frame-pacing core. Three long-lived threads meet at a
//! [`SyncCoordinator`]: the tick thread reports display ticks, the update
//! thread runs one unit of computation per render cycle, and the render
//! thread renders each computed frame. [`PacingCore`] spawns and owns them.

#![warn(missing_docs)]

pub mod error;
pub mod frame_time;
pub mod pacing;
pub mod render_driver;
pub mod sync;
pub mod tick_driver;
pub mod update_driver;
pub mod worker;

pub use error::{PacingError, PacingResult};
pub use frame_time::FrameTime;
pub use pacing::{PacingCore, PacingStages};
pub use render_driver::RenderDriver;
pub use sync::{Participants, Phase, SyncCoordinator};
pub use tick_driver::{HardwareTick, SoftwareTick, TickCycle, TickDriver, TickStrategy};
pub use update_driver::{FpsTracker, UpdateDriver};
pub use worker::WorkerHandle;
