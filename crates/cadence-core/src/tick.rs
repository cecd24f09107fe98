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

//! The display-tick source contract.

use crate::telemetry::FrameTimestamp;
use std::fmt::{self, Display};

/// One hardware tick as reported by a [`TickSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSample {
    /// Monotonic tick sequence number from the hardware.
    pub sequence: u32,
    /// When the tick happened.
    pub timestamp: FrameTimestamp,
}

/// Result type for tick source operations.
pub type TickResult<T> = Result<T, TickError>;

/// Why a wait for a hardware tick did not produce a sample.
///
/// Every variant is recoverable: the tick driver times the cycle in software
/// and tries the hardware again on the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickError {
    /// The source has no usable hardware handle.
    Unavailable,
    /// The wait returned without a tick, for example after a timeout.
    Missed,
    /// The platform reported an error.
    Device(String),
}

impl Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickError::Unavailable => write!(f, "Tick hardware unavailable"),
            TickError::Missed => write!(f, "Tick wait returned without a tick"),
            TickError::Device(msg) => write!(f, "Tick device error: {msg}"),
        }
    }
}

impl std::error::Error for TickError {}

/// A source of display vertical-blank ticks.
///
/// The source is owned by the tick thread, so only `Send` is required.
pub trait TickSource: Send {
    /// Acquires the hardware handle. Returns `false` if no hardware is present.
    fn initialize(&mut self) -> bool;

    /// Whether the hardware can be used right now. Queried every cycle.
    fn use_hardware(&self) -> bool;

    /// Blocks until the next hardware tick.
    fn wait_for_tick(&mut self) -> TickResult<TickSample>;

    /// Releases the hardware handle.
    fn terminate(&mut self);
}
