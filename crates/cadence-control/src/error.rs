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

//! Errors surfaced by the pacing core.

use std::time::Duration;
use thiserror::Error;

/// Result type for pacing operations.
pub type PacingResult<T> = Result<T, PacingError>;

/// Errors that reach the owner of the pacing core.
///
/// Only startup and shutdown can fail: everything that goes wrong while the
/// threads run is handled in place.
#[derive(Debug, Error)]
pub enum PacingError {
    /// The OS refused to create a thread.
    #[error("Failed to spawn thread '{name}'")]
    ThreadSpawn {
        /// Name of the thread.
        name: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A pacing thread panicked.
    #[error("Thread '{0}' panicked")]
    ThreadPanicked(String),

    /// The pacing threads did not all check in before the deadline.
    #[error("Pacing threads did not check in within {0:?}")]
    StartupTimeout(Duration),

    /// The core was stopped before it finished starting.
    #[error("Pacing core stopped during startup")]
    Stopped,
}
