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

use thiserror::Error;

/// Result type for remote control operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised while handling remote requests.
///
/// None of them close the connection: the offending message is dropped and
/// the client may keep sending.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// A property command exceeded the maximum message length.
    #[error("Message of {length} bytes exceeds the {max} byte limit")]
    MessageTooLong {
        /// Received length in bytes.
        length: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// The command name is not part of the protocol.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// A command parameter could not be parsed.
    #[error("Invalid parameter for '{command}': {reason}")]
    InvalidParameter {
        /// Command name.
        command: String,
        /// What was wrong.
        reason: String,
    },

    /// The scene dump could not be serialized.
    #[error("Scene serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request queue is full or its consumer is gone.
    #[error("Remote request queue unavailable")]
    QueueUnavailable,
}
