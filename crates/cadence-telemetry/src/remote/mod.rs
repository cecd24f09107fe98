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

//! Remote inspection and control of the scene.
//!
//! Client connections live on network I/O threads while the scene belongs to
//! the application's main thread. Requests therefore travel through a queue:
//! a [`RemoteHandle`] enqueues, and [`RemoteControlChannel::process_pending`]
//! applies them on the scene owner's thread.

mod channel;
mod dump;
mod error;
mod property;
pub mod protocol;

pub use channel::{ClientId, RemoteControlChannel, RemoteHandle, RemoteRequest, ResponseTransport};
pub use dump::{dump_scene, NodeDump};
pub use error::{RemoteError, RemoteResult};
pub use property::{
    apply_assignments, convert_value, parse_property_command, PropertyAssignment,
    MAX_PROPERTY_COMMAND_LENGTH,
};
