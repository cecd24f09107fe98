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

use super::dump::dump_scene;
use super::error::{RemoteError, RemoteResult};
use super::property::{apply_assignments, parse_property_command};
use cadence_core::scene::SceneGraph;
use crossbeam_channel::{Receiver, Sender, TrySendError};

/// Identifier of a connected network client.
pub type ClientId = u64;

/// A request waiting to be applied on the scene owner's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    /// Apply a property-set command.
    SetProperties {
        /// The raw command, including the leading command token.
        message: String,
    },
    /// Dump the scene and send it back to `client`.
    DumpScene {
        /// Requesting client.
        client: ClientId,
    },
}

/// Delivers responses back to the client that asked for them.
pub trait ResponseTransport {
    /// Sends `payload` to `client`. Unknown or closed clients are ignored.
    fn send_response(&self, client: ClientId, payload: &str);
}

/// Cloneable producer side of the request queue, handed to I/O threads.
#[derive(Debug, Clone)]
pub struct RemoteHandle {
    tx: Sender<RemoteRequest>,
}

impl RemoteHandle {
    /// Enqueues a request without blocking.
    pub fn submit(&self, request: RemoteRequest) -> RemoteResult<()> {
        self.tx.try_send(request).map_err(|e| {
            match e {
                TrySendError::Full(_) => log::warn!("Remote request queue full, dropping request"),
                TrySendError::Disconnected(_) => log::warn!("Remote request queue closed"),
            }
            RemoteError::QueueUnavailable
        })
    }
}

/// Queues remote requests from network threads and applies them to the scene.
///
/// Property writes applied here are not ordered with respect to statistics
/// flushes happening on the pacing threads.
#[derive(Debug)]
pub struct RemoteControlChannel {
    tx: Sender<RemoteRequest>,
    rx: Receiver<RemoteRequest>,
}

impl Default for RemoteControlChannel {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_QUEUE_CAPACITY)
    }
}

impl RemoteControlChannel {
    /// Requests buffered before new ones are dropped.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

    /// Creates a channel with the default queue capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel buffering at most `capacity` requests.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self { tx, rx }
    }

    /// A producer handle for I/O threads.
    pub fn handle(&self) -> RemoteHandle {
        RemoteHandle {
            tx: self.tx.clone(),
        }
    }

    /// Parses and applies a property command, returning how many properties
    /// were written.
    pub fn set_properties(scene: &mut dyn SceneGraph, message: &str) -> RemoteResult<usize> {
        let assignments = parse_property_command(message)?;
        Ok(apply_assignments(scene, &assignments))
    }

    /// Dumps the scene and hands the result to `transport`.
    pub fn dump(
        scene: &dyn SceneGraph,
        transport: &dyn ResponseTransport,
        client: ClientId,
    ) -> RemoteResult<()> {
        let payload = dump_scene(scene)?;
        transport.send_response(client, &payload);
        Ok(())
    }

    /// Applies every queued request. Returns how many were handled.
    ///
    /// Must be called on the thread that owns `scene`.
    pub fn process_pending(
        &self,
        scene: &mut dyn SceneGraph,
        transport: &dyn ResponseTransport,
    ) -> usize {
        let mut handled = 0;
        while let Ok(request) = self.rx.try_recv() {
            let result = match &request {
                RemoteRequest::SetProperties { message } => {
                    Self::set_properties(scene, message).map(|applied| {
                        log::debug!("Applied {applied} remote property assignment(s)");
                    })
                }
                RemoteRequest::DumpScene { client } => Self::dump(scene, transport, *client),
            };
            if let Err(e) = result {
                log::warn!("Remote request {request:?} failed: {e}");
            }
            handled += 1;
        }
        handled
    }
}
