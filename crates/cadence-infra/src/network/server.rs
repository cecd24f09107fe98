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

use super::{client, NetworkServerConfig};
use anyhow::Context;
use cadence_core::telemetry::{Marker, MarkerFilter, MarkerKind, MarkerTransport};
use cadence_telemetry::remote::{ClientId, RemoteHandle, ResponseTransport};
use crossbeam_channel::{Sender, TrySendError};
use serde::Serialize;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

const LISTENER_THREAD_NAME: &str = "cadence-net-listener";

/// A marker as sent to non-console clients, one JSON object per line.
#[derive(Debug, Serialize)]
struct WireMarker<'a> {
    kind: MarkerKind,
    description: &'a str,
    seconds: u32,
    microseconds: u32,
}

struct ClientEntry {
    id: ClientId,
    outbound: Sender<String>,
    filter: MarkerFilter,
    console: bool,
}

/// State shared by the listener, every client thread, and marker producers.
pub(super) struct Shared {
    running: AtomicBool,
    clients: Mutex<Vec<ClientEntry>>,
    connected: AtomicUsize,
    next_client: AtomicU64,
    pub(super) remote: RemoteHandle,
    pub(super) config: NetworkServerConfig,
}

impl Shared {
    fn clients(&self) -> MutexGuard<'_, Vec<ClientEntry>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(super) fn next_client_id(&self) -> ClientId {
        self.next_client.fetch_add(1, Ordering::Relaxed)
    }

    pub(super) fn register(&self, id: ClientId, outbound: Sender<String>) {
        self.clients().push(ClientEntry {
            id,
            outbound,
            filter: MarkerFilter::ALL,
            console: false,
        });
        self.connected.fetch_add(1, Ordering::AcqRel);
    }

    pub(super) fn unregister(&self, id: ClientId) {
        let mut clients = self.clients();
        let before = clients.len();
        clients.retain(|c| c.id != id);
        if clients.len() != before {
            self.connected.fetch_sub(1, Ordering::AcqRel);
        }
    }

    pub(super) fn set_filter(&self, id: ClientId, filter: MarkerFilter) {
        if let Some(entry) = self.clients().iter_mut().find(|c| c.id == id) {
            log::debug!("Client {id} marker filter set to {filter:?}");
            entry.filter = filter;
        }
    }

    pub(super) fn set_console(&self, id: ClientId, console: bool) {
        if let Some(entry) = self.clients().iter_mut().find(|c| c.id == id) {
            entry.console = console;
        }
    }

    fn enqueue(entry: &ClientEntry, payload: String) -> bool {
        match entry.outbound.try_send(payload) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::trace!("Outbound queue of client {} full, dropping", entry.id);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    fn broadcast(&self, marker: &Marker, description: &str) {
        let family = marker.kind.filter();
        let mut json_line: Option<String> = None;
        for entry in self.clients().iter() {
            if !entry.filter.intersects(family) {
                continue;
            }
            let line = if entry.console {
                format!("{} (seconds), {}\n", marker.timestamp, description)
            } else {
                let json = json_line.get_or_insert_with(|| wire_line(marker, description));
                if json.is_empty() {
                    continue;
                }
                json.clone()
            };
            // Slow clients lose markers rather than stall the pacing threads.
            Self::enqueue(entry, line);
        }
    }
}

fn wire_line(marker: &Marker, description: &str) -> String {
    let wire = WireMarker {
        kind: marker.kind,
        description,
        seconds: marker.timestamp.seconds,
        microseconds: marker.timestamp.microseconds,
    };
    match serde_json::to_string(&wire) {
        Ok(mut line) => {
            line.push('\n');
            line
        }
        Err(e) => {
            log::warn!("Failed to serialize marker {:?}: {e}", marker.kind);
            String::new()
        }
    }
}

fn bind_first_free(config: &NetworkServerConfig) -> anyhow::Result<TcpListener> {
    let mut last_error: Option<io::Error> = None;
    for offset in 0..config.port_attempts.max(1) {
        let Some(port) = config.base_port.checked_add(offset) else {
            break;
        };
        match TcpListener::bind((config.bind_address, port)) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                log::debug!("Port {port} unavailable: {e}");
                last_error = Some(e);
            }
        }
    }
    let attempted = format!(
        "no free port in {}..{} on {}",
        config.base_port,
        config.base_port.saturating_add(config.port_attempts),
        config.bind_address
    );
    match last_error {
        Some(e) => Err(e).context(attempted),
        None => Err(anyhow::anyhow!(attempted)),
    }
}

fn accept_loop(listener: TcpListener, shared: Arc<Shared>) {
    log::info!("Network listener thread started.");
    let mut sessions: Vec<JoinHandle<()>> = Vec::new();
    while shared.is_running() {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Some(session) = client::spawn_session(stream, peer, &shared) {
                    sessions.push(session);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(shared.config.poll_interval);
            }
            Err(e) => {
                log::warn!("Failed to accept a network client: {e}");
                thread::sleep(shared.config.poll_interval);
            }
        }
        sessions.retain(|session| !session.is_finished());
    }
    for session in sessions {
        if session.join().is_err() {
            log::error!("A network client thread panicked");
        }
    }
    log::info!("Network listener thread stopped.");
}

/// TCP server streaming markers to remote clients and accepting scene
/// commands from them.
///
/// Binds the first free port among `base_port .. base_port + port_attempts`.
/// Scene requests are forwarded to the [`RemoteHandle`] given at start and
/// answered through [`ResponseTransport`].
pub struct NetworkPerformanceServer {
    shared: Arc<Shared>,
    local_addr: SocketAddr,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkPerformanceServer {
    /// Binds the listener and starts accepting clients.
    pub fn start(config: NetworkServerConfig, remote: RemoteHandle) -> anyhow::Result<Arc<Self>> {
        let listener = bind_first_free(&config)?;
        listener
            .set_nonblocking(true)
            .context("Failed to make the network listener non-blocking")?;
        let local_addr = listener
            .local_addr()
            .context("Failed to query the listener address")?;

        let shared = Arc::new(Shared {
            running: AtomicBool::new(true),
            clients: Mutex::new(Vec::new()),
            connected: AtomicUsize::new(0),
            next_client: AtomicU64::new(1),
            remote,
            config,
        });

        let accept_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(LISTENER_THREAD_NAME.to_string())
            .spawn(move || accept_loop(listener, accept_shared))
            .context("Failed to spawn the network listener thread")?;

        log::info!("Performance server listening on {local_addr}");
        Ok(Arc::new(Self {
            shared,
            local_addr,
            listener: Mutex::new(Some(handle)),
        }))
    }

    /// The bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The bound port.
    pub fn local_port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Number of connected clients.
    pub fn connected_clients(&self) -> usize {
        self.shared.connected.load(Ordering::Acquire)
    }

    /// Closes the listener and every client connection, then joins the
    /// I/O threads. Idempotent.
    pub fn stop(&self) {
        if !self.shared.running.swap(false, Ordering::AcqRel) {
            return;
        }
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Network listener thread panicked");
            }
        }
        log::info!("Performance server on {} stopped", self.local_addr);
    }
}

impl Drop for NetworkPerformanceServer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl MarkerTransport for NetworkPerformanceServer {
    fn is_connected(&self) -> bool {
        self.connected_clients() > 0
    }

    fn transmit(&self, marker: &Marker, description: &str) {
        self.shared.broadcast(marker, description);
    }
}

impl ResponseTransport for NetworkPerformanceServer {
    fn send_response(&self, client: ClientId, payload: &str) {
        let clients = self.shared.clients();
        let Some(entry) = clients.iter().find(|c| c.id == client) else {
            log::debug!("Dropping response for disconnected client {client}");
            return;
        };
        let mut payload = payload.to_string();
        if !payload.ends_with('\n') {
            payload.push('\n');
        }
        if !Shared::enqueue(entry, payload) {
            log::warn!("Response for client {client} dropped");
        }
    }
}
