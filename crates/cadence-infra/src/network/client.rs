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

use super::server::Shared;
use cadence_core::telemetry::MarkerFilter;
use cadence_telemetry::remote::protocol::{
    is_console_message, RemoteCommand, HELP_TEXT, INVALID_COMMAND, METRICS_UNSUPPORTED,
};
use cadence_telemetry::remote::{ClientId, RemoteRequest};
use crossbeam_channel::Receiver;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

const READ_BUFFER_SIZE: usize = 4096;

/// Registers the client and starts its I/O thread.
pub(super) fn spawn_session(
    stream: TcpStream,
    peer: SocketAddr,
    shared: &Arc<Shared>,
) -> Option<JoinHandle<()>> {
    let configured = stream
        .set_nonblocking(false)
        .and_then(|()| stream.set_read_timeout(Some(shared.config.poll_interval)))
        .and_then(|()| stream.set_nodelay(true));
    if let Err(e) = configured {
        log::warn!("Rejecting client {peer}: {e}");
        return None;
    }

    let id = shared.next_client_id();
    let (tx, rx) = crossbeam_channel::bounded(shared.config.outbound_capacity.max(1));
    shared.register(id, tx);

    let session = ClientSession {
        id,
        stream,
        outbound: rx,
        shared: Arc::clone(shared),
    };
    match thread::Builder::new()
        .name(format!("cadence-net-client-{id}"))
        .spawn(move || session.run())
    {
        Ok(handle) => {
            log::info!("Client {id} connected from {peer}");
            Some(handle)
        }
        Err(e) => {
            shared.unregister(id);
            log::error!("Failed to spawn I/O thread for client {peer}: {e}");
            None
        }
    }
}

struct ClientSession {
    id: ClientId,
    stream: TcpStream,
    outbound: Receiver<String>,
    shared: Arc<Shared>,
}

impl ClientSession {
    fn run(mut self) {
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        while self.shared.is_running() {
            let result = match self.stream.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => self.handle_message(&buffer[..n]),
                Err(e) if is_timeout(&e) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = result.and_then(|()| self.flush_outbound()) {
                log::debug!("Client {} I/O failed: {e}", self.id);
                break;
            }
        }
        self.shared.unregister(self.id);
        log::info!("Client {} disconnected", self.id);
    }

    fn handle_message(&mut self, raw: &[u8]) -> io::Result<()> {
        let console = is_console_message(raw);
        self.shared.set_console(self.id, console);
        let text = String::from_utf8_lossy(raw);
        if console {
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                self.handle_command(line)?;
            }
            Ok(())
        } else {
            self.handle_command(text.trim_end_matches('\0'))
        }
    }

    fn handle_command(&mut self, message: &str) -> io::Result<()> {
        let reply = match RemoteCommand::parse(message) {
            Ok(RemoteCommand::Help) => Some(HELP_TEXT),
            Ok(RemoteCommand::SetProperties(message)) => {
                self.forward(RemoteRequest::SetProperties { message });
                None
            }
            Ok(RemoteCommand::DumpScene) => {
                self.forward(RemoteRequest::DumpScene { client: self.id });
                None
            }
            Ok(RemoteCommand::SetMarkerFilter(bits)) => {
                self.shared
                    .set_filter(self.id, MarkerFilter::from_bits_truncate(bits));
                None
            }
            Ok(
                RemoteCommand::ListMetrics
                | RemoteCommand::EnableMetric(_)
                | RemoteCommand::DisableMetric(_),
            ) => Some(METRICS_UNSUPPORTED),
            Err(e) => {
                log::debug!("Client {} sent an invalid command: {e}", self.id);
                Some(INVALID_COMMAND)
            }
        };
        match reply {
            Some(reply) => self.write_line(reply),
            None => Ok(()),
        }
    }

    fn forward(&self, request: RemoteRequest) {
        if let Err(e) = self.shared.remote.submit(request) {
            log::warn!("Client {} request dropped: {e}", self.id);
        }
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.stream.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.stream.write_all(b"\n")?;
        }
        Ok(())
    }

    fn flush_outbound(&mut self) -> io::Result<()> {
        while let Ok(payload) = self.outbound.try_recv() {
            self.stream.write_all(payload.as_bytes())?;
        }
        Ok(())
    }
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
