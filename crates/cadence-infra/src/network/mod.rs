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

//! TCP transport for remote telemetry and scene control.
//!
//! One listener thread accepts clients; each client then gets its own I/O
//! thread which reads commands and drains a bounded outbound queue. Scene
//! requests never touch the scene from here: they are forwarded through a
//! [`RemoteHandle`](cadence_telemetry::RemoteHandle) to the scene owner.

mod client;
mod server;

pub use server::NetworkPerformanceServer;

use cadence_core::config::DEFAULT_NETWORK_PORT;
use cadence_core::TelemetryConfig;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Listener settings.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkServerConfig {
    /// Address to bind. Loopback unless explicitly widened.
    pub bind_address: IpAddr,
    /// First port tried.
    pub base_port: u16,
    /// Number of consecutive ports tried before giving up.
    pub port_attempts: u16,
    /// How long a client thread blocks in `read` before servicing its queue.
    pub poll_interval: Duration,
    /// Outbound messages buffered per client before new ones are dropped.
    pub outbound_capacity: usize,
}

impl Default for NetworkServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            base_port: DEFAULT_NETWORK_PORT,
            port_attempts: 10,
            poll_interval: Duration::from_millis(20),
            outbound_capacity: 1024,
        }
    }
}

impl NetworkServerConfig {
    /// Default settings on the port chosen by the telemetry configuration.
    pub fn from_telemetry(config: &TelemetryConfig) -> Self {
        Self {
            base_port: config.network_port,
            ..Self::default()
        }
    }
}
