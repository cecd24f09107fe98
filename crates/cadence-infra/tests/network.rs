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

use cadence_core::scene::{PropertyValue, SceneGraph};
use cadence_core::telemetry::{FrameTimestamp, Marker, MarkerKind, MarkerTransport};
use cadence_infra::{MemoryScene, NetworkPerformanceServer, NetworkServerConfig};
use cadence_telemetry::remote::protocol::{HELP_TEXT, INVALID_COMMAND, METRICS_UNSUPPORTED};
use cadence_telemetry::RemoteControlChannel;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const DEADLINE: Duration = Duration::from_secs(5);

fn start_server() -> (Arc<NetworkPerformanceServer>, RemoteControlChannel) {
    let channel = RemoteControlChannel::new();
    let config = NetworkServerConfig {
        base_port: 0,
        port_attempts: 1,
        ..NetworkServerConfig::default()
    };
    let server = NetworkPerformanceServer::start(config, channel.handle()).unwrap();
    (server, channel)
}

struct Client {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Client {
    fn connect(server: &NetworkPerformanceServer) -> Self {
        let writer = TcpStream::connect(server.local_addr()).unwrap();
        writer.set_read_timeout(Some(DEADLINE)).unwrap();
        let reader = BufReader::new(writer.try_clone().unwrap());
        Self { writer, reader }
    }

    fn send(&mut self, message: &str) {
        self.writer.write_all(message.as_bytes()).unwrap();
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        line.trim_end_matches('\n').to_string()
    }

    /// Reads the full help reply, which doubles as a barrier for earlier commands.
    fn read_help(&mut self) {
        for expected in HELP_TEXT.lines() {
            assert_eq!(self.read_line(), expected);
        }
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let start = Instant::now();
    while !condition() {
        assert!(start.elapsed() < DEADLINE, "condition not reached in time");
        thread::sleep(Duration::from_millis(5));
    }
}

fn at(kind: MarkerKind) -> Marker {
    Marker::at(kind, FrameTimestamp::from_micros(1_500_000))
}

#[test]
fn test_help_and_error_replies() {
    let (server, _channel) = start_server();
    let mut client = Client::connect(&server);

    client.send("help\n");
    client.read_help();

    client.send("fly_away\n");
    assert_eq!(client.read_line(), INVALID_COMMAND);

    client.send("set_marker_filter banana\n");
    assert_eq!(client.read_line(), INVALID_COMMAND);

    client.send("list_metrics\n");
    assert_eq!(client.read_line(), METRICS_UNSUPPORTED);
    client.send("enable_metric fps\n");
    assert_eq!(client.read_line(), METRICS_UNSUPPORTED);

    server.stop();
}

#[test]
fn test_console_client_receives_filtered_markers() {
    let (server, _channel) = start_server();
    let mut client = Client::connect(&server);
    wait_until(|| server.is_connected());

    client.send("set_marker_filter 4\n");
    client.send("help\n");
    client.read_help();

    server.transmit(&at(MarkerKind::TickEvent), "TICK");
    server.transmit(&at(MarkerKind::RenderStart), "RENDER_START");
    assert_eq!(client.read_line(), "1.500000 (seconds), RENDER_START");
}

#[test]
fn test_raw_client_receives_json_markers() {
    let (server, _channel) = start_server();
    let mut client = Client::connect(&server);

    client.send("help");
    client.read_help();

    server.transmit(&at(MarkerKind::ComputeEnd), "COMPUTE_END");
    let json: serde_json::Value = serde_json::from_str(&client.read_line()).unwrap();
    assert_eq!(json["kind"], "COMPUTE_END");
    assert_eq!(json["description"], "COMPUTE_END");
    assert_eq!(json["seconds"], 1);
    assert_eq!(json["microseconds"], 500_000);
}

#[test]
fn test_scene_requests_are_applied_by_the_owner() {
    let (server, channel) = start_server();
    let mut scene = MemoryScene::new();
    let root = scene.add_root("stage");
    let panel = scene.add_child(root, "panel").unwrap();
    scene.define_property(panel, "opacity", PropertyValue::Float(1.0));

    let mut client = Client::connect(&server);
    client.send(&format!("set_properties|{panel};opacity;0.25|---|{panel};visible;false"));
    wait_until(|| channel.process_pending(&mut scene, server.as_ref()) > 0);
    assert_eq!(scene.property(panel, "opacity"), Some(PropertyValue::Float(0.25)));
    assert!(!scene.node_info(panel).unwrap().visible);

    client.send("dump_scene\n");
    wait_until(|| channel.process_pending(&mut scene, server.as_ref()) > 0);
    let length: usize = client.read_line().parse().unwrap();
    let body = client.read_line();
    assert_eq!(body.len(), length);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["Name"], "stage");
    assert_eq!(json["children"][0]["IsVisible"], false);
}

#[test]
fn test_disconnect_is_tracked() {
    let (server, _channel) = start_server();
    let client = Client::connect(&server);
    wait_until(|| server.connected_clients() == 1);

    drop(client);
    wait_until(|| server.connected_clients() == 0);
    assert!(!server.is_connected());
    server.transmit(&at(MarkerKind::TickEvent), "TICK");
}

#[test]
fn test_next_port_used_when_base_is_taken() {
    let blocker = TcpListener::bind("127.0.0.1:0").unwrap();
    let taken = blocker.local_addr().unwrap().port();
    let config = NetworkServerConfig {
        base_port: taken,
        ..NetworkServerConfig::default()
    };
    let server = NetworkPerformanceServer::start(config, RemoteControlChannel::new().handle());
    let server = server.unwrap();
    assert_ne!(server.local_port(), taken);
    assert!(server.local_port() > taken && server.local_port() - taken < 10);
}
