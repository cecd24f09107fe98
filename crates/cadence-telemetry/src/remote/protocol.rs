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

//! The line-oriented command protocol spoken by network clients.

use super::error::{RemoteError, RemoteResult};

/// Reply to `help`.
pub const HELP_TEXT: &str = "\
help                           print this message\n\
set_marker_filter <bitmask>    select the marker families sent to this client\n\
dump_scene                     dump the scene graph as JSON\n\
set_properties|<id>;<property>;<value>|---|...  set node properties\n\
list_metrics                   list available metrics\n\
enable_metric <name>           enable a metric\n\
disable_metric <name>          disable a metric\n";

/// Reply to every metric command.
pub const METRICS_UNSUPPORTED: &str = "Metrics currently not supported";

/// Reply to anything that does not parse.
pub const INVALID_COMMAND: &str = "Command or parameter invalid, type help for list of commands";

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Print the command list.
    Help,
    /// Set node properties. Holds the full message for the property parser.
    SetProperties(String),
    /// Dump the scene graph.
    DumpScene,
    /// Select the marker families sent to this client.
    SetMarkerFilter(u32),
    /// List metrics.
    ListMetrics,
    /// Enable a metric.
    EnableMetric(String),
    /// Disable a metric.
    DisableMetric(String),
}

impl RemoteCommand {
    /// Parses one client message.
    pub fn parse(message: &str) -> RemoteResult<Self> {
        let message = message.trim();
        let name_end = message
            .find(|c: char| c.is_whitespace() || c == '|')
            .unwrap_or(message.len());
        let (name, rest) = message.split_at(name_end);
        let argument = rest.trim();

        match name {
            "help" => Ok(RemoteCommand::Help),
            "set_properties" | "set_property" => {
                Ok(RemoteCommand::SetProperties(message.to_string()))
            }
            "dump_scene" => Ok(RemoteCommand::DumpScene),
            "set_marker_filter" | "enable_time_marker" => parse_mask(argument)
                .map(RemoteCommand::SetMarkerFilter)
                .ok_or_else(|| invalid(name, "expected an integer bitmask")),
            "list_metrics" => Ok(RemoteCommand::ListMetrics),
            "enable_metric" | "disable_metric" if argument.is_empty() => {
                Err(invalid(name, "expected a metric name"))
            }
            "enable_metric" => Ok(RemoteCommand::EnableMetric(argument.to_string())),
            "disable_metric" => Ok(RemoteCommand::DisableMetric(argument.to_string())),
            other => Err(RemoteError::UnknownCommand(other.to_string())),
        }
    }
}

fn invalid(command: &str, reason: &str) -> RemoteError {
    RemoteError::InvalidParameter {
        command: command.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_mask(text: &str) -> Option<u32> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// `true` if the raw message came from an interactive console, which
/// terminates its commands with a newline.
pub fn is_console_message(raw: &[u8]) -> bool {
    raw.last() == Some(&b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(RemoteCommand::parse("help\n").unwrap(), RemoteCommand::Help);
        assert_eq!(
            RemoteCommand::parse("dump_scene").unwrap(),
            RemoteCommand::DumpScene
        );
        assert_eq!(
            RemoteCommand::parse("set_marker_filter 0x6").unwrap(),
            RemoteCommand::SetMarkerFilter(6)
        );
        assert_eq!(
            RemoteCommand::parse("enable_metric fps").unwrap(),
            RemoteCommand::EnableMetric("fps".into())
        );
        assert_eq!(
            RemoteCommand::parse("set_properties|1;opacity;0.5").unwrap(),
            RemoteCommand::SetProperties("set_properties|1;opacity;0.5".into())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RemoteCommand::parse("reboot"),
            Err(RemoteError::UnknownCommand(name)) if name == "reboot"
        ));
        assert!(matches!(
            RemoteCommand::parse("set_marker_filter lots"),
            Err(RemoteError::InvalidParameter { .. })
        ));
        assert!(matches!(
            RemoteCommand::parse("disable_metric"),
            Err(RemoteError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_console_detection() {
        assert!(is_console_message(b"help\n"));
        assert!(!is_console_message(b"help"));
        assert!(!is_console_message(b""));
    }
}
