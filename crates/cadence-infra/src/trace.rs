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

//! A trace sink that appends marker lines to a file.

use anyhow::Context;
use cadence_core::telemetry::{Marker, TraceSink};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends `"<seconds>.<micros> <description>"` lines to a file.
///
/// Used as the kernel or system trace sink when no platform tracer exists.
/// Writes go through a shared `&File`, so concurrent callers must be
/// serialized by the fan-out.
#[derive(Debug)]
pub struct TraceFileSink {
    path: PathBuf,
    file: File,
}

impl TraceFileSink {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open trace file {}", path.display()))?;
        log::info!("Tracing markers to {}", path.display());
        Ok(Self { path, file })
    }

    /// Destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TraceSink for TraceFileSink {
    fn requires_external_serialization(&self) -> bool {
        true
    }

    fn trace(&self, marker: &Marker, description: &str) {
        let line = format!("{} {}\n", marker.timestamp, description);
        if let Err(e) = (&self.file).write_all(line.as_bytes()) {
            log::warn!("Failed to write trace line to {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::telemetry::{FrameTimestamp, MarkerKind};

    #[test]
    fn test_trace_lines_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.trace");
        let sink = TraceFileSink::open(&path).unwrap();
        assert!(sink.requires_external_serialization());

        let ts = FrameTimestamp::from_micros(1_500_000);
        sink.trace(&Marker::at(MarkerKind::TickEvent, ts), "TICK");
        sink.trace(&Marker::at(MarkerKind::RenderStart, ts), "RENDER_START");

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1.500000 TICK\n1.500000 RENDER_START\n");
    }
}
