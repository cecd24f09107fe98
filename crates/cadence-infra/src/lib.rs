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

//! # Cadence Infra
//!
//! Concrete implementations of the contracts declared in `cadence-core`:
//! the TCP performance server, tick sources, an in-memory scene graph, and
//! trace-file sinks.

#![warn(missing_docs)]

pub mod network;
pub mod scene;
pub mod tick;
pub mod trace;

pub use network::{NetworkPerformanceServer, NetworkServerConfig};
pub use scene::MemoryScene;
pub use tick::{IntervalTickSource, NullTickSource};
pub use trace::TraceFileSink;
