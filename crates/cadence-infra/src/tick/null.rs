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

use cadence_core::tick::{TickError, TickResult, TickSample, TickSource};

/// A source for platforms without a display tick. Never initializes, so the
/// tick thread always times cycles in software.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTickSource;

impl TickSource for NullTickSource {
    fn initialize(&mut self) -> bool {
        false
    }

    fn use_hardware(&self) -> bool {
        false
    }

    fn wait_for_tick(&mut self) -> TickResult<TickSample> {
        Err(TickError::Unavailable)
    }

    fn terminate(&mut self) {}
}
