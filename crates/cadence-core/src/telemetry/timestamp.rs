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

//! Monotonic timestamps attached to every performance marker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

const MICROSECONDS_PER_SECOND: u64 = 1_000_000;

static CLOCK_EPOCH: OnceLock<Instant> = OnceLock::new();

fn clock_epoch() -> Instant {
    *CLOCK_EPOCH.get_or_init(Instant::now)
}

/// A point on the process-wide monotonic clock, split into whole seconds and
/// the microsecond remainder.
///
/// The epoch is fixed the first time any timestamp is taken, so values are
/// comparable across every thread of the process but carry no wall-clock
/// meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FrameTimestamp {
    /// Whole seconds since the clock epoch.
    pub seconds: u32,
    /// Microseconds past `seconds`, always below one million.
    pub microseconds: u32,
}

impl FrameTimestamp {
    /// Samples the monotonic clock.
    pub fn now() -> Self {
        Self::from_duration(clock_epoch().elapsed())
    }

    /// Builds a timestamp from an offset to the clock epoch.
    pub fn from_duration(offset: Duration) -> Self {
        Self {
            seconds: offset.as_secs() as u32,
            microseconds: offset.subsec_micros(),
        }
    }

    /// Builds a timestamp from a microsecond count.
    pub fn from_micros(micros: u64) -> Self {
        Self {
            seconds: (micros / MICROSECONDS_PER_SECOND) as u32,
            microseconds: (micros % MICROSECONDS_PER_SECOND) as u32,
        }
    }

    /// Total microseconds since the clock epoch.
    pub fn as_micros(&self) -> u64 {
        u64::from(self.seconds) * MICROSECONDS_PER_SECOND + u64::from(self.microseconds)
    }

    /// Microseconds elapsed from `earlier` to `self`, or zero if `earlier` is
    /// in fact later.
    pub fn micros_since(&self, earlier: FrameTimestamp) -> u64 {
        self.as_micros().saturating_sub(earlier.as_micros())
    }
}

impl fmt::Display for FrameTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.seconds, self.microseconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micros_split() {
        let ts = FrameTimestamp::from_micros(3_000_042);
        assert_eq!(ts.seconds, 3);
        assert_eq!(ts.microseconds, 42);
        assert_eq!(ts.as_micros(), 3_000_042);
    }

    #[test]
    fn test_display_pads_microseconds() {
        let ts = FrameTimestamp::from_micros(12_000_305);
        assert_eq!(ts.to_string(), "12.000305");
    }

    #[test]
    fn test_micros_since_saturates() {
        let a = FrameTimestamp::from_micros(1_500_000);
        let b = FrameTimestamp::from_micros(2_000_000);
        assert_eq!(b.micros_since(a), 500_000);
        assert_eq!(a.micros_since(b), 0);
    }

    #[test]
    fn test_now_is_monotonic() {
        let first = FrameTimestamp::now();
        std::thread::sleep(Duration::from_millis(2));
        let second = FrameTimestamp::now();
        assert!(second > first, "Clock should move forward");
    }
}
