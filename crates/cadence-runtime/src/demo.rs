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

//! The demo application paced by the runtime: a value easing towards a
//! target that remote clients can move.

use cadence_core::compute::{ComputeStage, ComputeStatus, FrameTiming, KeepUpdating, RenderStage};
use cadence_core::scene::{NodeId, PropertyValue, SceneGraph};
use cadence_core::telemetry::MarkerKind;
use cadence_infra::MemoryScene;
use cadence_telemetry::{ContextId, PerformanceService};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Distance below which the motion snaps to its target and stops.
const SETTLE_EPSILON: f32 = 0.01;
/// Exponential approach rate, per second.
const APPROACH_RATE: f32 = 6.0;

#[derive(Debug, Default)]
struct Motion {
    position: f32,
    target: f32,
}

/// Motion state shared between the main thread and the pacing threads.
#[derive(Debug, Clone, Default)]
pub struct SharedMotion(Arc<Mutex<Motion>>);

impl SharedMotion {
    fn lock(&self) -> MutexGuard<'_, Motion> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn position(&self) -> f32 {
        self.lock().position
    }

    pub fn target(&self) -> f32 {
        self.lock().target
    }

    pub fn set_target(&self, target: f32) {
        self.lock().target = target;
    }
}

/// Eases the shared motion towards its target, timing each step in its own
/// statistics context.
pub struct SettlingCompute {
    motion: SharedMotion,
    service: Arc<PerformanceService>,
    context: ContextId,
}

impl SettlingCompute {
    pub fn new(motion: SharedMotion, service: Arc<PerformanceService>) -> Self {
        let context = service.add_context("Motion");
        Self {
            motion,
            service,
            context,
        }
    }
}

impl ComputeStage for SettlingCompute {
    fn compute(&mut self, timing: &FrameTiming) -> ComputeStatus {
        self.service
            .add_custom_marker(MarkerKind::CustomStart, self.context);
        let settled = {
            let mut motion = self.motion.lock();
            let remaining = motion.target - motion.position;
            if remaining.abs() < SETTLE_EPSILON {
                motion.position = motion.target;
                true
            } else {
                let step = 1.0 - (-APPROACH_RATE * timing.delta_seconds.max(0.0)).exp();
                motion.position += remaining * step;
                false
            }
        };
        self.service
            .add_custom_marker(MarkerKind::CustomEnd, self.context);

        ComputeStatus {
            keep_updating: if settled {
                KeepUpdating::EMPTY
            } else {
                KeepUpdating::ANIMATIONS_RUNNING
            },
            needs_notification: false,
        }
    }
}

impl Drop for SettlingCompute {
    fn drop(&mut self) {
        self.service.remove_context(self.context);
    }
}

/// Stands in for a renderer: samples the motion once per render cycle.
pub struct TraceRender {
    motion: SharedMotion,
}

impl TraceRender {
    pub fn new(motion: SharedMotion) -> Self {
        Self { motion }
    }
}

impl RenderStage for TraceRender {
    fn render(&mut self) {
        log::trace!("render at position {:.3}", self.motion.position());
    }
}

/// The remotely visible scene: a stage with one slider node.
#[derive(Debug)]
pub struct DemoScene {
    pub scene: MemoryScene,
    pub slider: NodeId,
}

impl Default for DemoScene {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoScene {
    pub fn new() -> Self {
        let mut scene = MemoryScene::new();
        let root = scene.add_root("stage");
        let slider = scene.add_child(root, "slider").unwrap_or(root);
        scene.define_property(slider, "target", PropertyValue::Float(0.0));
        scene.define_property(slider, "position", PropertyValue::Float(0.0));
        scene.define_property(slider, "color", PropertyValue::Vector4([1.0, 1.0, 1.0, 1.0]));
        Self { scene, slider }
    }

    /// The slider target, as last written by a remote client.
    pub fn target(&self) -> Option<f32> {
        match self.scene.property(self.slider, "target") {
            Some(PropertyValue::Float(target)) => Some(target),
            _ => None,
        }
    }

    /// Mirrors the motion into the scene so dumps show it.
    pub fn publish(&mut self, motion: &SharedMotion) {
        let slider = self.slider;
        self.scene
            .set_property(slider, "position", PropertyValue::Float(motion.position()));
        self.scene
            .set_property(slider, "target", PropertyValue::Float(motion.target()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::config::TelemetryConfig;
    use cadence_core::telemetry::TimestampOutput;
    use cadence_telemetry::TelemetryFanout;

    fn service() -> Arc<PerformanceService> {
        Arc::new(PerformanceService::new(
            &TelemetryConfig::default(),
            TelemetryFanout::new(TimestampOutput::EMPTY),
        ))
    }

    fn frame(delta_seconds: f32) -> FrameTiming {
        FrameTiming {
            delta_seconds,
            last_tick_ms: 0,
            next_tick_ms: 16,
        }
    }

    #[test]
    fn test_motion_settles_and_goes_idle() {
        let motion = SharedMotion::default();
        motion.set_target(10.0);
        let mut compute = SettlingCompute::new(motion.clone(), service());

        let mut idle_after = None;
        for n in 0..200 {
            if !compute.compute(&frame(1.0 / 60.0)).keep_computing() {
                idle_after = Some(n);
                break;
            }
        }
        assert!(idle_after.is_some());
        assert_eq!(motion.position(), 10.0);
    }

    #[test]
    fn test_first_frame_does_not_move() {
        let motion = SharedMotion::default();
        motion.set_target(1.0);
        let mut compute = SettlingCompute::new(motion.clone(), service());
        let status = compute.compute(&frame(0.0));
        assert_eq!(status.keep_updating, KeepUpdating::ANIMATIONS_RUNNING);
        assert_eq!(motion.position(), 0.0);
    }

    #[test]
    fn test_scene_mirrors_motion() {
        let motion = SharedMotion::default();
        motion.set_target(4.0);
        let mut demo = DemoScene::new();
        demo.publish(&motion);
        assert_eq!(demo.target(), Some(4.0));
        assert_eq!(
            demo.scene.property(demo.slider, "position"),
            Some(PropertyValue::Float(0.0))
        );
    }
}
