//! Thin per-frame driver: clock, input, stepping, presentation.

use anyhow::Result;
use glam::Mat4;

use crate::{
    camera::Camera,
    frame::{Clock, FrameContext},
    params::SimulationParams,
    scene::Scene,
    stepper::{RunState, SceneStepper, StepReport},
};

pub const DEFAULT_ASPECT_RATIO: f32 = 800.0 / 600.0;

/// Consumer of the finished frame, normally the renderer.
///
/// Called once per frame after the update phase; it only ever sees
/// post-integration transformation matrices.
pub trait FrameSink {
    fn present(&mut self, view_projection: Mat4, scene: &Scene) -> Result<()>;
}

pub struct FrameLoop {
    scene: Scene,
    camera: Camera,
    context: FrameContext,
    stepper: SceneStepper,
    aspect_ratio: f32,
    frame_index: u64,
}

impl FrameLoop {
    pub fn new(scene: Scene, params: SimulationParams) -> Self {
        Self {
            scene,
            camera: Camera::default(),
            context: FrameContext::new(),
            stepper: SceneStepper::new(params),
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            frame_index: 0,
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Input callbacks and scripted signals write here between frames.
    pub fn context_mut(&mut self) -> &mut FrameContext {
        &mut self.context
    }

    pub fn run_frame<C: Clock, S: FrameSink>(
        &mut self,
        clock: &mut C,
        sink: &mut S,
    ) -> Result<StepReport> {
        self.context.advance(clock.now());
        self.camera.apply_input(&self.context);

        let report = self.stepper.step(&mut self.scene, &self.context);
        self.context.end_frame();

        let view_projection = self.camera.view_projection_matrix(self.aspect_ratio);
        sink.present(view_projection, &self.scene)?;

        self.frame_index += 1;
        Ok(report)
    }

    pub fn should_quit(&self) -> bool {
        self.context.quit_requested
    }

    pub fn params(&self) -> &SimulationParams {
        self.stepper.params()
    }

    pub fn state(&self) -> RunState {
        self.stepper.state()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
