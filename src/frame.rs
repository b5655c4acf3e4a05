//! Per-frame context owned by the frame-loop driver.
//!
//! Timing, held keys, mouse/scroll deltas and the begin/finish signals all
//! live here and are handed to the camera and the stepper by reference.

use std::time::Instant;

use glam::Vec2;

use crate::camera::CameraMovement;

/// Monotonic time source in seconds.
pub trait Clock {
    fn now(&mut self) -> f32;
}

/// Wall-clock seconds since the clock was created.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Returns `start`, `start + step`, `start + 2 * step`, ... on successive calls.
#[derive(Copy, Clone, Debug)]
pub struct FixedStepClock {
    start: f32,
    step: f32,
    ticks: u64,
}

impl FixedStepClock {
    pub fn new(start: f32, step: f32) -> Self {
        Self {
            start,
            step,
            ticks: 0,
        }
    }

    pub fn from_fps(fps: u32) -> Self {
        Self::new(0.0, 1.0 / fps.max(1) as f32)
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}

impl Clock for FixedStepClock {
    fn now(&mut self) -> f32 {
        // Multiply instead of accumulating so long runs don't drift.
        let now = self.start + self.step * self.ticks as f32;
        self.ticks += 1;
        now
    }
}

const MOVEMENT_COUNT: usize = 4;

fn movement_slot(movement: CameraMovement) -> usize {
    match movement {
        CameraMovement::Forward => 0,
        CameraMovement::Backward => 1,
        CameraMovement::Left => 2,
        CameraMovement::Right => 3,
    }
}

/// Keyboard and mouse state gathered between two frames.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: [bool; MOVEMENT_COUNT],
    last_cursor: Option<Vec2>,
    mouse_offset: Vec2,
    scroll_offset: f32,
}

impl InputState {
    pub fn set_held(&mut self, movement: CameraMovement, held: bool) {
        self.held[movement_slot(movement)] = held;
    }

    pub fn is_held(&self, movement: CameraMovement) -> bool {
        self.held[movement_slot(movement)]
    }

    pub fn held_movements(&self) -> impl Iterator<Item = CameraMovement> + '_ {
        [
            CameraMovement::Forward,
            CameraMovement::Backward,
            CameraMovement::Left,
            CameraMovement::Right,
        ]
        .into_iter()
        .filter(|movement| self.is_held(*movement))
    }

    /// Records a cursor position. The first sample only sets the reference
    /// point so the camera doesn't jump. Y is flipped: moving up is positive.
    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        if let Some(last) = self.last_cursor {
            self.mouse_offset += Vec2::new(position.x - last.x, last.y - position.y);
        }
        self.last_cursor = Some(position);
    }

    pub fn scrolled(&mut self, y_offset: f32) {
        self.scroll_offset += y_offset;
    }

    pub fn mouse_offset(&self) -> Vec2 {
        self.mouse_offset
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Drops the accumulated mouse and scroll deltas; held keys stay.
    pub fn clear_deltas(&mut self) {
        self.mouse_offset = Vec2::ZERO;
        self.scroll_offset = 0.0;
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameContext {
    pub now: f32,
    pub delta_time: f32,
    last_frame: Option<f32>,
    pub input: InputState,
    pub begin_requested: bool,
    pub finish_requested: bool,
    pub quit_requested: bool,
}

impl FrameContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new frame at `now`. The very first frame has a zero delta.
    pub fn advance(&mut self, now: f32) {
        self.delta_time = self.last_frame.map_or(0.0, |last| now - last);
        self.last_frame = Some(now);
        self.now = now;
    }

    pub fn request_begin(&mut self) {
        self.begin_requested = true;
    }

    pub fn request_finish(&mut self) {
        self.finish_requested = true;
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Clears the one-shot signals and input deltas once a frame is consumed.
    pub fn end_frame(&mut self) {
        self.begin_requested = false;
        self.finish_requested = false;
        self.input.clear_deltas();
    }
}
