//! Free-fly camera.
//!
//! Y-up, yaw/pitch in degrees. WASD-style movement along the view direction,
//! mouse look, scroll to change the field of view.

use glam::{Mat4, Vec3};

use crate::frame::FrameContext;

pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 50.0, 100.0);
const DEFAULT_YAW: f32 = -90.0;
const DEFAULT_PITCH: f32 = 0.0;
const DEFAULT_SPEED: f32 = 20.0;
const DEFAULT_SENSITIVITY: f32 = 0.25;
const DEFAULT_ZOOM: f32 = 45.0;
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;
const MAX_PITCH: f32 = 89.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1000.0;
const WORLD_UP: Vec3 = Vec3::Y;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    yaw: f32,
    pitch: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION)
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: WORLD_UP,
            right: Vec3::X,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        };
        camera.update_camera_vectors();
        camera
    }

    pub fn with_movement_speed(mut self, speed: f32) -> Self {
        self.movement_speed = speed;
        self
    }

    pub fn with_mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
        self.update_camera_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Applies everything the frame collected: held keys, mouse look, scroll.
    pub fn apply_input(&mut self, ctx: &FrameContext) {
        for movement in ctx.input.held_movements() {
            self.process_keyboard(movement, ctx.delta_time);
        }

        let mouse = ctx.input.mouse_offset();
        if mouse != glam::Vec2::ZERO {
            self.process_mouse_movement(mouse.x, mouse.y);
        }

        let scroll = ctx.input.scroll_offset();
        if scroll != 0.0 {
            self.process_mouse_scroll(scroll);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect_ratio, NEAR_PLANE, FAR_PLANE)
    }

    pub fn view_projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    pub fn view_projection_matrix_cols(&self, aspect_ratio: f32) -> [[f32; 4]; 4] {
        self.view_projection_matrix(aspect_ratio).to_cols_array_2d()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn update_camera_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();

        self.front = Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
