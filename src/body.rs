//! Scene body: one of the spheres or the floor.
//!
//! Every body integrates against its own `last_time_updated` timestamp
//! instead of a shared frame delta. Static bodies never integrate and never
//! receive collision response, but still expose a valid model matrix.

use glam::{Mat4, Quat, Vec3};

/// Gravity applied to dynamic bodies when nothing else is configured.
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// A body taking part in the scene.
///
/// `transformation_matrix` is derived from position, orientation and scale
/// and is refreshed by every method that changes one of them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Body {
    position: Vec3,
    velocity: Vec3,
    orientation: Quat,
    radius: f32,
    scale: f32,
    is_dynamic: bool,
    last_time_updated: f32,
    transformation_matrix: Mat4,
}

impl Body {
    pub fn new_sphere(position: Vec3, radius: f32, scale: f32) -> Self {
        Self::new_body(position, radius, scale, true)
    }

    pub fn new_static(position: Vec3, radius: f32, scale: f32) -> Self {
        Self::new_body(position, radius, scale, false)
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        if self.is_dynamic {
            self.velocity = velocity;
        }
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self.refresh_transformation();
        self
    }

    fn new_body(position: Vec3, radius: f32, scale: f32, is_dynamic: bool) -> Self {
        let mut body = Self {
            position,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            radius,
            scale,
            is_dynamic,
            last_time_updated: 0.0,
            transformation_matrix: Mat4::IDENTITY,
        };
        body.refresh_transformation();
        body
    }

    /// Advances the body to `now` using the time elapsed since its last update.
    ///
    /// Velocity picks up `gravity * elapsed` first, then the position moves by
    /// the new velocity (semi-implicit Euler). Static bodies are left untouched.
    pub fn update_motion(&mut self, now: f32, gravity: Vec3) {
        if !self.is_dynamic {
            return;
        }

        let elapsed = now - self.last_time_updated;
        self.velocity += gravity * elapsed;
        self.position += self.velocity * elapsed;
        self.last_time_updated = now;
        self.refresh_transformation();
    }

    /// Integration for a body that was pushed off the ground this frame.
    ///
    /// Position moves by the velocity left by the contact before gravity is
    /// added, so a body whose downward speed was just reflected can't end the
    /// step below the surface it was clamped onto.
    pub fn update_motion_from_contact(&mut self, now: f32, gravity: Vec3) {
        if !self.is_dynamic {
            return;
        }

        let elapsed = now - self.last_time_updated;
        self.position += self.velocity * elapsed;
        self.velocity += gravity * elapsed;
        self.last_time_updated = now;
        self.refresh_transformation();
    }

    /// Resets the integration timestamp without moving the body.
    pub fn rebaseline(&mut self, now: f32) {
        self.last_time_updated = now;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.refresh_transformation();
    }

    /// Static bodies keep a zero velocity.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        if self.is_dynamic {
            self.velocity = velocity;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    pub fn last_time_updated(&self) -> f32 {
        self.last_time_updated
    }

    /// Height of the supporting surface when this body is used as ground.
    pub fn surface_y(&self) -> f32 {
        self.position.y
    }

    pub fn transformation_matrix(&self) -> Mat4 {
        self.transformation_matrix
    }

    fn refresh_transformation(&mut self) {
        self.transformation_matrix = Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.orientation,
            self.position,
        );
    }
}
