//! Pairwise collision detection and response.
//!
//! Two detection kinds exist: a dynamic sphere against the floor, and two
//! spheres against each other. A pair that does not overlap is never
//! touched, so calling the resolver on a separated pair is a no-op.

use glam::Vec3;

use crate::body::Body;

/// Normal used when two sphere centers coincide.
pub const FALLBACK_NORMAL: Vec3 = Vec3::Y;

pub const DEFAULT_GROUND_RESTITUTION: f32 = 0.8;
pub const DEFAULT_SPHERE_RESTITUTION: f32 = 1.0;

const DEGENERATE_DISTANCE: f32 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DetectionKind {
    /// First body is dynamic, second is the floor.
    Ground,
    /// Sphere against sphere.
    Sphere,
}

/// Resolved collision. `normal` points from the first body toward the second
/// (straight up for the floor), `penetration` is the overlap that was removed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    pub kind: DetectionKind,
    pub normal: Vec3,
    pub penetration: f32,
    pub point: Vec3,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionResolver {
    ground_restitution: f32,
    sphere_restitution: f32,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_GROUND_RESTITUTION, DEFAULT_SPHERE_RESTITUTION)
    }
}

impl CollisionResolver {
    pub fn new(ground_restitution: f32, sphere_restitution: f32) -> Self {
        Self {
            ground_restitution,
            sphere_restitution,
        }
    }

    pub fn ground_restitution(&self) -> f32 {
        self.ground_restitution
    }

    pub fn sphere_restitution(&self) -> f32 {
        self.sphere_restitution
    }

    /// Detects and resolves a collision between `a` and `b`.
    ///
    /// For [`DetectionKind::Ground`], `a` is the dynamic body and `b` the
    /// floor; the floor is only read. Returns `None` and leaves both bodies
    /// unchanged when they do not overlap.
    pub fn collision_detect(
        &self,
        a: &mut Body,
        b: &mut Body,
        kind: DetectionKind,
    ) -> Option<Contact> {
        match kind {
            DetectionKind::Ground => self.resolve_ground(a, b),
            DetectionKind::Sphere => self.resolve_spheres(a, b),
        }
    }

    fn resolve_ground(&self, body: &mut Body, ground: &Body) -> Option<Contact> {
        if !body.is_dynamic() {
            return None;
        }

        let surface_y = ground.surface_y();
        let penetration = surface_y - (body.position().y - body.radius());
        // Also rejects NaN.
        if !(penetration >= 0.0) {
            return None;
        }

        let mut resting = body.position();
        resting.y = surface_y + body.radius();
        body.set_position(resting);

        let mut velocity = body.velocity();
        if velocity.y < 0.0 {
            velocity.y = -velocity.y * self.ground_restitution;
            body.set_velocity(velocity);
        }

        Some(Contact {
            kind: DetectionKind::Ground,
            normal: Vec3::Y,
            penetration,
            point: Vec3::new(resting.x, surface_y, resting.z),
        })
    }

    fn resolve_spheres(&self, a: &mut Body, b: &mut Body) -> Option<Contact> {
        let offset = b.position() - a.position();
        let distance = offset.length();
        let combined_radius = a.radius() + b.radius();
        if !(distance <= combined_radius) {
            return None;
        }

        let (share_a, share_b) = match (a.is_dynamic(), b.is_dynamic()) {
            (true, true) => (0.5, 0.5),
            (true, false) => (1.0, 0.0),
            (false, true) => (0.0, 1.0),
            (false, false) => return None,
        };

        let normal = if distance > DEGENERATE_DISTANCE {
            offset / distance
        } else {
            FALLBACK_NORMAL
        };
        let penetration = combined_radius - distance;

        if penetration > 0.0 {
            if share_a > 0.0 {
                a.set_position(a.position() - normal * (penetration * share_a));
            }
            if share_b > 0.0 {
                b.set_position(b.position() + normal * (penetration * share_b));
            }
        }

        a.set_velocity(reflect_approaching(a.velocity(), normal, self.sphere_restitution));
        b.set_velocity(reflect_approaching(b.velocity(), -normal, self.sphere_restitution));

        Some(Contact {
            kind: DetectionKind::Sphere,
            normal,
            penetration,
            point: a.position() + normal * a.radius(),
        })
    }
}

/// Flips the part of `velocity` heading along `toward`, scaled by
/// `restitution`. Velocity already moving away is kept as is.
fn reflect_approaching(velocity: Vec3, toward: Vec3, restitution: f32) -> Vec3 {
    let normal_speed = velocity.dot(toward);
    if normal_speed > 0.0 {
        velocity - toward * (normal_speed * (1.0 + restitution))
    } else {
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_keeps_tangential_part() {
        let velocity = reflect_approaching(Vec3::new(3.0, 4.0, 0.0), Vec3::X, 1.0);
        assert_eq!(velocity, Vec3::new(-3.0, 4.0, 0.0));
    }

    #[test]
    fn test_reflect_ignores_separating_velocity() {
        let velocity = reflect_approaching(Vec3::new(-3.0, 4.0, 0.0), Vec3::X, 1.0);
        assert_eq!(velocity, Vec3::new(-3.0, 4.0, 0.0));
    }

    #[test]
    fn test_static_pair_is_ignored() {
        let resolver = CollisionResolver::default();
        let mut a = Body::new_static(Vec3::ZERO, 1.0, 1.0);
        let mut b = Body::new_static(Vec3::X, 1.0, 1.0);
        assert!(resolver
            .collision_detect(&mut a, &mut b, DetectionKind::Sphere)
            .is_none());
        assert_eq!(b.position(), Vec3::X);
    }

    #[test]
    fn test_coincident_centers_use_fallback_normal() {
        let resolver = CollisionResolver::default();
        let mut a = Body::new_sphere(Vec3::ZERO, 1.0, 1.0);
        let mut b = Body::new_sphere(Vec3::ZERO, 1.0, 1.0);

        let contact = resolver
            .collision_detect(&mut a, &mut b, DetectionKind::Sphere)
            .unwrap();

        assert_eq!(contact.normal, FALLBACK_NORMAL);
        assert_eq!(a.position(), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(b.position(), Vec3::new(0.0, 1.0, 0.0));
    }
}
