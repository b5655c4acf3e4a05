use glam::Vec3;

use crate::{
    body::DEFAULT_GRAVITY,
    collision::{CollisionResolver, DEFAULT_GROUND_RESTITUTION, DEFAULT_SPHERE_RESTITUTION},
};

/// Tunables for one scene run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationParams {
    pub gravity: Vec3,
    pub ground_restitution: f32,
    pub sphere_restitution: f32,
}

impl SimulationParams {
    pub fn new() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            ground_restitution: DEFAULT_GROUND_RESTITUTION,
            sphere_restitution: DEFAULT_SPHERE_RESTITUTION,
        }
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_ground_restitution(mut self, restitution: f32) -> Self {
        self.ground_restitution = restitution;
        self
    }

    pub fn with_sphere_restitution(mut self, restitution: f32) -> Self {
        self.sphere_restitution = restitution;
        self
    }

    pub fn resolver(&self) -> CollisionResolver {
        CollisionResolver::new(self.ground_restitution, self.sphere_restitution)
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_carries_restitution() {
        let resolver = SimulationParams::default()
            .with_ground_restitution(0.3)
            .with_sphere_restitution(0.6)
            .resolver();
        assert_eq!(resolver.ground_restitution(), 0.3);
        assert_eq!(resolver.sphere_restitution(), 0.6);
    }

    #[test]
    fn test_defaults() {
        let params = SimulationParams::default();
        assert_eq!(params.gravity, Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(params.resolver(), CollisionResolver::default());
    }
}
