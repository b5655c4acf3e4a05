//! Scene construction: the floor plus a fixed set of spheres.
//!
//! Configs are validated here, at the loader boundary. The stepper and the
//! collision resolver assume well-formed bodies and never check.

use anyhow::{bail, Context, Result};
use glam::{Quat, Vec3};

use crate::body::Body;

/// Collision radius of a regular sphere in the demo scene.
pub const RADIUS: f32 = 1.0;
pub const NUM_SPHERES: usize = 5;

/// Initial state of one body, as supplied by the asset loader.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyConfig {
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    pub radius: f32,
    pub scale: f32,
    pub is_dynamic: bool,
}

impl BodyConfig {
    pub fn sphere(position: Vec3, radius: f32, scale: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            radius,
            scale,
            is_dynamic: true,
        }
    }

    pub fn floor(surface_y: f32) -> Self {
        Self {
            position: Vec3::new(0.0, surface_y, 0.0),
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            radius: RADIUS,
            scale: 1.0,
            is_dynamic: false,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.position.is_finite() || !self.velocity.is_finite() {
            bail!("non-finite position or velocity: {:?}", self);
        }
        if !self.orientation.is_finite() || self.orientation.length_squared() == 0.0 {
            bail!("non-finite orientation: {:?}", self.orientation);
        }
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            bail!("radius must be positive and finite, got {}", self.radius);
        }
        if !(self.scale > 0.0) || !self.scale.is_finite() {
            bail!("scale must be positive and finite, got {}", self.scale);
        }
        Ok(())
    }

    fn into_body(self) -> Body {
        let body = if self.is_dynamic {
            Body::new_sphere(self.position, self.radius, self.scale)
        } else {
            Body::new_static(self.position, self.radius, self.scale)
        };
        body.with_velocity(self.velocity)
            .with_orientation(self.orientation.normalize())
    }
}

/// The floor and every sphere, alive for the whole run.
#[derive(Clone, Debug)]
pub struct Scene {
    pub floor: Body,
    pub spheres: Vec<Body>,
}

impl Scene {
    /// Floor first, then the spheres in index order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        std::iter::once(&self.floor).chain(self.spheres.iter())
    }

    pub fn body_count(&self) -> usize {
        1 + self.spheres.len()
    }
}

/// Layout for a grid of falling spheres, used for benchmarks and stress runs.
pub struct GridConfig {
    pub grid_size: usize,
    pub spacing: f32,
    pub initial_height: f32,
    pub sphere_radius: f32,
    pub add_small_velocity: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_size: 3,
            spacing: 2.5,
            initial_height: 10.0,
            sphere_radius: 0.5,
            add_small_velocity: true,
        }
    }
}

pub struct SceneBuilder;

impl SceneBuilder {
    pub fn build(floor: BodyConfig, spheres: &[BodyConfig]) -> Result<Scene> {
        floor.validate().context("invalid floor config")?;
        if floor.is_dynamic {
            bail!("the floor must be static");
        }

        let spheres = spheres
            .iter()
            .enumerate()
            .map(|(index, config)| {
                config
                    .validate()
                    .with_context(|| format!("invalid config for sphere {}", index))?;
                Ok(config.into_body())
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!("Built scene with {} spheres", spheres.len());

        Ok(Scene {
            floor: floor.into_body(),
            spheres,
        })
    }

    /// Initial state of the five demo spheres.
    pub fn default_sphere_configs() -> Vec<BodyConfig> {
        vec![
            BodyConfig::sphere(Vec3::new(0.0, 30.8, 5.0), RADIUS, 1.0),
            BodyConfig::sphere(Vec3::new(0.0, 44.8, 2.0), RADIUS, 2.0),
            BodyConfig::sphere(Vec3::new(0.0, 84.8, 5.0), RADIUS, 2.0)
                .with_velocity(Vec3::new(10.0, 10.0, 10.0)),
            BodyConfig::sphere(Vec3::new(30.0, 84.8, 30.0), RADIUS * 2.0, 8.0)
                .with_velocity(Vec3::new(-10.0, 10.0, -10.0)),
            BodyConfig::sphere(Vec3::new(10.0, 20.8, 50.0), RADIUS, 1.0)
                .with_velocity(Vec3::new(-10.0, 10.0, -10.0)),
        ]
    }

    pub fn default_scene() -> Result<Scene> {
        Self::build(BodyConfig::floor(0.0), &Self::default_sphere_configs())
    }

    pub fn create_sphere_grid(config: GridConfig) -> Result<Scene> {
        let offset = (config.grid_size as f32 - 1.0) * config.spacing / 2.0;
        let mut spheres = Vec::with_capacity(config.grid_size * config.grid_size);

        for i in 0..config.grid_size {
            for j in 0..config.grid_size {
                let x = i as f32 * config.spacing - offset;
                let z = j as f32 * config.spacing - offset;
                let mut sphere = BodyConfig::sphere(
                    Vec3::new(x, config.initial_height, z),
                    config.sphere_radius,
                    1.0,
                );

                if config.add_small_velocity {
                    // Deterministic spread so the spheres don't stack perfectly.
                    sphere.velocity.x = (i as f32 - config.grid_size as f32 / 2.0) * 0.1;
                    sphere.velocity.z = (j as f32 - config.grid_size as f32 / 2.0) * 0.1;
                }

                spheres.push(sphere);
            }
        }

        Self::build(BodyConfig::floor(0.0), &spheres)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene_layout() {
        let scene = SceneBuilder::default_scene().unwrap();
        assert_eq!(scene.spheres.len(), NUM_SPHERES);
        assert_eq!(scene.body_count(), NUM_SPHERES + 1);
        assert!(!scene.floor.is_dynamic());
        assert!(scene.spheres.iter().all(|s| s.is_dynamic()));
        assert_eq!(scene.spheres[3].radius(), RADIUS * 2.0);
        assert_eq!(scene.spheres[3].scale(), 8.0);
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let bad = BodyConfig::sphere(Vec3::ZERO, 0.0, 1.0);
        let err = SceneBuilder::build(BodyConfig::floor(0.0), &[bad]).unwrap_err();
        assert!(format!("{:#}", err).contains("sphere 0"));
    }

    #[test]
    fn test_rejects_dynamic_floor() {
        let mut floor = BodyConfig::floor(0.0);
        floor.is_dynamic = true;
        assert!(SceneBuilder::build(floor, &[]).is_err());
    }

    #[test]
    fn test_sphere_grid() {
        let scene = SceneBuilder::create_sphere_grid(GridConfig::default()).unwrap();
        assert_eq!(scene.spheres.len(), 9);
    }
}
