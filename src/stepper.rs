//! Per-frame scene update.
//!
//! Every running frame is two phases in a fixed order:
//! 1. resolve collisions on the positions left by the previous frame
//!    (sphere `i` against the floor, then `i` against every `j > i`);
//! 2. integrate every dynamic body to the frame time.
//!
//! Detection never sees positions integrated in the same frame, and the
//! pair order is stable so runs are reproducible. A sphere that hit the
//! floor this frame moves by its corrected velocity before gravity is
//! applied, so it ends the step on or above the surface.

use crate::{
    collision::{CollisionResolver, Contact, DetectionKind},
    frame::FrameContext,
    params::SimulationParams,
    scene::Scene,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
    Done,
}

/// Which bodies a contact belongs to, by index into `Scene::spheres`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContactPair {
    Ground { sphere: usize },
    Spheres { a: usize, b: usize },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameContact {
    pub pair: ContactPair,
    pub contact: Contact,
}

/// What one call to [`SceneStepper::step`] did.
#[derive(Clone, Debug, Default)]
pub struct StepReport {
    pub state: RunState,
    pub integrated: bool,
    pub contacts: Vec<FrameContact>,
}

impl StepReport {
    fn idle(state: RunState) -> Self {
        Self {
            state,
            integrated: false,
            contacts: Vec::new(),
        }
    }
}

pub struct SceneStepper {
    state: RunState,
    params: SimulationParams,
    resolver: CollisionResolver,
}

impl SceneStepper {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            state: RunState::NotStarted,
            resolver: params.resolver(),
            params,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Moves `NotStarted -> Running` and re-baselines every dynamic body to
    /// `now`, so time spent waiting doesn't turn into one huge first step.
    /// Returns `false` if the scene had already started.
    pub fn begin(&mut self, scene: &mut Scene, now: f32) -> bool {
        if self.state != RunState::NotStarted {
            return false;
        }

        for sphere in scene.spheres.iter_mut().filter(|s| s.is_dynamic()) {
            sphere.rebaseline(now);
        }
        self.state = RunState::Running;
        log::info!("Scene running at t={:.3}s", now);
        true
    }

    /// Moves `Running -> Done`. `Done` is permanent.
    pub fn finish(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }

        self.state = RunState::Done;
        log::info!("Scene done");
        true
    }

    /// Runs one frame. Does nothing unless the scene is running after the
    /// frame's begin/finish signals have been applied.
    pub fn step(&mut self, scene: &mut Scene, ctx: &FrameContext) -> StepReport {
        match self.state {
            RunState::NotStarted if ctx.begin_requested => {
                self.begin(scene, ctx.now);
            }
            RunState::Running if ctx.finish_requested => {
                self.finish();
            }
            _ => {}
        }

        if self.state != RunState::Running {
            return StepReport::idle(self.state);
        }

        let contacts = self.resolve_collisions(scene);
        self.integrate(scene, &contacts, ctx.now);

        StepReport {
            state: self.state,
            integrated: true,
            contacts,
        }
    }

    fn resolve_collisions(&self, scene: &mut Scene) -> Vec<FrameContact> {
        let Scene { floor, spheres } = scene;
        let mut contacts = Vec::new();

        for i in 0..spheres.len() {
            let (head, tail) = spheres.split_at_mut(i + 1);
            let sphere = &mut head[i];

            if let Some(contact) = self
                .resolver
                .collision_detect(sphere, floor, DetectionKind::Ground)
            {
                log::debug!("sphere {} hit the floor: {:?}", i, contact);
                contacts.push(FrameContact {
                    pair: ContactPair::Ground { sphere: i },
                    contact,
                });
            }

            for (offset, other) in tail.iter_mut().enumerate() {
                let j = i + 1 + offset;
                if let Some(contact) = self
                    .resolver
                    .collision_detect(sphere, other, DetectionKind::Sphere)
                {
                    log::debug!("spheres {} and {} collided: {:?}", i, j, contact);
                    contacts.push(FrameContact {
                        pair: ContactPair::Spheres { a: i, b: j },
                        contact,
                    });
                }
            }
        }

        contacts
    }

    fn integrate(&self, scene: &mut Scene, contacts: &[FrameContact], now: f32) {
        let mut grounded = vec![false; scene.spheres.len()];
        for contact in contacts {
            if let ContactPair::Ground { sphere } = contact.pair {
                grounded[sphere] = true;
            }
        }

        let surface_y = scene.floor.surface_y();
        for (sphere, on_ground) in scene.spheres.iter_mut().zip(grounded) {
            if on_ground {
                sphere.update_motion_from_contact(now, self.params.gravity);
                // A sphere-sphere push later in the frame can still point it down.
                let lowest = surface_y + sphere.radius();
                if sphere.position().y < lowest {
                    let mut position = sphere.position();
                    position.y = lowest;
                    sphere.set_position(position);
                }
            } else {
                sphere.update_motion(now, self.params.gravity);
            }
        }
    }
}
