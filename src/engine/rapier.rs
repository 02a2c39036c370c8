//! rapier2d-backed engine
//!
//! Ramps become segment colliders, gadgets become fixed boxes and the egg is
//! a dynamic ball. Gadget behaviors (springs, fans, ...) are not modelled:
//! rapier sees every gadget as a plain block. Play-area bounds are ignored.

use rapier2d::prelude::*;

use super::PhysicsEngine;
use crate::config::PhysicsConfig;
use crate::sim::{Bounds, EggView, Gadget, Ramp, Snapshot};

/// Pixels per meter
const SCALE: f32 = 50.0;

/// Earth gravity in m/s², pointing down the screen
const GRAVITY_MPS2: f32 = 9.8;

pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    /// Spawn point and radius in pixels
    egg_spawn: glam::Vec2,
    egg_radius: f32,
    ramps: Vec<Ramp>,
    gadgets: Vec<Gadget>,
    gadget_colliders: Vec<ColliderHandle>,
    egg: Option<RigidBodyHandle>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierWorld {
    pub fn new() -> Self {
        Self::with_config(&PhysicsConfig::default())
    }

    /// Spawn point and egg size come from `config`; the rest of the tuning
    /// belongs to rapier
    pub fn with_config(config: &PhysicsConfig) -> Self {
        Self {
            gravity: vector![0.0, GRAVITY_MPS2],
            integration_params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            egg_spawn: glam::Vec2::new(config.egg_spawn_x, config.egg_spawn_y),
            egg_radius: config.egg_radius,
            ramps: Vec::new(),
            gadgets: Vec::new(),
            gadget_colliders: Vec::new(),
            egg: None,
        }
    }
}

impl PhysicsEngine for RapierWorld {
    fn backend_name(&self) -> &'static str {
        "rapier"
    }

    fn add_ramp(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Ramp {
        let ramp = Ramp::new(x1, y1, x2, y2);
        if ramp.is_degenerate() {
            log::trace!("Zero-length ramp at ({}, {}) gets no collider", x1, y1);
        } else {
            let collider = ColliderBuilder::segment(
                point![x1 / SCALE, y1 / SCALE],
                point![x2 / SCALE, y2 / SCALE],
            )
            .friction(0.6)
            .restitution(0.1)
            .build();
            self.colliders.insert(collider);
        }
        self.ramps.push(ramp);
        ramp
    }

    fn spawn_egg(&mut self) {
        if self.egg.is_some() {
            return;
        }
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![self.egg_spawn.x / SCALE, self.egg_spawn.y / SCALE])
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::ball(self.egg_radius / SCALE)
            .density(1.0)
            .friction(0.4)
            .restitution(0.25)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.egg = Some(handle);
        log::info!("Egg spawned (rapier)");
    }

    fn reset_egg(&mut self) {
        if let Some(handle) = self.egg.take() {
            self.bodies.remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }

    fn set_gadgets(&mut self, gadgets: Vec<Gadget>) {
        for handle in self.gadget_colliders.drain(..) {
            self.colliders
                .remove(handle, &mut self.islands, &mut self.bodies, false);
        }
        for gadget in &gadgets {
            if !(gadget.width > 0.0 && gadget.height > 0.0) {
                continue;
            }
            let center = gadget.center();
            let collider = ColliderBuilder::cuboid(
                gadget.width / 2.0 / SCALE,
                gadget.height / 2.0 / SCALE,
            )
            .translation(vector![center.x / SCALE, center.y / SCALE])
            .build();
            self.gadget_colliders.push(self.colliders.insert(collider));
        }
        self.gadgets = gadgets;
    }

    fn gadgets(&self) -> &[Gadget] {
        &self.gadgets
    }

    fn step(&mut self, dt: f32, _bounds: Bounds) {
        if !(dt > 0.0) || !dt.is_finite() {
            return;
        }
        self.integration_params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }

    fn snapshot(&self) -> Snapshot {
        let egg = self.egg.and_then(|handle| self.bodies.get(handle)).map(|body| {
            let t = body.translation();
            EggView {
                pos: glam::Vec2::new(t.x * SCALE, t.y * SCALE),
                radius: self.egg_radius,
            }
        });
        Snapshot {
            ramps: self.ramps.clone(),
            egg,
        }
    }
}
