//! Built-in fallback engine
//!
//! Wraps a [`World`] with the tuning, RNG and clock the simulation needs.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::PhysicsEngine;
use crate::config::PhysicsConfig;
use crate::sim::{self, Bounds, Egg, Gadget, Ramp, Snapshot, StepParams, World};

/// Spring jitter seed used by [`LocalWorld::new`]
pub const DEFAULT_SEED: u64 = 0x0e66_5eed;

/// The built-in egg simulator
#[derive(Debug, Clone)]
pub struct LocalWorld {
    world: World,
    config: PhysicsConfig,
    rng: Pcg32,
    /// Seconds simulated so far
    clock: f32,
}

impl Default for LocalWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalWorld {
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default(), DEFAULT_SEED)
    }

    pub fn with_config(config: PhysicsConfig, seed: u64) -> Self {
        Self {
            world: World::new(),
            config,
            rng: Pcg32::seed_from_u64(seed),
            clock: 0.0,
        }
    }

    /// Step with an explicit clock (seconds) instead of the internal one.
    /// The internal clock is left alone.
    pub fn step_at(&mut self, dt: f32, bounds: Bounds, clock: f32) {
        let params = StepParams { dt, bounds, clock };
        sim::step(&mut self.world, &params, &self.config, &mut self.rng);
    }

    /// Full egg state, velocity included
    pub fn egg(&self) -> Option<&Egg> {
        self.world.egg.as_ref()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }
}

impl PhysicsEngine for LocalWorld {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn add_ramp(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Ramp {
        let ramp = Ramp::new(x1, y1, x2, y2);
        self.world.ramps.push(ramp);
        ramp
    }

    fn spawn_egg(&mut self) {
        if self.world.egg.is_none() {
            let egg = Egg::spawn(&self.config);
            log::info!("Egg spawned at ({}, {})", egg.pos.x, egg.pos.y);
            self.world.egg = Some(egg);
        }
    }

    fn reset_egg(&mut self) {
        if self.world.egg.take().is_some() {
            log::info!("Egg reset");
        }
    }

    fn set_gadgets(&mut self, gadgets: Vec<Gadget>) {
        self.world.gadgets = gadgets;
    }

    fn gadgets(&self) -> &[Gadget] {
        &self.world.gadgets
    }

    fn step(&mut self, dt: f32, bounds: Bounds) {
        if self.world.egg.is_none() {
            return;
        }
        self.step_at(dt, bounds, self.clock);
        if dt.is_finite() && dt >= 0.0 {
            self.clock += dt;
        }
    }

    fn snapshot(&self) -> Snapshot {
        self.world.snapshot()
    }
}
