//! Per-frame simulation step
//!
//! Advances the egg through four stages, each consuming the state the
//! previous one left behind: integration, play-area bounds, ramps, gadgets.

use glam::Vec2;
use rand::Rng;

use super::collision::{bounce_velocity, egg_ramp_collision};
use super::gadget::{RuleContext, apply_gadget_rule};
use super::state::{Bounds, Egg, Gadget, Ramp, World};
use crate::config::PhysicsConfig;

/// Inputs for a single step
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    /// Seconds to advance (the caller clamps it)
    pub dt: f32,
    pub bounds: Bounds,
    /// Simulation clock in seconds, drives the pendulum phase
    pub clock: f32,
}

/// Advance the world by one step
///
/// Ramps and gadgets are read-only here; only the egg moves. A missing egg,
/// a negative or non-finite `dt`, or a step that would leave the egg
/// non-finite all leave the world untouched.
pub fn step<R: Rng>(world: &mut World, params: &StepParams, config: &PhysicsConfig, rng: &mut R) {
    let Some(before) = world.egg else {
        return;
    };
    if !(params.dt >= 0.0) || !params.dt.is_finite() {
        log::trace!("Skipping step with dt = {}", params.dt);
        return;
    }

    let mut egg = before;
    integrate(&mut egg, params.dt, config);
    collide_bounds(&mut egg, params.bounds, config);
    collide_ramps(&mut egg, &world.ramps, config);

    let ctx = RuleContext {
        dt: params.dt,
        clock: params.clock,
        config,
    };
    let impulse = collide_gadgets(&mut egg, &world.gadgets, &ctx, rng);
    if impulse != Vec2::ZERO {
        log::trace!("Gadgets added ({:.1}, {:.1}) px/s", impulse.x, impulse.y);
    }

    if egg.is_finite() {
        world.egg = Some(egg);
    } else {
        log::warn!("Discarding step that left the egg non-finite: {:?}", egg);
    }
}

/// Semi-implicit Euler: gravity into velocity, then velocity into position
pub fn integrate(egg: &mut Egg, dt: f32, config: &PhysicsConfig) {
    egg.vel.y += config.gravity * dt;
    egg.pos += egg.vel * dt;
}

/// Floor and side walls; the top is open
pub fn collide_bounds(egg: &mut Egg, bounds: Bounds, config: &PhysicsConfig) {
    let r = egg.radius;
    let e = config.restitution;

    if egg.pos.y + r > bounds.height {
        egg.pos.y = bounds.height - r;
        egg.vel.y = -egg.vel.y * e;
        egg.vel.x *= config.friction;
    }
    if egg.pos.x - r < 0.0 {
        egg.pos.x = r;
        egg.vel.x = -egg.vel.x * e;
    }
    if egg.pos.x + r > bounds.width {
        egg.pos.x = bounds.width - r;
        egg.vel.x = -egg.vel.x * e;
    }
}

/// Every ramp in contact pushes the egg out and bounces it
pub fn collide_ramps(egg: &mut Egg, ramps: &[Ramp], config: &PhysicsConfig) {
    for ramp in ramps {
        let hit = egg_ramp_collision(egg.pos, egg.radius, ramp, config.ramp_margin);
        if !hit.hit {
            continue;
        }
        egg.pos += hit.normal * hit.penetration;
        egg.vel = bounce_velocity(egg.vel, hit.normal, config.restitution) * config.friction;
    }
}

/// Run each gadget's rule in list order. Returns the total velocity added
/// by springs and force gadgets.
pub fn collide_gadgets<R: Rng>(
    egg: &mut Egg,
    gadgets: &[Gadget],
    ctx: &RuleContext,
    rng: &mut R,
) -> Vec2 {
    let mut total = Vec2::ZERO;
    for gadget in gadgets {
        let outcome = apply_gadget_rule(gadget, *egg, ctx, rng);
        *egg = outcome.egg;
        if let Some(impulse) = outcome.impulse {
            total += impulse;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GadgetKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 0.016;

    fn params(dt: f32) -> StepParams {
        StepParams {
            dt,
            bounds: Bounds::default(),
            clock: 0.0,
        }
    }

    fn world_with_egg(x: f32, y: f32, vx: f32, vy: f32) -> World {
        let mut world = World::new();
        world.egg = Some(Egg {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            radius: 16.0,
        });
        world
    }

    fn run(world: &mut World, dt: f32) {
        let mut rng = Pcg32::seed_from_u64(42);
        step(world, &params(dt), &PhysicsConfig::default(), &mut rng);
    }

    #[test]
    fn test_no_egg_is_noop() {
        let mut world = World::new();
        world.ramps.push(Ramp::new(0.0, 300.0, 400.0, 300.0));
        let before = world.clone();
        run(&mut world, DT);
        assert_eq!(world, before);
    }

    #[test]
    fn test_gravity_integration() {
        let mut world = world_with_egg(200.0, 100.0, 10.0, 0.0);
        run(&mut world, DT);
        let egg = world.egg.unwrap();
        assert!((egg.vel.y - 1200.0 * DT).abs() < 1e-4);
        assert!((egg.pos.y - (100.0 + 1200.0 * DT * DT)).abs() < 1e-4);
        assert!((egg.pos.x - (200.0 + 10.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_bad_dt_is_noop() {
        for dt in [-0.1, f32::NAN, f32::INFINITY] {
            let mut world = world_with_egg(200.0, 100.0, 10.0, 0.0);
            let before = world.clone();
            run(&mut world, dt);
            assert_eq!(world, before);
        }
    }

    #[test]
    fn test_floor_bounce() {
        let height = Bounds::default().height;
        let mut world = world_with_egg(200.0, height - 10.0, 20.0, 300.0);
        run(&mut world, DT);
        let egg = world.egg.unwrap();
        assert!((egg.pos.y + egg.radius - height).abs() < 1e-3);
        let incoming = 300.0 + 1200.0 * DT;
        assert!((egg.vel.y + incoming * 0.25).abs() < 1e-3);
        assert!((egg.vel.x - 20.0 * 0.995).abs() < 1e-4);
    }

    #[test]
    fn test_side_walls_no_friction() {
        let mut world = world_with_egg(10.0, 100.0, -100.0, 0.0);
        run(&mut world, DT);
        let egg = world.egg.unwrap();
        assert_eq!(egg.pos.x, 16.0);
        assert!((egg.vel.x - 25.0).abs() < 1e-4);

        let width = Bounds::default().width;
        let mut world = world_with_egg(width - 10.0, 100.0, 100.0, 0.0);
        run(&mut world, DT);
        let egg = world.egg.unwrap();
        assert_eq!(egg.pos.x, width - 16.0);
        assert!((egg.vel.x + 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_top_is_open() {
        let mut world = world_with_egg(200.0, 5.0, 0.0, -2000.0);
        run(&mut world, DT);
        assert!(world.egg.unwrap().pos.y < 0.0);
    }

    #[test]
    fn test_horizontal_ramp_bounce() {
        // Egg falling straight down onto a flat ramp
        let mut world = world_with_egg(200.0, 275.0, 0.0, 400.0);
        world.ramps.push(Ramp::new(0.0, 300.0, 400.0, 300.0));
        run(&mut world, DT);
        let egg = world.egg.unwrap();
        let incoming = 400.0 + 1200.0 * DT;
        assert_eq!(egg.vel.x, 0.0);
        assert!((egg.vel.y + incoming * 0.25 * 0.995).abs() < 1e-3);
        assert!((egg.pos.y - 281.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_ramp_never_collides() {
        let mut world = world_with_egg(200.0, 200.0, 0.0, 0.0);
        world.ramps.push(Ramp::new(200.0, 200.0, 200.0, 200.0));
        run(&mut world, DT);
        let egg = world.egg.unwrap();
        assert!((egg.vel.y - 1200.0 * DT).abs() < 1e-4);
    }

    #[test]
    fn test_wall_resolves_one_axis() {
        let mut world = world_with_egg(88.0, 200.0, 50.0, 0.0);
        world
            .gadgets
            .push(Gadget::new(1, GadgetKind::Wall, 100.0, 100.0, 64.0, 200.0));
        run(&mut world, 0.0);
        let egg = world.egg.unwrap();
        assert_eq!(egg.pos, Vec2::new(84.0, 200.0));
    }

    #[test]
    fn test_platform_landing_in_step() {
        let mut world = world_with_egg(132.0, 190.0, 0.0, 100.0);
        world
            .gadgets
            .push(Gadget::new(1, GadgetKind::Platform, 100.0, 200.0, 64.0, 32.0));
        run(&mut world, DT);
        let egg = world.egg.unwrap();
        assert_eq!(egg.vel.y, 0.0);
        assert_eq!(egg.pos.y, 184.0);
    }

    #[test]
    fn test_non_finite_result_is_discarded() {
        let mut world = world_with_egg(200.0, 100.0, 0.0, 0.0);
        let before = world.clone();
        let config = PhysicsConfig {
            gravity: f32::NAN,
            ..PhysicsConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        step(&mut world, &params(DT), &config, &mut rng);
        assert_eq!(world, before);
    }

    #[test]
    fn test_stacked_ramps_all_apply() {
        // Two ramps meeting under the egg: both push it out in the same step
        let mut world = world_with_egg(200.0, 284.0, 0.0, 0.0);
        world.ramps.push(Ramp::new(0.0, 300.0, 200.0, 300.0));
        world.ramps.push(Ramp::new(200.0, 300.0, 400.0, 300.0));
        run(&mut world, DT);
        let egg = world.egg.unwrap();
        assert!((egg.pos.y - 281.0).abs() < 1e-2);
        assert!(egg.vel.y.abs() < 1200.0 * DT);
    }

    #[test]
    fn test_gadget_impulses_are_summed() {
        let config = PhysicsConfig::default();
        let ctx = RuleContext {
            dt: DT,
            clock: 0.0,
            config: &config,
        };
        let mut egg = Egg::new(Vec2::new(132.0, 216.0), 16.0);
        let gadgets = [
            Gadget::new(1, GadgetKind::Motor, 100.0, 200.0, 64.0, 32.0),
            Gadget::new(2, GadgetKind::Motor, 100.0, 200.0, 64.0, 32.0),
            Gadget::new(3, GadgetKind::Lever, 100.0, 200.0, 64.0, 32.0),
        ];
        let mut rng = Pcg32::seed_from_u64(0);
        let total = collide_gadgets(&mut egg, &gadgets, &ctx, &mut rng);
        assert!((total.x - 2.0 * 1000.0 * DT).abs() < 1e-4);
        assert_eq!(total.y, 0.0);
        assert_eq!(egg.vel, total);
    }
}
