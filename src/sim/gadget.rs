//! Per-gadget behavior rules
//!
//! Contact gadgets (walls, blocks, platforms, springs, tiltables) act only
//! when the egg's box overlaps theirs. Force gadgets (fans, pendulums,
//! motors) act on any egg whose center is within range of the gadget's
//! center, overlapping or not.

use glam::Vec2;
use rand::Rng;

use super::collision::{Side, push_out};
use super::state::{Egg, Gadget, GadgetKind};
use crate::config::PhysicsConfig;

/// Inputs shared by every rule in a step
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub dt: f32,
    /// Simulation clock in seconds
    pub clock: f32,
    pub config: &'a PhysicsConfig,
}

impl RuleContext<'_> {
    /// Global pendulum phase (shared by every pendulum)
    pub fn pendulum_phase(&self) -> f32 {
        self.clock * self.config.pendulum_phase_rate
    }
}

/// Egg state after a rule, plus the velocity a force gadget added
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleOutcome {
    pub egg: Egg,
    pub impulse: Option<Vec2>,
}

impl RuleOutcome {
    fn untouched(egg: Egg) -> Self {
        Self { egg, impulse: None }
    }
}

/// Apply one gadget's rule to the egg
pub fn apply_gadget_rule<R: Rng>(
    gadget: &Gadget,
    egg: Egg,
    ctx: &RuleContext,
    rng: &mut R,
) -> RuleOutcome {
    match gadget.kind {
        GadgetKind::Wall | GadgetKind::Block => contact(gadget, egg, |egg, side| {
            wall_response(egg, gadget, side, ctx.config)
        }),
        GadgetKind::Platform => contact(gadget, egg, |egg, side| {
            if side == Side::Top && egg.vel.y > 0.0 {
                land(egg, gadget, ctx.config);
            } else {
                wall_response(egg, gadget, side, ctx.config);
            }
            None
        }),
        GadgetKind::Spring => contact(gadget, egg, |egg, side| {
            push_out(egg, &gadget.aabb(), side);
            let before = egg.vel;
            let jitter = (rng.random::<f32>() - 0.5) * 2.0 * ctx.config.spring_jitter;
            egg.vel.y = ctx.config.spring_launch_vy;
            egg.vel.x += jitter;
            Some(egg.vel - before)
        }),
        GadgetKind::Tiltable => contact(gadget, egg, |egg, side| {
            if side == Side::Top && egg.vel.y > 0.0 {
                push_out(egg, &gadget.aabb(), Side::Top);
                egg.vel.y = 0.0;
                egg.vel.x += gadget.angle.sin() * ctx.config.tilt_kick;
                egg.vel.x *= ctx.config.friction;
                None
            } else {
                wall_response(egg, gadget, side, ctx.config)
            }
        }),
        GadgetKind::Fan => {
            let config = ctx.config;
            let push = Vec2::new(config.fan_force, -config.fan_force * config.fan_lift_ratio);
            proximity(gadget, egg, config.fan_range, forces_enabled(gadget, config), push * ctx.dt)
        }
        GadgetKind::Pendulum => {
            let phase = ctx.pendulum_phase();
            let swing = Vec2::new(phase.sin(), phase.cos()) * ctx.config.pendulum_force;
            proximity(gadget, egg, ctx.config.pendulum_range, true, swing * ctx.dt)
        }
        GadgetKind::Motor => {
            let config = ctx.config;
            let push = Vec2::new(config.motor_force, 0.0);
            proximity(gadget, egg, config.motor_range, forces_enabled(gadget, config), push * ctx.dt)
        }
        GadgetKind::Lever => RuleOutcome::untouched(egg),
    }
}

/// Run `respond` with the least-penetrated face if the egg overlaps the gadget
fn contact(
    gadget: &Gadget,
    mut egg: Egg,
    respond: impl FnOnce(&mut Egg, Side) -> Option<Vec2>,
) -> RuleOutcome {
    let aabb = gadget.aabb();
    if !aabb.overlaps(&egg.aabb()) {
        return RuleOutcome::untouched(egg);
    }
    let side = aabb.penetrations(&egg).min_side();
    log::debug!("Egg hit {} #{} on {:?} face", gadget.kind.as_str(), gadget.id, side);
    let impulse = respond(&mut egg, side);
    RuleOutcome { egg, impulse }
}

/// Add `delta_v` if the egg center is within `range` of the gadget center
fn proximity(gadget: &Gadget, mut egg: Egg, range: f32, enabled: bool, delta_v: Vec2) -> RuleOutcome {
    if !enabled || !(egg.pos.distance(gadget.center()) < range) {
        return RuleOutcome::untouched(egg);
    }
    egg.vel += delta_v;
    RuleOutcome {
        egg,
        impulse: Some(delta_v),
    }
}

fn forces_enabled(gadget: &Gadget, config: &PhysicsConfig) -> bool {
    !config.gate_forces_on_active || gadget.active
}

/// Clamp to the face and send the egg away from it, then damp both axes
fn wall_response(egg: &mut Egg, gadget: &Gadget, side: Side, config: &PhysicsConfig) -> Option<Vec2> {
    push_out(egg, &gadget.aabb(), side);
    let e = config.restitution;
    match side {
        Side::Left => egg.vel.x = -egg.vel.x.abs() * e,
        Side::Right => egg.vel.x = egg.vel.x.abs() * e,
        Side::Top => egg.vel.y = -egg.vel.y.abs() * e,
        Side::Bottom => egg.vel.y = egg.vel.y.abs() * e,
    }
    egg.vel *= config.friction;
    None
}

/// Settle the egg on the gadget's top face
fn land(egg: &mut Egg, gadget: &Gadget, config: &PhysicsConfig) {
    push_out(egg, &gadget.aabb(), Side::Top);
    egg.vel.y = 0.0;
    egg.vel.x *= config.friction;
}
