//! Eggs Machina - a 2D contraption sandbox
//!
//! Core modules:
//! - `sim`: Egg simulation (integration, ramp and gadget collisions)
//! - `engine`: Engine contract, fallback engine and backend selection
//! - `editor`: Contraption editing (placement, selection, rotation)
//! - `session`: Per-frame run driver with goal/loss detection
//! - `persistence`: Level documents and save slots
//! - `platform`: Browser/native glue (logging, JS handle)
//! - `config`: Tunable physics constants

pub mod config;
pub mod editor;
pub mod engine;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod sim;

pub use config::PhysicsConfig;
pub use editor::Contraption;
pub use engine::{BackendKind, LocalWorld, PhysicsEngine, create_engine};
pub use session::{RunOutcome, Session, SessionOptions};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    use glam::Vec2;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 1200.0;
    /// Velocity damping applied on contact
    pub const FRICTION: f32 = 0.995;
    /// Fraction of normal velocity kept after a bounce
    pub const RESTITUTION: f32 = 0.25;

    /// Egg defaults
    pub const EGG_RADIUS: f32 = 16.0;
    pub const EGG_SPAWN: Vec2 = Vec2::new(80.0, 80.0);

    /// Extra contact distance around ramps
    pub const RAMP_MARGIN: f32 = 3.0;
    /// Distance floor used when normalizing a ramp contact normal
    pub const MIN_CONTACT_DIST: f32 = 1e-4;

    /// Spring launch velocity (upward) and horizontal jitter half-range
    pub const SPRING_LAUNCH_VY: f32 = -1200.0;
    pub const SPRING_JITTER: f32 = 150.0;

    /// Fan: rightward push with a weaker lift
    pub const FAN_FORCE: f32 = 800.0;
    pub const FAN_LIFT_RATIO: f32 = 0.3;
    pub const FAN_RANGE: f32 = 100.0;

    /// Pendulum swing strength, range and phase rate (radians per second)
    pub const PENDULUM_FORCE: f32 = 600.0;
    pub const PENDULUM_RANGE: f32 = 80.0;
    pub const PENDULUM_PHASE_RATE: f32 = 2.0;

    /// Motor: constant rightward push
    pub const MOTOR_FORCE: f32 = 1000.0;
    pub const MOTOR_RANGE: f32 = 100.0;

    /// Tiltable: horizontal kick per unit of sin(angle)
    pub const TILT_KICK: f32 = 200.0;
    /// Tilt limit (radians, either direction)
    pub const MAX_TILT: f32 = std::f32::consts::FRAC_PI_4;

    /// Default play area
    pub const DEFAULT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_HEIGHT: f32 = 720.0;

    /// Largest frame delta fed to the engine by the session
    pub const MAX_FRAME_DT: f32 = 0.033;
}

/// Closest point to `p` on the segment `a`-`b`, with the clamped projection parameter.
///
/// Returns `None` for a zero-length segment.
#[inline]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Option<(Vec2, f32)> {
    let seg = b - a;
    let len_sq = seg.length_squared();
    // `!(x > 0)` also rejects NaN lengths
    if !(len_sq > 0.0) {
        return None;
    }
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    Some((a + seg * t, t))
}

/// Rotate `p` around `center` by `angle` radians
#[inline]
pub fn rotate_about(p: Vec2, center: Vec2, angle: f32) -> Vec2 {
    center + Vec2::from_angle(angle).rotate(p - center)
}
