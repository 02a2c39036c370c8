//! World state and core simulation types
//!
//! Ramps and gadgets are static geometry; the egg is the only moving body.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::config::PhysicsConfig;
use crate::consts::*;

/// A static line-segment obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Ramp {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn start(&self) -> Vec2 {
        Vec2::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Vec2 {
        Vec2::new(self.x2, self.y2)
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start() + self.end()) * 0.5
    }

    pub fn length(&self) -> f32 {
        self.start().distance(self.end())
    }

    /// Zero-length ramps never collide
    pub fn is_degenerate(&self) -> bool {
        let len_sq = (self.end() - self.start()).length_squared();
        !(len_sq > 0.0)
    }
}

/// Gadget types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GadgetKind {
    Wall,
    Block,
    /// Lets a falling egg land instead of bouncing
    Platform,
    /// Launches the egg upward
    Spring,
    /// Placed and drawn only; no physical rule
    Lever,
    /// Pushes nearby eggs right and slightly up
    Fan,
    /// Swings nearby eggs along a shared phase
    Pendulum,
    /// Pushes nearby eggs right
    Motor,
    /// Platform that kicks a landing egg along its tilt
    Tiltable,
}

impl GadgetKind {
    pub const ALL: [GadgetKind; 9] = [
        GadgetKind::Wall,
        GadgetKind::Block,
        GadgetKind::Platform,
        GadgetKind::Spring,
        GadgetKind::Lever,
        GadgetKind::Fan,
        GadgetKind::Pendulum,
        GadgetKind::Motor,
        GadgetKind::Tiltable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GadgetKind::Wall => "wall",
            GadgetKind::Block => "block",
            GadgetKind::Platform => "platform",
            GadgetKind::Spring => "spring",
            GadgetKind::Lever => "lever",
            GadgetKind::Fan => "fan",
            GadgetKind::Pendulum => "pendulum",
            GadgetKind::Motor => "motor",
            GadgetKind::Tiltable => "tiltable",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Whether the external on/off toggle applies to this kind
    pub fn is_toggleable(&self) -> bool {
        matches!(self, GadgetKind::Fan | GadgetKind::Motor)
    }
}

/// A static rectangular obstacle with a behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gadget {
    #[serde(rename = "type")]
    pub kind: GadgetKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub id: u32,
    /// Tilt in radians (tiltables only, clamped to ±MAX_TILT)
    #[serde(default)]
    pub angle: f32,
    /// On/off toggle (fans and motors)
    #[serde(default)]
    pub active: bool,
}

impl Gadget {
    pub fn new(id: u32, kind: GadgetKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height,
            id,
            angle: 0.0,
            active: false,
        }
    }

    /// Collision box (tiltables collide unrotated)
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
        )
    }

    pub fn center(&self) -> Vec2 {
        self.aabb().center()
    }

    /// Set the tilt, clamped to the allowed range
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle.clamp(-MAX_TILT, MAX_TILT);
    }

    /// Inclusive point test, used for selection
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// The falling egg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Egg {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Egg {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }

    /// Egg at rest at the configured spawn point
    pub fn spawn(config: &PhysicsConfig) -> Self {
        Self::new(
            Vec2::new(config.egg_spawn_x, config.egg_spawn_y),
            config.egg_radius,
        )
    }

    /// Bounding box of the egg's circle
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos - Vec2::splat(self.radius), self.pos + Vec2::splat(self.radius))
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.radius.is_finite()
    }

    pub fn view(&self) -> EggView {
        EggView {
            pos: self.pos,
            radius: self.radius,
        }
    }
}

/// Play area `[0, width] × [0, height]` (top is open)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// What renderers may know about the egg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EggView {
    pub pos: Vec2,
    pub radius: f32,
}

/// Read-only view of the world for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ramps: Vec<Ramp>,
    pub egg: Option<EggView>,
}

/// Everything the simulation steps over
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    pub ramps: Vec<Ramp>,
    /// Copy of the caller's gadget list, replaced wholesale between steps
    pub gadgets: Vec<Gadget>,
    pub egg: Option<Egg>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            ramps: self.ramps.clone(),
            egg: self.egg.as_ref().map(Egg::view),
        }
    }
}
