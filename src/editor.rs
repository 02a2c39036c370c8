//! Contraption editing
//!
//! The editable level: ramps ("parts") and gadgets, with the placement,
//! selection and adjustment rules of the toolbox. Input wiring lives with
//! the caller; this module only knows about coordinates and ids.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::engine::{BackendKind, PhysicsEngine, create_engine_for};
use crate::sim::{Gadget, GadgetKind, Ramp};
use crate::{closest_point_on_segment, rotate_about};

/// Placement grid spacing (pixels)
pub const GRID: f32 = 32.0;
/// Half-length of a freshly placed ramp
pub const RAMP_HALF_LENGTH: f32 = 64.0;
/// Default gadget size
pub const GADGET_WIDTH: f32 = 64.0;
pub const GADGET_HEIGHT: f32 = 32.0;
/// How close a click must be to a ramp to select it
pub const RAMP_PICK_RADIUS: f32 = 10.0;
/// Rotation applied per ramp-rotate command
pub const RAMP_ROTATE_STEP: f32 = std::f32::consts::PI / 12.0;
/// Tilt change per tilt command
pub const TILT_STEP: f32 = 0.1;

/// Round each coordinate to the nearest grid line
pub fn snap_to_grid(p: Vec2) -> Vec2 {
    (p / GRID).round() * GRID
}

/// Stored part type (only ramps exist today)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    #[default]
    Ramp,
}

/// A placed ramp with its editor id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampPart {
    #[serde(rename = "type", default)]
    pub kind: PartKind,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub id: u32,
}

impl RampPart {
    pub fn ramp(&self) -> Ramp {
        Ramp::new(self.x1, self.y1, self.x2, self.y2)
    }

    fn set_ramp(&mut self, ramp: Ramp) {
        self.x1 = ramp.x1;
        self.y1 = ramp.y1;
        self.x2 = ramp.x2;
        self.y2 = ramp.y2;
    }
}

/// Toolbox entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ramp,
    Gadget(GadgetKind),
}

impl Tool {
    /// Parse a toolbox name. Planks, dominoes, wheels and hinges all
    /// place ramps.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ramp" | "plank" | "domino" | "wheel" | "hinge" => Some(Tool::Ramp),
            other => GadgetKind::from_str(other).map(Tool::Gadget),
        }
    }
}

/// What a successful placement created
#[derive(Debug, Clone, PartialEq)]
pub enum Placed {
    Ramp(RampPart),
    Gadget(Gadget),
}

impl Placed {
    pub fn id(&self) -> u32 {
        match self {
            Placed::Ramp(part) => part.id,
            Placed::Gadget(gadget) => gadget.id,
        }
    }
}

/// The user's ramps and gadgets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contraption {
    pub parts: Vec<RampPart>,
    pub gadgets: Vec<Gadget>,
    next_id: u32,
}

impl Contraption {
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            gadgets: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild from stored parts, continuing ids after the largest one seen.
    /// When that would run past `u32::MAX` everything is renumbered from 1.
    pub fn from_parts(parts: Vec<RampPart>, gadgets: Vec<Gadget>) -> Self {
        let max_id = parts
            .iter()
            .map(|p| p.id)
            .chain(gadgets.iter().map(|g| g.id))
            .max()
            .unwrap_or(0);
        let mut contraption = Self {
            parts,
            gadgets,
            next_id: 1,
        };
        match max_id.checked_add(1) {
            Some(next_id) => contraption.next_id = next_id,
            None => contraption.renumber(),
        }
        contraption
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id.max(1);
        match id.checked_add(1) {
            Some(next_id) => {
                self.next_id = next_id;
                id
            }
            None => {
                self.renumber();
                let id = self.next_id;
                self.next_id = id.saturating_add(1);
                id
            }
        }
    }

    /// Reassign ids 1..=n, ramps first
    fn renumber(&mut self) {
        log::warn!("Ids exhausted, renumbering {} parts", self.parts_used());
        let mut next_id: u32 = 1;
        let mut take = || {
            let id = next_id;
            next_id = next_id.saturating_add(1);
            id
        };
        for part in &mut self.parts {
            part.id = take();
        }
        for gadget in &mut self.gadgets {
            gadget.id = take();
        }
        self.next_id = next_id;
    }

    /// Drop a tool at `at` (snapped to the grid)
    pub fn place(&mut self, tool: Tool, at: Vec2) -> Placed {
        let at = snap_to_grid(at);
        let id = self.next_entity_id();
        match tool {
            Tool::Ramp => {
                let part = RampPart {
                    kind: PartKind::Ramp,
                    x1: at.x - RAMP_HALF_LENGTH,
                    y1: at.y,
                    x2: at.x + RAMP_HALF_LENGTH,
                    y2: at.y,
                    id,
                };
                self.parts.push(part);
                Placed::Ramp(part)
            }
            Tool::Gadget(kind) => {
                let gadget = Gadget::new(
                    id,
                    kind,
                    at.x - GADGET_WIDTH / 2.0,
                    at.y - GADGET_HEIGHT / 2.0,
                    GADGET_WIDTH,
                    GADGET_HEIGHT,
                );
                self.gadgets.push(gadget.clone());
                Placed::Gadget(gadget)
            }
        }
    }

    /// Place by toolbox name; unknown names place nothing
    pub fn place_named(&mut self, name: &str, at: Vec2) -> Option<Placed> {
        let Some(tool) = Tool::from_str(name) else {
            log::debug!("Ignoring drop of unknown part '{}'", name);
            return None;
        };
        Some(self.place(tool, at))
    }

    /// Id of the object under `p`: gadgets first, then ramps
    pub fn hit_test(&self, p: Vec2) -> Option<u32> {
        if let Some(gadget) = self.gadgets.iter().find(|g| g.contains_point(p)) {
            return Some(gadget.id);
        }
        self.parts
            .iter()
            .find(|part| {
                let ramp = part.ramp();
                closest_point_on_segment(p, ramp.start(), ramp.end())
                    .is_some_and(|(closest, _)| p.distance(closest) < RAMP_PICK_RADIUS)
            })
            .map(|part| part.id)
    }

    pub fn part(&self, id: u32) -> Option<&RampPart> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn gadget(&self, id: u32) -> Option<&Gadget> {
        self.gadgets.iter().find(|g| g.id == id)
    }

    /// Rotate a ramp one step about its midpoint. Needs an engine rebuild.
    pub fn rotate_ramp(&mut self, id: u32) -> bool {
        let Some(part) = self.parts.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        let ramp = part.ramp();
        let mid = ramp.midpoint();
        let start = rotate_about(ramp.start(), mid, RAMP_ROTATE_STEP);
        let end = rotate_about(ramp.end(), mid, RAMP_ROTATE_STEP);
        part.set_ramp(Ramp::new(start.x, start.y, end.x, end.y));
        true
    }

    /// Tilt a tiltable by `steps` increments (negative tilts left)
    pub fn tilt(&mut self, id: u32, steps: f32) -> bool {
        match self.gadgets.iter_mut().find(|g| g.id == id) {
            Some(gadget) if gadget.kind == GadgetKind::Tiltable => {
                gadget.set_angle(gadget.angle + steps * TILT_STEP);
                true
            }
            _ => false,
        }
    }

    /// Flip a fan or motor on/off
    pub fn toggle_active(&mut self, id: u32) -> bool {
        match self.gadgets.iter_mut().find(|g| g.id == id) {
            Some(gadget) if gadget.kind.is_toggleable() => {
                gadget.active = !gadget.active;
                true
            }
            _ => false,
        }
    }

    /// Remove a ramp or gadget. Needs an engine rebuild.
    pub fn delete(&mut self, id: u32) -> bool {
        let before = self.parts.len() + self.gadgets.len();
        self.parts.retain(|p| p.id != id);
        self.gadgets.retain(|g| g.id != id);
        before != self.parts.len() + self.gadgets.len()
    }

    pub fn parts_used(&self) -> usize {
        self.parts.len() + self.gadgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts_used() == 0
    }

    /// Fresh engine holding every ramp and a copy of the gadgets
    pub fn build_engine(
        &self,
        backend: BackendKind,
        config: &PhysicsConfig,
        seed: u64,
    ) -> Box<dyn PhysicsEngine> {
        let mut engine = create_engine_for(backend, config, seed);
        for part in &self.parts {
            engine.add_ramp(part.x1, part.y1, part.x2, part.y2);
        }
        engine.set_gadgets(self.gadgets.clone());
        engine
    }
}
