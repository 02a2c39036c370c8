//! Saved level document

use serde::{Deserialize, Deserializer, Serialize};

use crate::editor::{Contraption, RampPart};
use crate::sim::{Bounds, Gadget};

/// Current level format version
pub const LEVEL_VERSION: u32 = 1;

/// Goal rectangle in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalRegion {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl GoalRegion {
    /// Inset from the bottom-right corner of the play area
    pub const MARGIN: f32 = 120.0;
    pub const SIZE: f32 = 100.0;

    pub fn for_bounds(bounds: Bounds) -> Self {
        Self {
            x: bounds.width - Self::MARGIN,
            y: bounds.height - Self::MARGIN,
            w: Self::SIZE,
            h: Self::SIZE,
        }
    }

    /// Whether an egg centered at `(x, y)` has reached the goal.
    ///
    /// The zone runs from the goal's top-left corner to the edges of the
    /// play area, so an egg resting in the corner still counts.
    pub fn reached_by(&self, x: f32, y: f32) -> bool {
        x > self.x && y > self.y
    }
}

/// A saved contraption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub version: u32,
    #[serde(default)]
    pub parts: Vec<RampPart>,
    #[serde(default)]
    pub static_objects: Vec<Gadget>,
    #[serde(default, deserialize_with = "lenient_goal")]
    pub goal: Option<GoalRegion>,
}

/// The goal is informational; a malformed one (older saves wrote `{}`)
/// loads as absent instead of failing the whole level
fn lenient_goal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<GoalRegion>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl Level {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Contraption {
    /// Snapshot the contraption as a level for the given play area
    pub fn to_level(&self, bounds: Bounds) -> Level {
        Level {
            version: LEVEL_VERSION,
            parts: self.parts.clone(),
            static_objects: self.gadgets.clone(),
            goal: Some(GoalRegion::for_bounds(bounds)),
        }
    }

    pub fn from_level(level: Level) -> Self {
        if level.version > LEVEL_VERSION {
            log::warn!(
                "Level version {} is newer than {}, loading what we understand",
                level.version,
                LEVEL_VERSION
            );
        }
        Contraption::from_parts(level.parts, level.static_objects)
    }
}
