//! Egg simulation
//!
//! All physics lives here. This module must stay deterministic given its inputs:
//! - The clock is passed in, never read from the wall
//! - Spring jitter comes from a caller-supplied RNG
//! - Ramps and gadgets are processed in list order
//! - No rendering or platform dependencies

pub mod collision;
pub mod gadget;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionResult, Penetrations, Side, egg_ramp_collision};
pub use gadget::{RuleContext, RuleOutcome, apply_gadget_rule};
pub use state::{Bounds, Egg, EggView, Gadget, GadgetKind, Ramp, Snapshot, World};
pub use tick::{StepParams, step};
