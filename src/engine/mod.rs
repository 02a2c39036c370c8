//! Engine contract and backend selection
//!
//! Two backends satisfy [`PhysicsEngine`]: the built-in [`LocalWorld`] and,
//! when the crate is built with the `rapier` feature, a full rigid-body
//! adapter. Callers pick one once, at creation time.

mod local;
#[cfg(feature = "rapier")]
mod rapier;

pub use local::{DEFAULT_SEED, LocalWorld};
#[cfg(feature = "rapier")]
pub use rapier::RapierWorld;

use crate::config::PhysicsConfig;
use crate::sim::{Bounds, Gadget, Ramp, Snapshot};

/// What the editor, session and renderer need from a physics backend
pub trait PhysicsEngine {
    /// Short label for the backend ("local" or "rapier")
    fn backend_name(&self) -> &'static str;

    /// Append a ramp and return it
    fn add_ramp(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Ramp;

    /// Create the egg at the spawn point, unless one already exists
    fn spawn_egg(&mut self);

    /// Remove the egg
    fn reset_egg(&mut self);

    /// Replace the gadget list; takes effect on the next step
    fn set_gadgets(&mut self, gadgets: Vec<Gadget>);

    fn gadgets(&self) -> &[Gadget];

    /// Advance by `dt` seconds inside `bounds`
    fn step(&mut self, dt: f32, bounds: Bounds);

    fn snapshot(&self) -> Snapshot;
}

/// Available physics backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Built-in egg simulator
    Local,
    /// rapier2d adapter (needs the `rapier` feature)
    Rapier,
}

impl BackendKind {
    /// The richest backend compiled into this build
    pub fn detect() -> Self {
        if Self::Rapier.is_available() {
            Self::Rapier
        } else {
            Self::Local
        }
    }

    pub fn is_available(&self) -> bool {
        match self {
            BackendKind::Local => true,
            BackendKind::Rapier => cfg!(feature = "rapier"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Rapier => "rapier",
        }
    }
}

/// Create the preferred engine for this build with default tuning and a
/// clock-derived seed
pub fn create_engine() -> Box<dyn PhysicsEngine> {
    create_engine_for(
        BackendKind::detect(),
        &PhysicsConfig::default(),
        crate::platform::clock_seed(),
    )
}

/// Create an engine of the given kind, falling back to the local engine
/// when that backend is not compiled in. `seed` drives the spring jitter.
pub fn create_engine_for(
    kind: BackendKind,
    config: &PhysicsConfig,
    seed: u64,
) -> Box<dyn PhysicsEngine> {
    let kind = if kind.is_available() {
        kind
    } else {
        log::info!("{} backend not built in, using local engine", kind.as_str());
        BackendKind::Local
    };

    log::info!("Creating {} physics engine (seed {})", kind.as_str(), seed);
    match kind {
        #[cfg(feature = "rapier")]
        BackendKind::Rapier => Box::new(RapierWorld::with_config(config)),
        _ => Box::new(LocalWorld::with_config(config.clone(), seed)),
    }
}
