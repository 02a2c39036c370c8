//! Run session
//!
//! Owns the contraption and the engine built from it, and turns per-frame
//! elapsed time into steps, journey tracking and win/loss results.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::PhysicsConfig;
use crate::consts::MAX_FRAME_DT;
use crate::editor::{Contraption, Placed, Tool};
use crate::engine::{BackendKind, DEFAULT_SEED, PhysicsEngine};
use crate::persistence::{GoalRegion, Level};
use crate::sim::{Bounds, Snapshot};

/// How far below the play area the egg may fall before the run is lost
pub const LOSS_MARGIN: f32 = 40.0;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Egg reached the goal
    Won,
    /// Egg fell out of the play area
    Lost,
}

/// How a session builds its engines
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub backend: BackendKind,
    pub config: PhysicsConfig,
    /// Seeds the first engine; rebuilt engines draw fresh seeds from it
    pub seed: u64,
}

impl Default for SessionOptions {
    /// Best available backend, default tuning, fixed seed
    fn default() -> Self {
        Self {
            backend: BackendKind::detect(),
            config: PhysicsConfig::default(),
            seed: DEFAULT_SEED,
        }
    }
}

/// The editor-plus-simulation state behind one play area
pub struct Session {
    contraption: Contraption,
    engine: Box<dyn PhysicsEngine>,
    backend: BackendKind,
    config: PhysicsConfig,
    /// Source of per-engine seeds
    seeds: Pcg32,
    bounds: Bounds,
    goal: GoalRegion,
    running: bool,
    /// Farthest distance from the spawn point in the current run
    journey: f32,
    /// Farthest journey across runs
    best_journey: f32,
    goal_reaches: u32,
}

impl Session {
    pub fn new(contraption: Contraption, bounds: Bounds) -> Self {
        Self::with_options(contraption, bounds, SessionOptions::default())
    }

    pub fn with_options(contraption: Contraption, bounds: Bounds, options: SessionOptions) -> Self {
        let mut seeds = Pcg32::seed_from_u64(options.seed);
        let engine = contraption.build_engine(options.backend, &options.config, seeds.random());
        Self {
            contraption,
            engine,
            backend: options.backend,
            config: options.config,
            seeds,
            bounds,
            goal: GoalRegion::for_bounds(bounds),
            running: false,
            journey: 0.0,
            best_journey: 0.0,
            goal_reaches: 0,
        }
    }

    pub fn contraption(&self) -> &Contraption {
        &self.contraption
    }

    pub fn engine(&self) -> &dyn PhysicsEngine {
        self.engine.as_ref()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn goal(&self) -> GoalRegion {
        self.goal
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn journey(&self) -> f32 {
        self.journey
    }

    pub fn best_journey(&self) -> f32 {
        self.best_journey
    }

    pub fn goal_reaches(&self) -> u32 {
        self.goal_reaches
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    /// Resize the play area; the goal follows the bottom-right corner
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.goal = GoalRegion::for_bounds(bounds);
    }

    /// Swap the physics tuning. The engine is rebuilt, so any run stops.
    pub fn set_config(&mut self, config: PhysicsConfig) {
        self.config = config;
        self.rebuild_engine();
    }

    /// Spawn the egg (if needed) and start simulating
    pub fn play(&mut self) {
        self.journey = 0.0;
        self.engine.spawn_egg();
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Remove the egg and stop
    pub fn reset(&mut self) {
        self.engine.reset_egg();
        self.running = false;
        self.journey = 0.0;
    }

    /// Advance one rendered frame
    ///
    /// `elapsed` is the wall time since the previous frame; it is capped at
    /// [`MAX_FRAME_DT`] before reaching the engine. Returns the outcome on the
    /// frame a run ends.
    pub fn frame(&mut self, elapsed: f32) -> Option<RunOutcome> {
        if !self.running {
            return None;
        }
        let dt = elapsed.min(MAX_FRAME_DT);
        self.engine.step(dt, self.bounds);

        let egg = self.engine.snapshot().egg?;
        let spawn = Vec2::new(self.config.egg_spawn_x, self.config.egg_spawn_y);
        self.journey = self.journey.max(egg.pos.distance(spawn));
        self.best_journey = self.best_journey.max(self.journey);

        let outcome = if self.goal.reached_by(egg.pos.x, egg.pos.y) {
            self.goal_reaches += 1;
            RunOutcome::Won
        } else if egg.pos.y > self.bounds.height + LOSS_MARGIN {
            RunOutcome::Lost
        } else {
            return None;
        };

        self.running = false;
        log::debug!("Run ended: {:?} after {:.0}px", outcome, self.journey);
        Some(outcome)
    }

    /// Drop a tool; ramps go straight into the live engine, gadgets
    /// replace the engine's gadget list
    pub fn place(&mut self, tool: Tool, at: Vec2) -> Placed {
        let placed = self.contraption.place(tool, at);
        match &placed {
            Placed::Ramp(part) => {
                self.engine.add_ramp(part.x1, part.y1, part.x2, part.y2);
            }
            Placed::Gadget(_) => self.sync_gadgets(),
        }
        placed
    }

    pub fn select(&self, at: Vec2) -> Option<u32> {
        self.contraption.hit_test(at)
    }

    pub fn rotate_ramp(&mut self, id: u32) -> bool {
        let changed = self.contraption.rotate_ramp(id);
        if changed {
            self.rebuild_engine();
        }
        changed
    }

    pub fn tilt(&mut self, id: u32, steps: f32) -> bool {
        let changed = self.contraption.tilt(id, steps);
        if changed {
            self.sync_gadgets();
        }
        changed
    }

    pub fn toggle_active(&mut self, id: u32) -> bool {
        let changed = self.contraption.toggle_active(id);
        if changed {
            self.sync_gadgets();
        }
        changed
    }

    pub fn delete(&mut self, id: u32) -> bool {
        let changed = self.contraption.delete(id);
        if changed {
            self.rebuild_engine();
        }
        changed
    }

    /// Replace the contraption with a saved level
    pub fn load_level(&mut self, level: Level) {
        self.contraption = Contraption::from_level(level);
        self.rebuild_engine();
    }

    pub fn to_level(&self) -> Level {
        self.contraption.to_level(self.bounds)
    }

    /// Fresh engine from the contraption. Any egg in flight is dropped and
    /// the run stops.
    pub fn rebuild_engine(&mut self) {
        let seed = self.seeds.random();
        self.engine = self.contraption.build_engine(self.backend, &self.config, seed);
        self.running = false;
    }

    fn sync_gadgets(&mut self) {
        self.engine.set_gadgets(self.contraption.gadgets.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{PartKind, RampPart};
    use crate::sim::GadgetKind;

    const FRAME: f32 = 1.0 / 60.0;

    fn local(contraption: Contraption) -> Session {
        let options = SessionOptions {
            backend: BackendKind::Local,
            ..SessionOptions::default()
        };
        Session::with_options(contraption, Bounds::default(), options)
    }

    #[test]
    fn test_frame_without_play_is_idle() {
        let mut session = local(Contraption::new());
        assert_eq!(session.frame(FRAME), None);
        assert!(session.snapshot().egg.is_none());
    }

    #[test]
    fn test_egg_rolls_into_goal() {
        // Chute from under the spawn point down to the goal corner
        let chute = RampPart {
            kind: PartKind::Ramp,
            x1: 0.0,
            y1: 120.0,
            x2: 1280.0,
            y2: 720.0,
            id: 1,
        };
        let mut session = local(Contraption::from_parts(vec![chute], Vec::new()));
        session.play();

        let mut outcome = None;
        for _ in 0..2000 {
            outcome = session.frame(FRAME);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(RunOutcome::Won));
        assert!(!session.is_running());
        assert_eq!(session.goal_reaches(), 1);
        assert!(session.journey() > 1000.0);
    }

    #[test]
    fn test_pause_and_reset() {
        let mut session = local(Contraption::new());
        session.play();
        session.frame(FRAME);
        let paused_at = session.snapshot().egg.unwrap();
        session.pause();
        session.frame(FRAME);
        assert_eq!(session.snapshot().egg.unwrap(), paused_at);

        session.reset();
        assert!(session.snapshot().egg.is_none());
        assert_eq!(session.journey(), 0.0);
    }

    #[test]
    fn test_long_frames_are_capped() {
        let mut capped = local(Contraption::new());
        capped.play();
        capped.frame(1.0);

        let mut exact = local(Contraption::new());
        exact.play();
        exact.frame(MAX_FRAME_DT);

        assert_eq!(capped.snapshot(), exact.snapshot());
    }

    #[test]
    fn test_edits_reach_the_engine() {
        let mut session = local(Contraption::new());
        session.place(Tool::Ramp, Vec2::new(320.0, 320.0));
        assert_eq!(session.snapshot().ramps.len(), 1);

        let fan = session.place(Tool::Gadget(GadgetKind::Fan), Vec2::new(96.0, 96.0)).id();
        assert!(session.toggle_active(fan));
        assert!(session.engine().gadgets()[0].active);

        let ramp = session.select(Vec2::new(320.0, 322.0)).unwrap();
        assert!(session.rotate_ramp(ramp));
        let rotated = session.snapshot().ramps[0];
        assert!(rotated.y1 != rotated.y2);

        assert!(session.delete(ramp));
        assert!(session.snapshot().ramps.is_empty());
        assert_eq!(session.engine().gadgets().len(), 1);
    }

    #[test]
    fn test_load_level_rebuilds() {
        let mut source = Contraption::new();
        source.place(Tool::Ramp, Vec2::new(200.0, 300.0));
        source.place(Tool::Gadget(GadgetKind::Platform), Vec2::new(500.0, 300.0));
        let level = source.to_level(Bounds::default());

        let mut session = local(Contraption::new());
        session.play();
        session.load_level(level);
        assert!(!session.is_running());
        assert!(session.snapshot().egg.is_none());
        assert_eq!(session.snapshot().ramps.len(), 1);
        assert_eq!(session.engine().gadgets().len(), 1);
        assert_eq!(session.to_level().parts, source.parts);
    }

    fn spring_kick(seed: u64) -> f32 {
        let mut contraption = Contraption::new();
        // Spring right under the spawn point
        contraption.place(Tool::Gadget(GadgetKind::Spring), Vec2::new(80.0, 224.0));
        let options = SessionOptions {
            backend: BackendKind::Local,
            seed,
            ..SessionOptions::default()
        };
        let mut session = Session::with_options(contraption, Bounds::default(), options);
        session.play();
        for _ in 0..40 {
            session.frame(FRAME);
        }
        session.snapshot().egg.unwrap().pos.x
    }

    #[test]
    fn test_seed_drives_spring_kick() {
        assert_eq!(spring_kick(3), spring_kick(3));
        assert_ne!(spring_kick(3), spring_kick(4));
    }

    #[test]
    fn test_rebuilt_engine_gets_fresh_seed() {
        let mut contraption = Contraption::new();
        contraption.place(Tool::Gadget(GadgetKind::Spring), Vec2::new(80.0, 224.0));
        let mut session = local(contraption);

        let mut kick = || {
            session.play();
            for _ in 0..40 {
                session.frame(FRAME);
            }
            let x = session.snapshot().egg.unwrap().pos.x;
            session.rebuild_engine();
            x
        };
        let first = kick();
        let second = kick();
        assert_ne!(first, second);
    }

    #[test]
    fn test_config_reaches_engine_and_journey() {
        let config = PhysicsConfig {
            egg_spawn_x: 400.0,
            gate_forces_on_active: true,
            ..PhysicsConfig::default()
        };
        let mut contraption = Contraption::new();
        // Motor right at the new spawn point, switched off
        contraption.place(Tool::Gadget(GadgetKind::Motor), Vec2::new(400.0, 96.0));
        let mut session = local(contraption);
        session.set_config(config);
        session.play();
        session.frame(FRAME);

        let egg = session.snapshot().egg.unwrap();
        assert_eq!(egg.pos.x, 400.0);
        // Only the fall counts, measured from the configured spawn
        assert!(session.journey() < 1.0);
        assert!(session.config().gate_forces_on_active);
    }
}
