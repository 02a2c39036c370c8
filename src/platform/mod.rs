//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging setup
//! - Clock-derived RNG seeds
//! - The JS-facing game handle (web only)

/// Route `log` output to stderr (native) or the browser console (web)
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Seed for a new engine's RNG, taken from the wall clock
#[cfg(not(target_arch = "wasm32"))]
pub fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64)
}

#[cfg(target_arch = "wasm32")]
pub fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(target_arch = "wasm32")]
pub mod web {
    //! JS handle over a [`Session`]. The page owns the canvas, input and
    //! animation loop and calls into this once per event or frame.

    use glam::Vec2;
    use wasm_bindgen::prelude::*;

    use crate::config::PhysicsConfig;
    use crate::editor::{Contraption, Tool};
    use crate::engine::BackendKind;
    use crate::persistence::{LevelStore, LocalStorageStore, Slot};
    use crate::session::{RunOutcome, Session, SessionOptions};
    use crate::sim::Bounds;

    #[wasm_bindgen]
    pub struct Game {
        session: Session,
    }

    #[wasm_bindgen]
    impl Game {
        #[wasm_bindgen(constructor)]
        pub fn new(width: f32, height: f32) -> Game {
            super::init_logging();
            let options = SessionOptions {
                backend: BackendKind::detect(),
                config: PhysicsConfig::load(),
                seed: super::clock_seed(),
            };
            log::info!("Game initialized with seed: {}", options.seed);
            let bounds = Bounds::new(width, height);
            Game {
                session: Session::with_options(Contraption::new(), bounds, options),
            }
        }

        /// Current physics tuning as JSON
        pub fn physics_json(&self) -> Result<String, JsValue> {
            self.session
                .config()
                .to_json()
                .map_err(|e| JsValue::from_str(&e.to_string()))
        }

        /// Apply and persist physics tuning; missing fields take defaults.
        /// Stops any run in progress.
        pub fn set_physics(&mut self, json: &str) -> Result<(), JsValue> {
            let config =
                PhysicsConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
            config.save();
            self.session.set_config(config);
            Ok(())
        }

        /// "local" or "rapier"
        #[wasm_bindgen(getter)]
        pub fn using(&self) -> String {
            self.session.engine().backend_name().to_string()
        }

        pub fn resize(&mut self, width: f32, height: f32) {
            self.session.set_bounds(Bounds::new(width, height));
        }

        /// Drop a toolbox item; returns its id, or `undefined` for unknown kinds
        pub fn drop_part(&mut self, kind: &str, x: f32, y: f32) -> Option<u32> {
            let tool = Tool::from_str(kind)?;
            Some(self.session.place(tool, Vec2::new(x, y)).id())
        }

        pub fn select(&self, x: f32, y: f32) -> Option<u32> {
            self.session.select(Vec2::new(x, y))
        }

        pub fn rotate(&mut self, id: u32) -> bool {
            self.session.rotate_ramp(id)
        }

        pub fn tilt(&mut self, id: u32, steps: f32) -> bool {
            self.session.tilt(id, steps)
        }

        pub fn toggle(&mut self, id: u32) -> bool {
            self.session.toggle_active(id)
        }

        pub fn delete(&mut self, id: u32) -> bool {
            self.session.delete(id)
        }

        pub fn play(&mut self) {
            self.session.play();
        }

        pub fn pause(&mut self) {
            self.session.pause();
        }

        pub fn reset(&mut self) {
            self.session.reset();
        }

        /// Advance one frame; returns "won", "lost" or `undefined`
        pub fn frame(&mut self, elapsed_secs: f32) -> Option<String> {
            self.session.frame(elapsed_secs).map(|outcome| {
                match outcome {
                    RunOutcome::Won => "won",
                    RunOutcome::Lost => "lost",
                }
                .to_string()
            })
        }

        /// `{ ramps, egg }` plus the gadget list, as JSON
        pub fn snapshot_json(&self) -> String {
            let snapshot = self.session.snapshot();
            let doc = serde_json::json!({
                "ramps": snapshot.ramps,
                "egg": snapshot.egg.map(|egg| serde_json::json!({
                    "x": egg.pos.x,
                    "y": egg.pos.y,
                    "r": egg.radius,
                })),
                "gadgets": self.session.engine().gadgets(),
            });
            doc.to_string()
        }

        pub fn save(&self, slot: &str) -> Result<(), JsValue> {
            let slot = parse_slot(slot)?;
            let mut store = open_store()?;
            store
                .save(slot, &self.session.to_level())
                .map_err(|e| JsValue::from_str(&e.to_string()))
        }

        /// Returns false when the slot is empty
        pub fn load(&mut self, slot: &str) -> Result<bool, JsValue> {
            let slot = parse_slot(slot)?;
            let store = open_store()?;
            match store.load(slot) {
                Ok(Some(level)) => {
                    self.session.load_level(level);
                    Ok(true)
                }
                Ok(None) => Ok(false),
                Err(e) => Err(JsValue::from_str(&e.to_string())),
            }
        }
    }

    fn parse_slot(slot: &str) -> Result<Slot, JsValue> {
        Slot::from_str(slot).ok_or_else(|| JsValue::from_str("unknown save slot"))
    }

    fn open_store() -> Result<LocalStorageStore, JsValue> {
        LocalStorageStore::open().ok_or_else(|| JsValue::from_str("LocalStorage unavailable"))
    }
}
