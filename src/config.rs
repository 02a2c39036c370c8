//! Physics tuning
//!
//! Every constant the fallback engine reads, gathered in one serde struct so a
//! level author can tweak the feel without recompiling. Persisted under its
//! own key in the same store as the level slots.

use serde::{Deserialize, Serialize};

use crate::consts::*;
#[cfg(target_arch = "wasm32")]
use crate::persistence::LocalStorageStore;
use crate::persistence::{LevelError, LevelStore};

/// Tunable physics parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsConfig {
    // === World ===
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Contact damping multiplier
    pub friction: f32,
    /// Bounce retention
    pub restitution: f32,
    /// Extra contact distance around ramps
    pub ramp_margin: f32,

    // === Egg ===
    pub egg_radius: f32,
    pub egg_spawn_x: f32,
    pub egg_spawn_y: f32,

    // === Gadgets ===
    pub spring_launch_vy: f32,
    pub spring_jitter: f32,
    pub fan_force: f32,
    pub fan_lift_ratio: f32,
    pub fan_range: f32,
    pub pendulum_force: f32,
    pub pendulum_range: f32,
    pub pendulum_phase_rate: f32,
    pub motor_force: f32,
    pub motor_range: f32,
    pub tilt_kick: f32,
    /// Only push with fans and motors that have been switched on
    pub gate_forces_on_active: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            restitution: RESTITUTION,
            ramp_margin: RAMP_MARGIN,

            egg_radius: EGG_RADIUS,
            egg_spawn_x: EGG_SPAWN.x,
            egg_spawn_y: EGG_SPAWN.y,

            spring_launch_vy: SPRING_LAUNCH_VY,
            spring_jitter: SPRING_JITTER,
            fan_force: FAN_FORCE,
            fan_lift_ratio: FAN_LIFT_RATIO,
            fan_range: FAN_RANGE,
            pendulum_force: PENDULUM_FORCE,
            pendulum_range: PENDULUM_RANGE,
            pendulum_phase_rate: PENDULUM_PHASE_RATE,
            motor_force: MOTOR_FORCE,
            motor_range: MOTOR_RANGE,
            tilt_kick: TILT_KICK,
            gate_forces_on_active: false,
        }
    }
}

impl PhysicsConfig {
    /// Parse a config; missing fields take their default values
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Storage key, next to the level slots
    pub const STORAGE_KEY: &'static str = "eggs_machina_physics";

    /// Stored config, or defaults when the key is empty, unreadable or
    /// holds something that is not a config
    pub fn load_from(store: &impl LevelStore) -> Self {
        match store.read(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded physics config");
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring stored physics config: {}", e);
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Physics config unavailable: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, store: &mut impl LevelStore) -> Result<(), LevelError> {
        store.write(Self::STORAGE_KEY, self.to_json()?)?;
        log::info!("Physics config saved");
        Ok(())
    }

    /// Config from LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        LocalStorageStore::open()
            .map(|store| Self::load_from(&store))
            .unwrap_or_default()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(mut store) = LocalStorageStore::open() else {
            log::warn!("LocalStorage unavailable, physics config not saved");
            return;
        };
        if let Err(e) = self.save_to(&mut store) {
            log::warn!("Physics config not saved: {}", e);
        }
    }

    /// Native builds keep no config between runs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_match_constants() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, 1200.0);
        assert_eq!(config.friction, 0.995);
        assert_eq!(config.restitution, 0.25);
        assert_eq!(config.egg_radius, 16.0);
        assert!(!config.gate_forces_on_active);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PhysicsConfig::from_json(r#"{"gravity": 600.0, "gateForcesOnActive": true}"#)
            .unwrap();
        assert_eq!(config.gravity, 600.0);
        assert!(config.gate_forces_on_active);
        assert_eq!(config.restitution, RESTITUTION);
        assert_eq!(config.fan_range, FAN_RANGE);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(PhysicsConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(PhysicsConfig::load_from(&store), PhysicsConfig::default());

        let config = PhysicsConfig {
            gate_forces_on_active: true,
            spring_jitter: 0.0,
            ..PhysicsConfig::default()
        };
        config.save_to(&mut store).unwrap();
        assert_eq!(PhysicsConfig::load_from(&store), config);
    }

    #[test]
    fn test_corrupted_store_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.write(PhysicsConfig::STORAGE_KEY, "[1, 2".to_string()).unwrap();
        assert_eq!(PhysicsConfig::load_from(&store), PhysicsConfig::default());
    }
}
