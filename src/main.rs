//! Eggs Machina entry point
//!
//! The web build is driven from JS through `platform::web::Game`. Natively
//! this runs a headless demo contraption and reports how the egg fared.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use eggs_machina::editor::{Contraption, Tool};
    use eggs_machina::persistence::{LevelStore, MemoryStore, Slot};
    use eggs_machina::platform::{clock_seed, init_logging};
    use eggs_machina::sim::{Bounds, GadgetKind};
    use eggs_machina::{BackendKind, PhysicsConfig, RunOutcome, Session, SessionOptions};
    use glam::Vec2;

    init_logging();
    log::info!("Eggs Machina (native) starting...");

    let bounds = Bounds::default();
    let mut contraption = Contraption::new();
    let first = contraption.place(Tool::Ramp, Vec2::new(128.0, 192.0)).id();
    contraption.rotate_ramp(first);
    contraption.place(Tool::Ramp, Vec2::new(320.0, 256.0));
    contraption.place(Tool::Gadget(GadgetKind::Motor), Vec2::new(512.0, 256.0));
    contraption.place(Tool::Gadget(GadgetKind::Platform), Vec2::new(704.0, 448.0));

    // Round-trip through a save slot the way the editor would
    let mut store = MemoryStore::new();
    if let Err(e) = store.save(Slot::One, &contraption.to_level(bounds)) {
        log::error!("Save failed: {}", e);
        return;
    }
    let level = match store.load(Slot::One) {
        Ok(Some(level)) => level,
        Ok(None) => {
            log::error!("Saved level vanished");
            return;
        }
        Err(e) => {
            log::error!("Load failed: {}", e);
            return;
        }
    };

    let options = SessionOptions {
        backend: BackendKind::detect(),
        config: PhysicsConfig::load(),
        seed: clock_seed(),
    };
    log::info!("Running with seed {}", options.seed);
    let mut session = Session::with_options(Contraption::from_level(level), bounds, options);
    println!("Engine: {}", session.engine().backend_name());
    session.play();

    let frame = 1.0 / 60.0;
    let max_frames = 60 * 20;
    for n in 0..max_frames {
        if let Some(outcome) = session.frame(frame) {
            let verdict = match outcome {
                RunOutcome::Won => "reached the goal",
                RunOutcome::Lost => "fell out of the world",
            };
            println!("Egg {} after {:.1}s", verdict, (n + 1) as f32 * frame);
            break;
        }
    }
    if session.is_running() {
        if let Some(egg) = session.snapshot().egg {
            println!("Egg came to rest at ({:.0}, {:.0})", egg.pos.x, egg.pos.y);
        }
    }
    println!("Journey: {:.0}px", session.journey());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::Game, this is just to satisfy the compiler
}
