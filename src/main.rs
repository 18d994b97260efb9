//! Geocoin Carrier entry point
//!
//! Handles platform-specific initialization. The native build runs a
//! short scripted walk against an in-memory store; the web build wires
//! the session to LocalStorage and leaves map wiring to the host page.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use geocoin_carrier::storage::LocalStore;
    use geocoin_carrier::world::GeoPoint;
    use geocoin_carrier::{GameSession, LogRenderer, Transfer, WorldConfig};

    /// Session handle exported to the host page; the page owns movement
    /// buttons, geolocation wiring and the map widget
    #[wasm_bindgen]
    pub struct WebGame {
        session: GameSession<LocalStore, LogRenderer>,
    }

    #[wasm_bindgen]
    impl WebGame {
        #[wasm_bindgen(constructor)]
        pub fn new() -> Self {
            Self {
                session: GameSession::start(
                    WorldConfig::default(),
                    LocalStore::new(),
                    LogRenderer,
                ),
            }
        }

        pub fn move_to(&mut self, lat: f64, lng: f64) {
            self.session.move_to(GeoPoint::new(lat, lng));
        }

        pub fn step(&mut self, di: i32, dj: i32) {
            self.session.step(di, dj);
        }

        /// Returns the moved coin's id, or null when there was nothing to do
        pub fn collect(&mut self, i: i32, j: i32) -> Option<String> {
            match self.session.collect((i, j)) {
                Transfer::Moved(coin) => Some(coin.id),
                Transfer::NothingToDo => None,
            }
        }

        pub fn deposit(&mut self, i: i32, j: i32) -> Option<String> {
            match self.session.deposit((i, j)) {
                Transfer::Moved(coin) => Some(coin.id),
                Transfer::NothingToDo => None,
            }
        }

        pub fn reset(&mut self) {
            self.session.reset();
        }

        pub fn coins_carried(&self) -> usize {
            self.session.inventory_len()
        }
    }

    #[wasm_bindgen(start)]
    pub fn wasm_start() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("Geocoin Carrier starting...");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start; this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use geocoin_carrier::{GameSession, LogRenderer, MemoryStore, Transfer, WorldConfig};

    env_logger::init();
    log::info!("Geocoin Carrier (native) starting...");

    let mut session =
        GameSession::start(WorldConfig::default(), MemoryStore::new(), LogRenderer);
    println!(
        "spawned at ({:.5}, {:.5}); {} caches in view",
        session.player().position.lat,
        session.player().position.lng,
        session.world().visible_len()
    );

    // Scripted walk: wander east, picking up whatever is in reach
    for _ in 0..10 {
        session.step(0, 1);
        for cell in session.world().visible_cells() {
            if let Transfer::Moved(coin) = session.collect(cell) {
                println!("picked up {} at ({}, {})", coin.id, cell.0, cell.1);
            }
        }
    }

    // Drop one coin back off, if we carry any
    if let Some(cell) = session.world().visible_cells().first().copied() {
        if let Transfer::Moved(coin) = session.deposit(cell) {
            println!("deposited {} at ({}, {})", coin.id, cell.0, cell.1);
        }
    }

    println!(
        "walk finished: {} coins carried, trail of {} points",
        session.inventory_len(),
        session.player().trail.len()
    );
}
