//! Geocoin Carrier - a location-based coin-collecting game
//!
//! Core modules:
//! - `world`: Deterministic cache world (cell grid, spawn decisions, caches)
//! - `player`: Player position, inventory and movement trail
//! - `session`: Game session tying world, player, storage and rendering together
//! - `storage`: Durable key-value store abstraction (LocalStorage on web)
//! - `render`: Map/marker collaborator contract
//! - `config`: Tunable world parameters

pub mod config;
pub mod player;
pub mod render;
pub mod session;
pub mod storage;
pub mod world;

pub use config::WorldConfig;
pub use player::PlayerState;
pub use render::{CacheIcon, LogRenderer, MarkerRenderer};
pub use session::{GameSession, Transfer};
pub use storage::{KeyValueStore, MemoryStore};
pub use world::{Board, Cache, Cell, CellBounds, GeoPoint, luck};

/// Game configuration constants
pub mod consts {
    /// Degree size of one grid cell edge
    pub const TILE_DEGREES: f64 = 1e-4;
    /// Visibility window radius, in cells (Chebyshev, inclusive)
    pub const NEIGHBORHOOD_RADIUS: u32 = 8;
    /// Probability that a cell spawns a cache
    pub const CACHE_SPAWN_PROBABILITY: f64 = 0.1;
    /// Upper bound on coins in a freshly generated cache
    pub const MAX_COINS_PER_CACHE: u32 = 10;

    /// Default spawn point (campus courtyard)
    pub const SPAWN_LAT: f64 = 36.9895;
    pub const SPAWN_LNG: f64 = -122.0627;
}
