//! Tunable world parameters
//!
//! One plain record, defaulted from `consts`, injected into the session
//! so independent sessions (and tests) can run with different worlds.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::world::GeoPoint;

/// World tunables
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Degrees per cell edge
    pub tile_degrees: f64,
    /// Visibility window radius in cells (Chebyshev, inclusive)
    pub visibility_radius: u32,
    /// Probability in [0, 1] that a cell spawns a cache
    pub spawn_probability: f64,
    /// Upper bound on coins in a freshly generated cache
    pub max_coins: u32,
    /// Where a fresh run starts
    pub spawn_point: GeoPoint,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_degrees: TILE_DEGREES,
            visibility_radius: NEIGHBORHOOD_RADIUS,
            spawn_probability: CACHE_SPAWN_PROBABILITY,
            max_coins: MAX_COINS_PER_CACHE,
            spawn_point: GeoPoint::new(SPAWN_LAT, SPAWN_LNG),
        }
    }
}
