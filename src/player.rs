//! Player state and the whole-run save document
//!
//! Position, inventory and movement trail travel together: the entire
//! player state is written as one document on every movement and read
//! back wholesale at startup.

use serde::{Deserialize, Serialize};

use crate::world::{Coin, GeoPoint};

/// Everything the player carries across sessions
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub position: GeoPoint,
    pub inventory: Vec<Coin>,
    /// `[lat, lng]` pairs, one per movement, newest last
    pub trail: Vec<[f64; 2]>,
}

impl PlayerState {
    /// Fresh run starting at `spawn`; the spawn point is the first trail
    /// entry so the rendered trail starts where the player did
    pub fn fresh(spawn: GeoPoint) -> Self {
        Self {
            position: spawn,
            inventory: Vec::new(),
            trail: vec![[spawn.lat, spawn.lng]],
        }
    }

    /// Record a movement
    pub fn move_to(&mut self, point: GeoPoint) {
        self.position = point;
        self.trail.push([point.lat, point.lng]);
    }

    /// Take the most recently acquired coin, if any
    pub fn pop_coin(&mut self) -> Option<Coin> {
        self.inventory.pop()
    }

    pub fn add_coin(&mut self, coin: Coin) {
        self.inventory.push(coin);
    }

    pub fn coin_ids(&self) -> Vec<&str> {
        self.inventory.iter().map(|c| c.id.as_str()).collect()
    }
}

/// Persisted save document; field names are part of the storage format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGame {
    pub position: GeoPoint,
    pub inventory: Vec<Coin>,
    pub visible_cache_snapshots: Vec<String>,
    pub movement_trail: Vec<[f64; 2]>,
}

impl SaveGame {
    pub fn capture(player: &PlayerState, visible_cache_snapshots: Vec<String>) -> Self {
        Self {
            position: player.position,
            inventory: player.inventory.clone(),
            visible_cache_snapshots,
            movement_trail: player.trail.clone(),
        }
    }

    /// Player-state half of the document
    pub fn into_player(self) -> PlayerState {
        PlayerState {
            position: self.position,
            inventory: self.inventory,
            trail: self.movement_trail,
        }
    }
}
