//! Cache entity and snapshot serialization
//!
//! A cache is a per-cell container of coins. Its durable snapshot is the
//! source of truth; the in-memory entity is the materialized view while
//! the cell is visible. Serialization lives in free functions over a
//! plain record so the storage format stays decoupled from behavior.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::board::Cell;
use super::luck::luck;

/// A uniquely identified, non-fungible collectible token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
}

impl Coin {
    /// Coin minted at cache generation time: `"{i}:{j}#{k}"` with `k`
    /// zero-based within the cache's initial set
    pub fn minted(cell: &Cell, k: u32) -> Self {
        Self {
            id: format!("{}:{}#{}", cell.i, cell.j, k),
        }
    }

    /// Cell of origin parsed back out of a minted id, if it has one
    pub fn home_cell(&self) -> Option<(i32, i32)> {
        let (cell_part, _) = self.id.split_once('#')?;
        let (i, j) = cell_part.split_once(':')?;
        Some((i.parse().ok()?, j.parse().ok()?))
    }
}

/// A materialized cache bound to exactly one cell
#[derive(Debug, Clone)]
pub struct Cache {
    cell: Rc<Cell>,
    coins: Vec<Coin>,
}

impl Cache {
    /// Freshly generate a cache for a cell that has never been visited.
    /// The coin count is a deterministic function of the cell alone, so
    /// the same cell always starts with the same coins.
    pub fn generate(cell: Rc<Cell>, max_coins: u32) -> Self {
        let count = (luck(&cell.coin_count_key()) * max_coins as f64).floor() as u32;
        let coins = (0..count).map(|k| Coin::minted(&cell, k)).collect();
        Self { cell, coins }
    }

    /// Restore a cache from its durable snapshot. A snapshot filed under
    /// the wrong cell is treated as corrupt.
    pub fn from_snapshot(cell: Rc<Cell>, snapshot: &str) -> Result<Self, SnapshotError> {
        let parsed = deserialize_cache(snapshot)?;
        if parsed.cell != *cell {
            return Err(SnapshotError::WrongCell {
                expected: (cell.i, cell.j),
                found: (parsed.cell.i, parsed.cell.j),
            });
        }
        Ok(Self {
            cell,
            coins: parsed.coins,
        })
    }

    #[inline]
    pub fn cell(&self) -> &Rc<Cell> {
        &self.cell
    }

    #[inline]
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Take the most recently added coin, if any
    pub fn pop_coin(&mut self) -> Option<Coin> {
        self.coins.pop()
    }

    /// Take a specific coin by id, if present
    pub fn remove_coin(&mut self, id: &str) -> Option<Coin> {
        let at = self.coins.iter().position(|c| c.id == id)?;
        Some(self.coins.remove(at))
    }

    pub fn add_coin(&mut self, coin: Coin) {
        self.coins.push(coin);
    }

    /// Empty the cache, returning everything it held
    pub fn remove_all(&mut self) -> Vec<Coin> {
        std::mem::take(&mut self.coins)
    }
}

/// Persisted form of a cache: `{"cell":{"i":..,"j":..},"coins":[{"id":..},..]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub cell: Cell,
    pub coins: Vec<Coin>,
}

/// Lossless encoding of a cache's `{cell, coins}` pair
pub fn serialize_cache(cache: &Cache) -> String {
    let snapshot = CacheSnapshot {
        cell: *cache.cell,
        coins: cache.coins.clone(),
    };
    match serde_json::to_string(&snapshot) {
        Ok(json) => json,
        Err(e) => {
            log::error!("cache snapshot encode failed for {:?}: {e}", *cache.cell);
            String::new()
        }
    }
}

/// Decode a snapshot string; malformed input is reported, never a panic
pub fn deserialize_cache(snapshot: &str) -> Result<CacheSnapshot, SnapshotError> {
    serde_json::from_str(snapshot).map_err(SnapshotError::Corrupt)
}

/// Failure modes when reading a persisted snapshot
#[derive(Debug)]
pub enum SnapshotError {
    /// Not a well-formed snapshot encoding
    Corrupt(serde_json::Error),
    /// Well-formed, but filed under a different cell than it claims
    WrongCell {
        expected: (i32, i32),
        found: (i32, i32),
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Corrupt(e) => write!(f, "corrupt cache snapshot: {e}"),
            SnapshotError::WrongCell { expected, found } => write!(
                f,
                "snapshot cell mismatch: expected {expected:?}, found {found:?}"
            ),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Corrupt(e) => Some(e),
            SnapshotError::WrongCell { .. } => None,
        }
    }
}
