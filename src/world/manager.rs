//! Visible cache set management
//!
//! Each cell moves through `Unvisited -> Dormant <-> Visible` over the
//! player's lifetime. The manager owns the `Visible` set, keyed by cell
//! coordinates: when the player moves it diffs the new visibility window
//! against the old one, tearing down leavers and materializing enterers
//! by snapshot-restore-or-generate. Cells whose spawn roll fails are
//! recomputed fresh every window change and never materialize.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::render::{CacheIcon, MarkerRenderer};
use crate::storage::{KeyValueStore, cache_key};

use super::board::{Board, Cell, GeoPoint};
use super::cache::{Cache, serialize_cache};
use super::luck::luck;

/// Owner of the currently materialized caches
pub struct CacheWorld {
    spawn_probability: f64,
    max_coins: u32,
    visible: HashMap<(i32, i32), Cache>,
}

impl CacheWorld {
    pub fn new(spawn_probability: f64, max_coins: u32) -> Self {
        Self {
            spawn_probability,
            max_coins,
            visible: HashMap::new(),
        }
    }

    /// Deterministic cache-presence decision for a cell
    pub fn spawns(&self, cell: &Cell) -> bool {
        luck(&cell.spawn_key()) < self.spawn_probability
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Coordinates of every visible cache, in stable order
    pub fn visible_cells(&self) -> Vec<(i32, i32)> {
        let mut keys: Vec<(i32, i32)> = self.visible.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn cache(&self, cell: (i32, i32)) -> Option<&Cache> {
        self.visible.get(&cell)
    }

    /// Mutate a visible cache and refresh its durable snapshot in the same
    /// step, so the stored copy never trails the in-memory one by more
    /// than a single operation
    pub fn with_cache_mut<T>(
        &mut self,
        cell: (i32, i32),
        store: &mut impl KeyValueStore,
        op: impl FnOnce(&mut Cache) -> T,
    ) -> Option<T> {
        let cache = self.visible.get_mut(&cell)?;
        let out = op(cache);
        store.set(&cache_key(cell.0, cell.1), &serialize_cache(cache));
        Some(out)
    }

    /// Recompute the visible set for a new player position. Idempotent:
    /// calling twice without movement changes nothing.
    pub fn refresh(
        &mut self,
        board: &Board,
        store: &mut impl KeyValueStore,
        renderer: &mut impl MarkerRenderer,
        center: GeoPoint,
        radius: u32,
    ) {
        let window = board.cells_near(center, radius);
        let in_window: HashSet<(i32, i32)> = window.iter().map(|c| (c.i, c.j)).collect();

        // Visible -> Dormant: snapshot is already current, only the marker goes
        let leavers: Vec<(i32, i32)> = self
            .visible
            .keys()
            .filter(|k| !in_window.contains(k))
            .copied()
            .collect();
        for key in leavers {
            self.visible.remove(&key);
            renderer.cache_hidden(Cell { i: key.0, j: key.1 });
        }

        // Enterers: restore-or-generate, skipping cells already tracked
        let mut entered = 0usize;
        for cell in window {
            let key = (cell.i, cell.j);
            if self.visible.contains_key(&key) {
                continue;
            }
            if !self.spawns(&cell) {
                continue;
            }
            let cache = self.materialize(cell, store);
            renderer.cache_shown(
                **cache.cell(),
                board.cell_bounds(cache.cell()),
                CacheIcon::for_coin_count(cache.len()),
            );
            self.visible.insert(key, cache);
            entered += 1;
        }
        if entered > 0 {
            log::debug!("{entered} caches entered the window, {} visible", self.visible.len());
        }
    }

    /// Bring one cell's cache into memory: restore its durable snapshot,
    /// or generate fresh and persist immediately so the cell is never
    /// regenerated once visited. A corrupt snapshot costs only that cell.
    fn materialize(&self, cell: Rc<Cell>, store: &mut impl KeyValueStore) -> Cache {
        let key = cache_key(cell.i, cell.j);
        if let Some(snapshot) = store.get(&key) {
            match Cache::from_snapshot(Rc::clone(&cell), &snapshot) {
                Ok(cache) => return cache,
                Err(e) => {
                    log::warn!("discarding snapshot for ({}, {}): {e}", cell.i, cell.j);
                }
            }
        }
        let cache = Cache::generate(cell, self.max_coins);
        store.set(&key, &serialize_cache(&cache));
        cache
    }

    /// Snapshot strings for every visible cache, in stable `(i, j)` order
    pub fn snapshots(&self) -> Vec<String> {
        self.visible_cells()
            .into_iter()
            .map(|key| serialize_cache(&self.visible[&key]))
            .collect()
    }

    /// Drop the whole visible set, hiding every marker
    pub fn clear(&mut self, renderer: &mut impl MarkerRenderer) {
        for key in self.visible_cells() {
            self.visible.remove(&key);
            renderer.cache_hidden(Cell { i: key.0, j: key.1 });
        }
    }
}
