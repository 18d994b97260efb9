//! Map/marker collaborator contract
//!
//! The core never draws. Everything visual is a derived view of core
//! state, delivered through this trait to whatever map widget hosts the
//! game. Implementations must tolerate being called redundantly.

use crate::world::{Cell, CellBounds, GeoPoint};

/// Two-state cache icon, derived from the coin count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheIcon {
    /// Cache holds at least one coin
    Stocked,
    /// Cache is empty
    Empty,
}

impl CacheIcon {
    pub fn for_coin_count(count: usize) -> Self {
        if count == 0 {
            CacheIcon::Empty
        } else {
            CacheIcon::Stocked
        }
    }
}

/// Rendering callbacks for the player and the visible cache set
pub trait MarkerRenderer {
    /// Player marker moved; `trail` is the full movement history as
    /// `[lat, lng]` pairs, newest last
    fn player_moved(&mut self, at: GeoPoint, trail: &[[f64; 2]]);

    /// A cache entered the visible set
    fn cache_shown(&mut self, cell: Cell, bounds: CellBounds, icon: CacheIcon);

    /// A visible cache's coin count crossed the empty boundary
    fn cache_icon_changed(&mut self, cell: Cell, icon: CacheIcon);

    /// A cache left the visible set
    fn cache_hidden(&mut self, cell: Cell);
}

/// Renderer that narrates marker events to the log; used by the demo
/// binary and anywhere no map widget is attached
#[derive(Debug, Default)]
pub struct LogRenderer;

impl MarkerRenderer for LogRenderer {
    fn player_moved(&mut self, at: GeoPoint, trail: &[[f64; 2]]) {
        log::debug!("player at ({:.5}, {:.5}), trail {} points", at.lat, at.lng, trail.len());
    }

    fn cache_shown(&mut self, cell: Cell, _bounds: CellBounds, icon: CacheIcon) {
        log::debug!("cache ({}, {}) shown, {icon:?}", cell.i, cell.j);
    }

    fn cache_icon_changed(&mut self, cell: Cell, icon: CacheIcon) {
        log::debug!("cache ({}, {}) now {icon:?}", cell.i, cell.j);
    }

    fn cache_hidden(&mut self, cell: Cell) {
        log::debug!("cache ({}, {}) hidden", cell.i, cell.j);
    }
}

/// Test double that records every marker event in order
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<RenderEvent>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    PlayerMoved { at: (f64, f64), trail_len: usize },
    CacheShown { cell: (i32, i32), icon: CacheIcon },
    CacheIconChanged { cell: (i32, i32), icon: CacheIcon },
    CacheHidden { cell: (i32, i32) },
}

#[cfg(test)]
impl RecordingRenderer {
    pub fn shown_cells(&self) -> Vec<(i32, i32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::CacheShown { cell, .. } => Some(*cell),
                _ => None,
            })
            .collect()
    }

    pub fn hidden_cells(&self) -> Vec<(i32, i32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::CacheHidden { cell } => Some(*cell),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl MarkerRenderer for RecordingRenderer {
    fn player_moved(&mut self, at: GeoPoint, trail: &[[f64; 2]]) {
        self.events.push(RenderEvent::PlayerMoved {
            at: (at.lat, at.lng),
            trail_len: trail.len(),
        });
    }

    fn cache_shown(&mut self, cell: Cell, _bounds: CellBounds, icon: CacheIcon) {
        self.events.push(RenderEvent::CacheShown {
            cell: (cell.i, cell.j),
            icon,
        });
    }

    fn cache_icon_changed(&mut self, cell: Cell, icon: CacheIcon) {
        self.events.push(RenderEvent::CacheIconChanged {
            cell: (cell.i, cell.j),
            icon,
        });
    }

    fn cache_hidden(&mut self, cell: Cell) {
        self.events.push(RenderEvent::CacheHidden {
            cell: (cell.i, cell.j),
        });
    }
}
