//! Deterministic cache world
//!
//! Everything that decides what exists where lives here. This module must be
//! pure and deterministic:
//! - Cell identity derived only from coordinates
//! - Spawn decisions from a seed-free string hash
//! - No rendering or platform dependencies (those enter through traits)

pub mod board;
pub mod cache;
pub mod luck;
pub mod manager;

pub use board::{Board, Cell, CellBounds, GeoPoint};
pub use cache::{Cache, CacheSnapshot, Coin, SnapshotError, deserialize_cache, serialize_cache};
pub use luck::luck;
pub use manager::CacheWorld;
