//! Game session
//!
//! Single owner of all mutable game state: board, cache world, player,
//! durable store and renderer. Every UI-origin event (movement, coin
//! transfer) runs synchronously through here as one atomic unit, so no
//! locking discipline is needed anywhere in the core.

use crate::config::WorldConfig;
use crate::player::{PlayerState, SaveGame};
use crate::render::{CacheIcon, MarkerRenderer};
use crate::storage::{KeyValueStore, SAVE_KEY, cache_key};
use crate::world::{Board, CacheWorld, Coin, GeoPoint, deserialize_cache};

/// Outcome of a coin transfer request
#[derive(Debug, Clone, PartialEq)]
pub enum Transfer {
    /// The coin that moved
    Moved(Coin),
    /// Empty source, or no visible cache at the addressed cell; a no-op
    /// the UI can surface, never an error
    NothingToDo,
}

pub struct GameSession<S: KeyValueStore, R: MarkerRenderer> {
    config: WorldConfig,
    board: Board,
    world: CacheWorld,
    player: PlayerState,
    store: S,
    renderer: R,
}

impl<S: KeyValueStore, R: MarkerRenderer> GameSession<S, R> {
    /// Start a session: resume the saved run if one parses, else start
    /// fresh at the configured spawn point
    pub fn start(config: WorldConfig, store: S, renderer: R) -> Self {
        let mut session = Self {
            board: Board::new(config.tile_degrees),
            world: CacheWorld::new(config.spawn_probability, config.max_coins),
            player: PlayerState::fresh(config.spawn_point),
            config,
            store,
            renderer,
        };
        session.resume();
        session
    }

    fn resume(&mut self) {
        if let Some(json) = self.store.get(SAVE_KEY) {
            match serde_json::from_str::<SaveGame>(&json) {
                Ok(save) => {
                    // Re-file the saved visible snapshots under their
                    // per-cell keys so dormant state is intact even if
                    // those keys were lost
                    for snapshot in &save.visible_cache_snapshots {
                        if let Ok(parsed) = deserialize_cache(snapshot) {
                            self.store
                                .set(&cache_key(parsed.cell.i, parsed.cell.j), snapshot);
                        }
                    }
                    self.player = save.into_player();
                    log::info!(
                        "resumed run: {} coins carried, trail of {}",
                        self.player.inventory.len(),
                        self.player.trail.len()
                    );
                }
                Err(e) => log::warn!("ignoring unreadable save: {e}"),
            }
        } else {
            log::info!("no saved run, starting fresh");
        }
        self.sync();
    }

    /// Move the player to an absolute position (geolocation callback or
    /// manual input; both feed the same pipeline)
    pub fn move_to(&mut self, point: GeoPoint) {
        self.player.move_to(point);
        self.sync();
    }

    /// Move by whole cells (directional-button movement)
    pub fn step(&mut self, di: i32, dj: i32) {
        let t = self.config.tile_degrees;
        let p = self.player.position;
        self.move_to(GeoPoint::new(
            p.lat + di as f64 * t,
            p.lng + dj as f64 * t,
        ));
    }

    /// Render the player, recompute the visibility window, persist
    fn sync(&mut self) {
        self.renderer
            .player_moved(self.player.position, &self.player.trail);
        self.world.refresh(
            &self.board,
            &mut self.store,
            &mut self.renderer,
            self.player.position,
            self.config.visibility_radius,
        );
        self.save();
    }

    /// Move one coin from the addressed visible cache into the inventory
    pub fn collect(&mut self, cell: (i32, i32)) -> Transfer {
        match self
            .world
            .with_cache_mut(cell, &mut self.store, |c| c.pop_coin())
        {
            Some(Some(coin)) => {
                self.player.add_coin(coin.clone());
                self.after_transfer(cell);
                Transfer::Moved(coin)
            }
            _ => Transfer::NothingToDo,
        }
    }

    /// Targeted variant for per-coin UI buttons
    pub fn collect_coin(&mut self, cell: (i32, i32), id: &str) -> Transfer {
        match self
            .world
            .with_cache_mut(cell, &mut self.store, |c| c.remove_coin(id))
        {
            Some(Some(coin)) => {
                self.player.add_coin(coin.clone());
                self.after_transfer(cell);
                Transfer::Moved(coin)
            }
            _ => Transfer::NothingToDo,
        }
    }

    /// Move the most recently acquired coin from the inventory into the
    /// addressed visible cache
    pub fn deposit(&mut self, cell: (i32, i32)) -> Transfer {
        if self.world.cache(cell).is_none() {
            return Transfer::NothingToDo;
        }
        let Some(coin) = self.player.pop_coin() else {
            return Transfer::NothingToDo;
        };
        self.world
            .with_cache_mut(cell, &mut self.store, |c| c.add_coin(coin.clone()));
        self.after_transfer(cell);
        Transfer::Moved(coin)
    }

    fn after_transfer(&mut self, cell: (i32, i32)) {
        if let Some(cache) = self.world.cache(cell) {
            self.renderer
                .cache_icon_changed(**cache.cell(), CacheIcon::for_coin_count(cache.len()));
        }
        self.save();
    }

    /// Persist the whole player-state document
    pub fn save(&mut self) {
        let save = SaveGame::capture(&self.player, self.world.snapshots());
        match serde_json::to_string(&save) {
            Ok(json) => self.store.set(SAVE_KEY, &json),
            Err(e) => log::error!("save encode failed: {e}"),
        }
    }

    /// Forget the current run: inventory, trail, the visible caches and
    /// their durable snapshots. Dormant cells keep theirs and are met
    /// again as dormant, never regenerated.
    pub fn reset(&mut self) {
        for (i, j) in self.world.visible_cells() {
            self.store.remove(&cache_key(i, j));
        }
        self.world.clear(&mut self.renderer);
        self.store.remove(SAVE_KEY);
        self.player = PlayerState::fresh(self.config.spawn_point);
        log::info!("run reset");
        self.sync();
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn world(&self) -> &CacheWorld {
        &self.world
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn inventory_len(&self) -> usize {
        self.player.inventory.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;
    use crate::storage::MemoryStore;
    use crate::world::luck;

    fn test_config(spawn_probability: f64, max_coins: u32) -> WorldConfig {
        WorldConfig {
            spawn_probability,
            max_coins,
            visibility_radius: 1,
            spawn_point: GeoPoint::new(0.00005, 0.00005),
            ..WorldConfig::default()
        }
    }

    fn coin_union(session: &GameSession<MemoryStore, RecordingRenderer>) -> Vec<String> {
        let mut ids: Vec<String> = session
            .player()
            .inventory
            .iter()
            .map(|c| c.id.clone())
            .collect();
        for cell in session.world().visible_cells() {
            ids.extend(
                session
                    .world()
                    .cache(cell)
                    .unwrap()
                    .coins()
                    .iter()
                    .map(|c| c.id.clone()),
            );
        }
        ids.sort();
        ids
    }

    /// First visible cell whose cache holds at least `min` coins
    fn stocked_cell(
        session: &GameSession<MemoryStore, RecordingRenderer>,
        min: usize,
    ) -> (i32, i32) {
        session
            .world()
            .visible_cells()
            .into_iter()
            .find(|&c| session.world().cache(c).unwrap().len() >= min)
            .expect("window at probability 1.0 should hold a stocked cache")
    }

    #[test]
    fn test_conservation_under_collect_and_deposit() {
        let mut session = GameSession::start(
            test_config(1.0, 10),
            MemoryStore::new(),
            RecordingRenderer::default(),
        );
        let before = coin_union(&session);
        let cell = stocked_cell(&session, 1);
        let cache_before = session.world().cache(cell).unwrap().coins().to_vec();

        // Collect then deposit back: cache and inventory return to start
        let collected = match session.collect(cell) {
            Transfer::Moved(coin) => coin,
            Transfer::NothingToDo => panic!("cache {cell:?} should hold coins"),
        };
        assert_eq!(session.inventory_len(), 1);
        assert_eq!(coin_union(&session), before);

        match session.deposit(cell) {
            Transfer::Moved(coin) => assert_eq!(coin, collected),
            Transfer::NothingToDo => panic!("inventory should hold a coin"),
        }
        assert_eq!(session.inventory_len(), 0);
        assert_eq!(session.world().cache(cell).unwrap().coins(), &cache_before[..]);
        assert_eq!(coin_union(&session), before);
    }

    #[test]
    fn test_targeted_collect() {
        let mut session = GameSession::start(
            test_config(1.0, 10),
            MemoryStore::new(),
            RecordingRenderer::default(),
        );
        // A cell with at least two coins, so targeting matters
        let cell = stocked_cell(&session, 2);
        let wanted = session.world().cache(cell).unwrap().coins()[0].id.clone();

        match session.collect_coin(cell, &wanted) {
            Transfer::Moved(coin) => assert_eq!(coin.id, wanted),
            Transfer::NothingToDo => panic!("targeted coin should exist"),
        }
        assert_eq!(session.collect_coin(cell, &wanted), Transfer::NothingToDo);
    }

    #[test]
    fn test_empty_source_transfers_are_noops() {
        // max_coins = 1 makes every generated count floor(luck * 1) = 0
        let mut session = GameSession::start(
            test_config(1.0, 1),
            MemoryStore::new(),
            RecordingRenderer::default(),
        );
        assert!(session.world().cache((0, 0)).unwrap().is_empty());
        assert_eq!(session.collect((0, 0)), Transfer::NothingToDo);

        // Empty inventory: deposit is likewise a no-op
        assert_eq!(session.deposit((0, 0)), Transfer::NothingToDo);

        // No cache at all at the addressed cell
        let mut barren = GameSession::start(
            test_config(0.0, 10),
            MemoryStore::new(),
            RecordingRenderer::default(),
        );
        assert_eq!(barren.collect((0, 0)), Transfer::NothingToDo);
        assert_eq!(barren.deposit((0, 0)), Transfer::NothingToDo);
    }

    #[test]
    fn test_spawn_threshold_is_strict() {
        let session = GameSession::start(
            test_config(0.0, 10),
            MemoryStore::new(),
            RecordingRenderer::default(),
        );
        let cell = session.board().cell(5, 5);
        let roll = luck(&cell.spawn_key());

        // Probability exactly at the roll: no spawn; just above: spawn
        assert!(!CacheWorld::new(roll, 10).spawns(&cell));
        assert!(CacheWorld::new(roll + 1e-9, 10).spawns(&cell));
    }

    #[test]
    fn test_session_survives_restart() {
        let mut store = MemoryStore::new();
        let config = test_config(1.0, 10);

        let (position, inventory, trail, cell) = {
            let mut session =
                GameSession::start(config, store, RecordingRenderer::default());
            session.step(0, 1);
            session.step(1, 0);
            let cell = stocked_cell(&session, 1);
            assert!(matches!(session.collect(cell), Transfer::Moved(_)));
            store = session.store;
            (
                session.player.position,
                session.player.inventory.clone(),
                session.player.trail.clone(),
                cell,
            )
        };

        let session = GameSession::start(config, store, RecordingRenderer::default());
        assert_eq!(session.player().position, position);
        assert_eq!(session.player().inventory, inventory);
        assert_eq!(session.player().trail, trail);

        // The collected coin is still missing from its cache
        let carried = &inventory[0];
        assert!(
            !session
                .world()
                .cache(cell)
                .unwrap()
                .coins()
                .contains(carried)
        );
    }

    #[test]
    fn test_corrupt_save_starts_fresh() {
        let mut store = MemoryStore::new();
        store.set(SAVE_KEY, "v2:{broken");
        let session = GameSession::start(
            test_config(1.0, 10),
            store,
            RecordingRenderer::default(),
        );
        assert_eq!(session.player().position, GeoPoint::new(0.00005, 0.00005));
        assert_eq!(session.inventory_len(), 0);
        assert_eq!(session.player().trail.len(), 1);
    }

    #[test]
    fn test_step_moves_one_cell() {
        let mut session = GameSession::start(
            test_config(0.0, 10),
            MemoryStore::new(),
            RecordingRenderer::default(),
        );
        let before = session.board().cell_for_point(session.player().position);
        session.step(1, -1);
        let after = session.board().cell_for_point(session.player().position);
        assert_eq!((after.i, after.j), (before.i + 1, before.j - 1));
    }

    #[test]
    fn test_reset_forgets_the_run() {
        let mut session = GameSession::start(
            test_config(1.0, 10),
            MemoryStore::new(),
            RecordingRenderer::default(),
        );
        session.step(0, 1);
        let _ = session.collect((0, 0));

        session.reset();
        assert_eq!(session.inventory_len(), 0);
        assert_eq!(session.player().trail.len(), 1);
        assert_eq!(session.player().position, session.config().spawn_point);

        // Visible caches regenerated to their initial deterministic state
        let cache = session.world().cache((0, 0)).unwrap();
        let fresh = crate::world::Cache::generate(session.board().cell(0, 0), 10);
        assert_eq!(cache.coins(), fresh.coins());
    }
}
