use std::{sync::Arc, time::Instant};

use dashmap::{DashMap, Entry};
use nanoid::nanoid;
use sweep_common::{
    models::{GameParams, Pos},
    protocol::Snapshot,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    data::{GameState, Minefield},
    error::Result,
};

mod game_state;
mod minefield;

pub type Games = Arc<DashMap<String, Arc<Mutex<Game>>>>;

/// A registered game session.
pub struct Game {
    state: GameState,
    last_activity: Instant,
}

impl Game {
    #[instrument(level = "trace")]
    pub fn new(params: GameParams) -> Self {
        info!(
            "Creating new game: {}x{} with {} mines",
            params.rows, params.cols, params.mines
        );
        Self::from_minefield(Minefield::generate(params.rows, params.cols, params.mines))
    }

    pub fn from_minefield(minefield: Minefield) -> Self {
        Self {
            state: GameState::new(minefield),
            last_activity: Instant::now(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_game_over()
    }

    /// Finished games are dropped sooner than abandoned ones still in play.
    pub fn should_cleanup(&self, inactive_timeout_secs: u64, finished_timeout_secs: u64) -> bool {
        let elapsed = self.last_activity.elapsed().as_secs();
        if self.is_finished() {
            elapsed > finished_timeout_secs
        } else {
            elapsed > inactive_timeout_secs
        }
    }

    #[instrument(level = "trace", skip(self), fields(row = pos.row, col = pos.col))]
    pub fn reveal(&mut self, pos: Pos) -> Result<Snapshot> {
        self.last_activity = Instant::now();
        self.state.reveal(pos.row, pos.col)?;
        Ok(self.snapshot())
    }

    #[instrument(level = "trace", skip(self), fields(row = pos.row, col = pos.col))]
    pub fn flag(&mut self, pos: Pos) -> Result<Snapshot> {
        self.last_activity = Instant::now();
        self.state.toggle_flag(pos.row, pos.col)?;
        Ok(self.snapshot())
    }

    #[instrument(level = "trace", skip(self), fields(row = pos.row, col = pos.col))]
    pub fn chord_reveal(&mut self, pos: Pos) -> Result<Snapshot> {
        self.last_activity = Instant::now();
        self.state.chord_reveal(pos.row, pos.col)?;
        Ok(self.snapshot())
    }
}

/// Stores `game` under a fresh id. Ids start short and grow once a length
/// keeps colliding.
#[instrument(level = "trace", skip(games, game))]
pub fn add_game(games: &Games, game: Game) -> String {
    let mut id_length = 5;
    let max_attempts_per_length = 10;

    loop {
        for _ in 0..max_attempts_per_length {
            let id = nanoid!(id_length);
            match games.entry(id.clone()) {
                Entry::Occupied(_) => {
                    debug!("Game ID collision, trying another: {}", id);
                    continue;
                }
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(Mutex::new(game)));
                    info!("Registered game with ID: {}", id);
                    return id;
                }
            }
        }

        warn!(
            "Exhausted ID attempts at length {}, increasing to {}",
            id_length,
            id_length + 1
        );
        id_length += 1;
    }
}

pub fn find_game(games: &Games, id: &str) -> Option<Arc<Mutex<Game>>> {
    games.get(id).map(|entry| entry.value().clone())
}
