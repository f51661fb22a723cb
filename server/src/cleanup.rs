use std::time::Duration;

use tokio::time;
use tracing::{debug, info};

use crate::{
    config::env_or,
    logic::Games,
    rate_limit::{RateLimiter, prune_rate_limiter},
};

#[derive(Debug, Clone, Copy)]
pub struct CleanupSettings {
    pub interval_secs: u64,
    pub inactive_timeout_secs: u64,
    pub finished_timeout_secs: u64,
}

impl CleanupSettings {
    pub fn from_env() -> Self {
        Self {
            interval_secs: env_or("CLEANUP_INTERVAL_SECONDS", 60),
            inactive_timeout_secs: env_or("INACTIVE_GAME_TIMEOUT_SECONDS", 600),
            finished_timeout_secs: env_or("FINISHED_GAME_TIMEOUT_SECONDS", 120),
        }
    }
}

pub async fn start_cleanup_task(games: Games, rate_limiter: RateLimiter) {
    let settings = CleanupSettings::from_env();
    let mut interval = time::interval(Duration::from_secs(settings.interval_secs.max(1)));

    info!(
        "Started game cleanup task: checking every {}s, inactive timeout: {}s, finished timeout: {}s",
        settings.interval_secs, settings.inactive_timeout_secs, settings.finished_timeout_secs
    );

    loop {
        interval.tick().await;
        cleanup_games(&games, &settings);

        let pruned = prune_rate_limiter(&rate_limiter);
        if pruned > 0 {
            debug!("Pruned {} expired rate limit windows", pruned);
        }
    }
}

/// Drops expired games and returns how many were removed. Games whose lock is
/// currently held are in use and left alone.
pub fn cleanup_games(games: &Games, settings: &CleanupSettings) -> usize {
    let mut games_to_remove = Vec::new();

    for entry in games.iter() {
        if let Ok(game) = entry.value().try_lock()
            && game.should_cleanup(settings.inactive_timeout_secs, settings.finished_timeout_secs)
        {
            games_to_remove.push(entry.key().clone());
        }
    }

    let removed_count = games_to_remove.len();
    for game_id in games_to_remove {
        games.remove(&game_id);
        debug!("Cleaned up game: {}", game_id);
    }

    if removed_count > 0 {
        info!("Cleaned up {} expired games", removed_count);
    }

    removed_count
}
