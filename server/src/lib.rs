use std::sync::Arc;

use dashmap::DashMap;
use rocket::{Build, Rocket};

pub mod cleanup;
pub mod config;
pub mod cors;
pub mod data;
pub mod error;
pub mod logic;
pub mod rate_limit;
pub mod routes;

pub use data::{GameState, MINE, Minefield};
pub use error::{GameError, Result};

/// Assembles the API with fresh game and rate limiter state.
pub fn build_rocket() -> Rocket<Build> {
    let games: logic::Games = Arc::new(DashMap::new());

    rocket::build()
        .attach(cors::create_cors())
        .manage(games)
        .manage(rate_limit::create_rate_limiter())
        .mount(
            "/api",
            rocket::routes![
                routes::new_game,
                routes::reveal,
                routes::flag,
                routes::mass_reveal,
                routes::state
            ],
        )
}
