use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
};
use sweep_server::{
    build_rocket, cleanup::start_cleanup_task, cors::allowed_origins, logic::Games,
    rate_limit::RateLimiter,
};
use tracing::{info, warn};

struct CleanupFairing;

#[rocket::async_trait]
impl Fairing for CleanupFairing {
    fn info(&self) -> Info {
        Info {
            name: "Cleanup Task",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        match (rocket.state::<Games>(), rocket.state::<RateLimiter>()) {
            (Some(games), Some(rate_limiter)) => {
                info!("Starting cleanup task for games and rate limits");
                let games = games.clone();
                let rate_limiter = rate_limiter.clone();
                tokio::spawn(async move {
                    start_cleanup_task(games, rate_limiter).await;
                });
            }
            _ => warn!("Failed to get managed state for cleanup task"),
        }
        Ok(rocket)
    }
}

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt::init();
    info!("Starting minesweeper API server");
    info!("CORS origins: {:?}", allowed_origins());

    let rocket = build_rocket().attach(CleanupFairing);

    info!("Endpoints: POST /api/new_game, /api/reveal, /api/flag, /api/mass_reveal; GET /api/state");
    rocket
}
