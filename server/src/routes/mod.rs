use std::sync::Arc;

use rocket::{
    State, get,
    http::{Cookie, CookieJar, SameSite},
    post,
    serde::json::Json,
};
use sweep_common::{
    models::{CreateResponse, GameParams},
    protocol::{MoveRequest, Snapshot},
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::max_board_cells,
    error::{GameError, Result},
    logic::{Game, Games, add_game, find_game},
    rate_limit::{ClientIp, RateLimiter, check_rate_limit},
};

/// Cookie holding the caller's current game id.
pub const SESSION_COOKIE: &str = "game_id";

fn validate_params(params: &GameParams) -> Result<()> {
    if params.rows == 0 || params.cols == 0 {
        return Err(GameError::InvalidParams(
            "rows and cols must be positive".to_string(),
        ));
    }

    let cells = params.cells();
    let max_cells = max_board_cells();
    if cells > max_cells {
        return Err(GameError::InvalidParams(format!(
            "board of {} cells exceeds the limit of {}",
            cells, max_cells
        )));
    }

    if params.mines >= cells {
        return Err(GameError::InvalidParams(format!(
            "{} mines do not fit on a board of {} cells",
            params.mines, cells
        )));
    }

    Ok(())
}

fn resolve_game(
    games: &Games,
    id: Option<&str>,
    cookies: &CookieJar<'_>,
) -> Result<Arc<Mutex<Game>>> {
    let id = id
        .map(str::to_string)
        .or_else(|| cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| {
            debug!("Request carried no game id");
            GameError::NotFound
        })?;

    find_game(games, &id).ok_or_else(|| {
        warn!("Request for non-existent game: {}", id);
        GameError::NotFound
    })
}

#[post("/new_game", format = "json", data = "<params>")]
#[instrument(level = "trace", skip(games, rate_limiter, cookies), fields(client_ip = %client_ip.0, rows = params.rows, cols = params.cols, mines = params.mines))]
pub fn new_game(
    params: Json<GameParams>,
    games: &State<Games>,
    rate_limiter: &State<RateLimiter>,
    client_ip: ClientIp,
    cookies: &CookieJar<'_>,
) -> Result<Json<CreateResponse>> {
    info!(
        "Game creation request from {}: {}x{} with {} mines",
        client_ip.0, params.rows, params.cols, params.mines
    );

    validate_params(&params)?;
    check_rate_limit(rate_limiter, &client_ip.0)?;

    let params = params.into_inner();
    let id = add_game(games, Game::new(params));
    cookies.add(
        Cookie::build((SESSION_COOKIE, id.clone()))
            .path("/")
            .same_site(SameSite::Lax),
    );

    info!("Successfully created game {} for client {}", id, client_ip.0);
    Ok(Json(CreateResponse {
        status: "ok".to_string(),
        id,
        rows: params.rows,
        cols: params.cols,
        mines: params.mines,
    }))
}

#[post("/reveal", format = "json", data = "<request>")]
#[instrument(level = "trace", skip(games, cookies), fields(row = request.row, col = request.col))]
pub async fn reveal(
    request: Json<MoveRequest>,
    games: &State<Games>,
    cookies: &CookieJar<'_>,
) -> Result<Json<Snapshot>> {
    let game = resolve_game(games, request.id.as_deref(), cookies)?;
    let mut game = game.lock().await;
    game.reveal(request.pos()).map(Json)
}

#[post("/flag", format = "json", data = "<request>")]
#[instrument(level = "trace", skip(games, cookies), fields(row = request.row, col = request.col))]
pub async fn flag(
    request: Json<MoveRequest>,
    games: &State<Games>,
    cookies: &CookieJar<'_>,
) -> Result<Json<Snapshot>> {
    let game = resolve_game(games, request.id.as_deref(), cookies)?;
    let mut game = game.lock().await;
    game.flag(request.pos()).map(Json)
}

#[post("/mass_reveal", format = "json", data = "<request>")]
#[instrument(level = "trace", skip(games, cookies), fields(row = request.row, col = request.col))]
pub async fn mass_reveal(
    request: Json<MoveRequest>,
    games: &State<Games>,
    cookies: &CookieJar<'_>,
) -> Result<Json<Snapshot>> {
    let game = resolve_game(games, request.id.as_deref(), cookies)?;
    let mut game = game.lock().await;
    game.chord_reveal(request.pos()).map(Json)
}

#[get("/state?<id>")]
#[instrument(level = "trace", skip(games, cookies))]
pub async fn state(
    id: Option<String>,
    games: &State<Games>,
    cookies: &CookieJar<'_>,
) -> Result<Json<Snapshot>> {
    let game = resolve_game(games, id.as_deref(), cookies)?;
    let game = game.lock().await;
    Ok(Json(game.snapshot()))
}
