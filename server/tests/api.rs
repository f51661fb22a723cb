use rocket::{
    http::{Header, Status},
    local::blocking::{Client, LocalResponse},
};
use serde_json::{Value, json};
use sweep_common::{
    models::{CreateResponse, GameParams},
    protocol::{ErrorResponse, MoveRequest, Snapshot},
};
use sweep_server::{
    Minefield, build_rocket,
    logic::{Game, Games, add_game},
    rate_limit::RateLimiter,
};

fn client() -> Client {
    Client::tracked(build_rocket()).expect("valid rocket instance")
}

fn insert_layout(client: &Client, rows: usize, cols: usize, mines: &[(usize, usize)]) -> String {
    let games = client.rocket().state::<Games>().expect("games state");
    let field = Minefield::from_mines(rows, cols, mines).expect("valid layout");
    add_game(games, Game::from_minefield(field))
}

fn create(client: &Client, rows: usize, cols: usize, mines: usize) -> LocalResponse<'_> {
    client
        .post("/api/new_game")
        .json(&GameParams { rows, cols, mines })
        .dispatch()
}

fn play<'c>(client: &'c Client, action: &str, row: usize, col: usize, id: Option<&str>) -> LocalResponse<'c> {
    client
        .post(format!("/api/{action}"))
        .json(&MoveRequest {
            row,
            col,
            id: id.map(str::to_string),
        })
        .dispatch()
}

fn snapshot(response: LocalResponse<'_>) -> Snapshot {
    assert_eq!(response.status(), Status::Ok);
    response.into_json().expect("snapshot body")
}

fn error_message(response: LocalResponse<'_>, status: Status) -> String {
    assert_eq!(response.status(), status);
    let body: ErrorResponse = response.into_json().expect("error body");
    assert_eq!(body.status, "error");
    body.message
}

#[test]
fn new_game_echoes_dimensions_and_starts_hidden() {
    let client = client();

    let response = create(&client, 4, 5, 3);
    assert_eq!(response.status(), Status::Ok);
    assert!(response.cookies().get("game_id").is_some());
    let created: CreateResponse = response.into_json().expect("create body");
    assert_eq!(created.status, "ok");
    assert_eq!((created.rows, created.cols, created.mines), (4, 5, 3));

    let state = snapshot(client.get("/api/state").dispatch());
    assert_eq!((state.rows, state.cols), (4, 5));
    assert!(!state.game_over);
    assert!(state.values.iter().flatten().all(Option::is_none));
}

#[test]
fn new_game_defaults_missing_fields() {
    let client = client();

    let response = client.post("/api/new_game").json(&json!({})).dispatch();

    let created: CreateResponse = response.into_json().expect("create body");
    assert_eq!((created.rows, created.cols, created.mines), (8, 8, 10));
}

#[test]
fn session_cookie_drives_moves() {
    let client = client();
    create(&client, 1, 2, 0);

    let state = snapshot(play(&client, "reveal", 0, 0, None));

    assert!(state.game_over);
    assert!(state.win);
    assert_eq!(state.revealed, vec![vec![true, true]]);
    assert_eq!(state.values, vec![vec![Some(0), Some(0)]]);
}

#[test]
fn snapshot_uses_camel_case_and_null_masking() {
    let client = client();
    let id = insert_layout(&client, 2, 2, &[(1, 1)]);

    let response = play(&client, "reveal", 0, 0, Some(&id));
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().expect("json body");

    assert_eq!(body["status"], "ok");
    assert_eq!(body["gameOver"], false);
    assert_eq!(body["values"][0][0], 1);
    assert!(body["values"][1][1].is_null());
}

#[test]
fn center_mine_layout_needs_every_number_opened() {
    let client = client();
    let id = insert_layout(&client, 3, 3, &[(1, 1)]);

    let first = snapshot(play(&client, "reveal", 0, 0, Some(&id)));
    assert!(!first.game_over);
    assert_eq!(first.revealed.iter().flatten().filter(|&&r| r).count(), 1);
    assert_eq!(first.values[0][0], Some(1));

    let mut last = first;
    for (row, col) in [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)] {
        last = snapshot(play(&client, "reveal", row, col, Some(&id)));
    }

    assert!(last.win);
    assert!(!last.revealed[1][1]);
    assert_eq!(last.values[1][1], None);
}

#[test]
fn mine_hit_freezes_the_board() {
    let client = client();
    let id = insert_layout(&client, 2, 2, &[(0, 0)]);

    let lost = snapshot(play(&client, "reveal", 0, 0, Some(&id)));
    assert!(lost.game_over);
    assert!(!lost.win);

    let after = snapshot(play(&client, "flag", 1, 1, Some(&id)));
    assert_eq!(after, lost);
}

#[test]
fn flags_block_reveals_and_enable_chords() {
    let client = client();
    let id = insert_layout(&client, 3, 3, &[(0, 0)]);

    let flagged = snapshot(play(&client, "flag", 0, 0, Some(&id)));
    assert!(flagged.flagged[0][0]);

    let unchanged = snapshot(play(&client, "reveal", 0, 0, Some(&id)));
    assert!(!unchanged.game_over);

    snapshot(play(&client, "reveal", 1, 1, Some(&id)));
    let chorded = snapshot(play(&client, "mass_reveal", 1, 1, Some(&id)));
    assert!(chorded.win);
    assert!(!chorded.revealed[0][0]);
}

#[test]
fn mass_reveal_on_empty_cell_is_rejected() {
    let client = client();
    let id = insert_layout(&client, 3, 3, &[(2, 2)]);

    let message = error_message(play(&client, "mass_reveal", 0, 0, Some(&id)), Status::BadRequest);
    assert_eq!(message, "Cannot auto reveal");

    let state = snapshot(client.get(format!("/api/state?id={id}")).dispatch());
    assert!(state.revealed.iter().flatten().all(|r| !r));
}

#[test]
fn unknown_games_are_not_found() {
    let client = client();

    let message = error_message(play(&client, "reveal", 0, 0, None), Status::NotFound);
    assert_eq!(message, "No game found");

    error_message(play(&client, "flag", 0, 0, Some("nope")), Status::NotFound);
    error_message(client.get("/api/state?id=nope").dispatch(), Status::NotFound);
}

#[test]
fn out_of_bounds_moves_are_rejected() {
    let client = client();
    let id = insert_layout(&client, 2, 2, &[]);

    let message = error_message(play(&client, "reveal", 2, 0, Some(&id)), Status::BadRequest);
    assert!(message.contains("out of bounds"));
    error_message(play(&client, "mass_reveal", 0, 9, Some(&id)), Status::BadRequest);
}

#[test]
fn impossible_boards_are_rejected() {
    let client = client();

    error_message(create(&client, 2, 2, 4), Status::BadRequest);
    error_message(create(&client, 0, 3, 0), Status::BadRequest);
}

#[test]
fn game_creation_is_rate_limited() {
    let client = client();

    for _ in 0..10 {
        assert_eq!(create(&client, 2, 2, 1).status(), Status::Ok);
    }

    error_message(create(&client, 2, 2, 1), Status::TooManyRequests);
}

#[test]
fn forwarded_headers_do_not_reset_the_limit() {
    let client = client();

    for i in 0..11 {
        let response = client
            .post("/api/new_game")
            .header(Header::new("X-Forwarded-For", format!("10.0.0.{i}")))
            .header(Header::new("X-Real-IP", format!("10.1.0.{i}")))
            .json(&GameParams { rows: 2, cols: 2, mines: 1 })
            .dispatch();
        let expected = if i < 10 { Status::Ok } else { Status::TooManyRequests };
        assert_eq!(response.status(), expected, "request {i}");
    }

    let limiter = client.rocket().state::<RateLimiter>().expect("rate limiter state");
    assert_eq!(limiter.len(), 1);
}
