use serde::{Deserialize, Serialize};

use crate::models::Pos;

/// Body of every move request. When `id` is absent the server falls back to
/// the session cookie set by game creation.
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveRequest {
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub id: Option<String>,
}

impl MoveRequest {
    pub fn pos(&self) -> Pos {
        Pos {
            row: self.row,
            col: self.col,
        }
    }
}

/// Client view of a game. `values[r][c]` is `None` for every hidden cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub status: String,
    pub game_over: bool,
    pub win: bool,
    pub rows: usize,
    pub cols: usize,
    pub revealed: Vec<Vec<bool>>,
    pub flagged: Vec<Vec<bool>>,
    pub values: Vec<Vec<Option<i8>>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}
