use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct GameParams {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            mines: 10,
        }
    }
}

impl GameParams {
    pub fn cells(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    pub status: String,
    pub id: String,
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
}
