/// Cell value marking a mine. Every other cell holds its neighbor mine count.
pub const MINE: i8 = -1;

/// Immutable mine layout, cells stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minefield {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) mines: usize,
    pub(crate) cells: Vec<i8>,
}

/// Per-session reveal and flag state over one minefield.
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) minefield: Minefield,
    pub(crate) revealed: Vec<bool>,
    pub(crate) flagged: Vec<bool>,
    pub(crate) revealed_safe: usize,
    pub(crate) game_over: bool,
    pub(crate) win: bool,
}
