use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::{
    data::{MINE, Minefield},
    error::{GameError, Result},
};

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Minefield {
    pub fn generate(rows: usize, cols: usize, mines: usize) -> Self {
        Self::generate_with(rows, cols, mines, &mut rand::rng())
    }

    /// Places `mines` distinct mines uniformly at random by rejection sampling.
    #[instrument(level = "trace", skip(rng))]
    pub fn generate_with<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        mines: usize,
        rng: &mut R,
    ) -> Self {
        let total = rows * cols;
        let target = if mines >= total {
            let clamped = total.saturating_sub(1);
            warn!(
                "Requested {} mines on a {}x{} board, clamping to {}",
                mines, rows, cols, clamped
            );
            clamped
        } else {
            mines
        };

        let mut positions = HashSet::with_capacity(target);
        while positions.len() < target {
            positions.insert((rng.random_range(0..rows), rng.random_range(0..cols)));
        }

        debug!("Placed {} mines on {}x{} board", target, rows, cols);
        Self::with_mines(rows, cols, positions)
    }

    /// Builds a fixed layout. Duplicate positions count once.
    pub fn from_mines(rows: usize, cols: usize, mines: &[(usize, usize)]) -> Result<Self> {
        let mut positions = HashSet::with_capacity(mines.len());
        for &(row, col) in mines {
            if row >= rows || col >= cols {
                return Err(GameError::OutOfBounds { row, col });
            }
            positions.insert((row, col));
        }
        Ok(Self::with_mines(rows, cols, positions))
    }

    fn with_mines(rows: usize, cols: usize, positions: HashSet<(usize, usize)>) -> Self {
        let mut field = Self {
            rows,
            cols,
            mines: positions.len(),
            cells: vec![0; rows * cols],
        };

        for &(row, col) in &positions {
            field.cells[row * cols + col] = MINE;
        }

        for &(row, col) in &positions {
            let neighbors: Vec<_> = field.neighbors(row, col).collect();
            for (nr, nc) in neighbors {
                let cell = &mut field.cells[nr * cols + nc];
                if *cell != MINE {
                    *cell += 1;
                }
            }
        }

        field
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Result<i8> {
        if self.in_bounds(row, col) {
            Ok(self.value(row, col))
        } else {
            Err(GameError::OutOfBounds { row, col })
        }
    }

    pub fn is_mine(&self, row: usize, col: usize) -> bool {
        self.in_bounds(row, col) && self.value(row, col) == MINE
    }

    /// In-bounds cells at Chebyshev distance 1.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let nr = row.checked_add_signed(dr)?;
            let nc = col.checked_add_signed(dc)?;
            self.in_bounds(nr, nc).then_some((nr, nc))
        })
    }

    pub(crate) fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    // Callers bounds-check first.
    pub(crate) fn value(&self, row: usize, col: usize) -> i8 {
        self.cells[self.index(row, col)]
    }
}
