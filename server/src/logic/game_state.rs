use sweep_common::protocol::Snapshot;
use tracing::{debug, info, instrument, warn};

use crate::{
    data::{GameState, Minefield},
    error::{GameError, Result},
};

impl GameState {
    pub fn new(minefield: Minefield) -> Self {
        let cells = minefield.rows * minefield.cols;
        Self {
            minefield,
            revealed: vec![false; cells],
            flagged: vec![false; cells],
            revealed_safe: 0,
            game_over: false,
            win: false,
        }
    }

    pub fn minefield(&self) -> &Minefield {
        &self.minefield
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_win(&self) -> bool {
        self.win
    }

    pub fn is_revealed(&self, row: usize, col: usize) -> bool {
        self.minefield.in_bounds(row, col) && self.revealed[self.minefield.index(row, col)]
    }

    pub fn is_flagged(&self, row: usize, col: usize) -> bool {
        self.minefield.in_bounds(row, col) && self.flagged[self.minefield.index(row, col)]
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<usize> {
        if self.minefield.in_bounds(row, col) {
            Ok(self.minefield.index(row, col))
        } else {
            Err(GameError::OutOfBounds { row, col })
        }
    }

    /// Opens a cell. Hitting a mine ends the game as a loss; otherwise the
    /// zero region around the cell is opened and the game may end as a win.
    #[instrument(level = "trace", skip(self))]
    pub fn reveal(&mut self, row: usize, col: usize) -> Result<()> {
        let index = self.check_bounds(row, col)?;

        if self.game_over {
            debug!("Ignoring reveal on finished game at ({}, {})", row, col);
            return Ok(());
        }

        if self.flagged[index] {
            debug!("Ignoring reveal on flagged cell ({}, {})", row, col);
            return Ok(());
        }

        if self.minefield.is_mine(row, col) {
            warn!("Mine hit at ({}, {}) - game over!", row, col);
            self.game_over = true;
            self.win = false;
            return Ok(());
        }

        let opened = self.flood_fill(row, col);

        if self.all_safe_revealed() {
            info!("Game won! All safe cells revealed.");
            self.game_over = true;
            self.win = true;
        } else {
            debug!("Revealed {} cells, game continues", opened);
        }

        Ok(())
    }

    // Work-list instead of recursion so large empty boards cannot exhaust
    // the stack. Mines are never pushed, even next to a zero.
    fn flood_fill(&mut self, row: usize, col: usize) -> usize {
        let mut stack = vec![(row, col)];
        let mut opened = 0;

        while let Some((r, c)) = stack.pop() {
            let index = self.minefield.index(r, c);
            if self.revealed[index] {
                continue;
            }

            self.revealed[index] = true;
            self.revealed_safe += 1;
            opened += 1;

            if self.minefield.cells[index] != 0 {
                continue;
            }

            for (nr, nc) in self.minefield.neighbors(r, c) {
                let neighbor = self.minefield.index(nr, nc);
                if !self.revealed[neighbor]
                    && !self.flagged[neighbor]
                    && !self.minefield.is_mine(nr, nc)
                {
                    stack.push((nr, nc));
                }
            }
        }

        opened
    }

    fn all_safe_revealed(&self) -> bool {
        self.revealed_safe == self.minefield.cells.len() - self.minefield.mines
    }

    #[instrument(level = "trace", skip(self))]
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> Result<()> {
        let index = self.check_bounds(row, col)?;

        if self.game_over {
            debug!("Ignoring flag on finished game at ({}, {})", row, col);
            return Ok(());
        }

        if self.revealed[index] {
            debug!("Ignoring flag on revealed cell ({}, {})", row, col);
            return Ok(());
        }

        self.flagged[index] = !self.flagged[index];
        debug!(
            "Cell ({}, {}) {}",
            row,
            col,
            if self.flagged[index] { "flagged" } else { "unflagged" }
        );
        Ok(())
    }

    /// Reveals every hidden, unflagged neighbor once the number of flagged
    /// neighbors matches the cell's count.
    ///
    /// The count is read from the minefield regardless of whether the target
    /// cell itself has been revealed yet.
    #[instrument(level = "trace", skip(self))]
    pub fn chord_reveal(&mut self, row: usize, col: usize) -> Result<()> {
        let value = self.minefield.get(row, col)?;
        if value <= 0 {
            return Err(GameError::CannotAutoReveal);
        }

        let neighbors: Vec<_> = self.minefield.neighbors(row, col).collect();
        let flagged = neighbors
            .iter()
            .filter(|&&(r, c)| self.flagged[self.minefield.index(r, c)])
            .count();

        if flagged != value as usize {
            debug!(
                "Chord at ({}, {}) needs {} flags, found {}",
                row, col, value, flagged
            );
            return Ok(());
        }

        for (r, c) in neighbors {
            let index = self.minefield.index(r, c);
            if !self.revealed[index] && !self.flagged[index] {
                self.reveal(r, c)?;
            }
        }

        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let rows = self.minefield.rows;
        let cols = self.minefield.cols;
        let mut revealed = Vec::with_capacity(rows);
        let mut flagged = Vec::with_capacity(rows);
        let mut values = Vec::with_capacity(rows);

        for row in 0..rows {
            let start = row * cols;
            let range = start..start + cols;
            revealed.push(self.revealed[range.clone()].to_vec());
            flagged.push(self.flagged[range.clone()].to_vec());
            values.push(
                range
                    .map(|i| self.revealed[i].then_some(self.minefield.cells[i]))
                    .collect(),
            );
        }

        Snapshot {
            status: "ok".to_string(),
            game_over: self.game_over,
            win: self.win,
            rows,
            cols,
            revealed,
            flagged,
            values,
        }
    }
}
