//! The shared 5×5 counter board.

use oddeven_protocol::BOARD_CELLS;

use crate::SessionError;

/// A 5×5 grid of unbounded counters, stored row-major.
///
/// Increment is the only mutation. Any player may bump any cell any number
/// of times; the parity of the final value decides who owns the cell, so
/// two near-simultaneous increments commute and the board only depends on
/// how many landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [u64; BOARD_CELLS],
}

impl Board {
    /// Creates an all-zero board.
    pub fn new() -> Self {
        Self {
            cells: [0; BOARD_CELLS],
        }
    }

    /// Creates a board from explicit cell values.
    pub fn from_cells(cells: [u64; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    /// Adds one to the cell at `index` and returns its new value.
    ///
    /// # Errors
    /// Returns [`SessionError::OutOfRange`] unless `index < 25`; the board
    /// is left untouched.
    pub fn increment(&mut self, index: usize) -> Result<u64, SessionError> {
        let cell = self.cells.get_mut(index).ok_or_else(|| {
            SessionError::OutOfRange(i64::try_from(index).unwrap_or(i64::MAX))
        })?;
        *cell += 1;
        Ok(*cell)
    }

    /// Returns the value at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<u64> {
        self.cells.get(index).copied()
    }

    /// Returns a copy of all cells in wire order.
    pub fn cells(&self) -> [u64; BOARD_CELLS] {
        self.cells
    }

    /// Returns `true` when no cell has been touched.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&v| v == 0)
    }

    /// Zeroes every cell.
    pub fn reset(&mut self) {
        self.cells = [0; BOARD_CELLS];
    }
}

/// Validates a wire square index and converts it to a cell index.
///
/// # Errors
/// Returns [`SessionError::OutOfRange`] for anything outside `0..25`.
pub fn square_index(square: i64) -> Result<usize, SessionError> {
    usize::try_from(square)
        .ok()
        .filter(|&i| i < BOARD_CELLS)
        .ok_or(SessionError::OutOfRange(square))
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
