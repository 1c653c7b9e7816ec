//! Parity-based win detection.

use oddeven_protocol::{Role, BOARD_SIDE, LINE_LEN};

use crate::Board;

/// Number of winning lines: every row, every column, both diagonals.
pub const LINE_COUNT: usize = 2 * BOARD_SIDE + 2;

/// All winning lines in evaluation order: rows top to bottom, columns left
/// to right, the main diagonal, then the anti-diagonal.
///
/// The order is the tie-break when one increment completes several lines.
pub const WINNING_LINES: [[usize; LINE_LEN]; LINE_COUNT] = build_lines();

const fn build_lines() -> [[usize; LINE_LEN]; LINE_COUNT] {
    let mut lines = [[0; LINE_LEN]; LINE_COUNT];
    let mut i = 0;
    while i < BOARD_SIDE {
        let mut j = 0;
        while j < LINE_LEN {
            lines[i][j] = i * BOARD_SIDE + j;
            lines[BOARD_SIDE + i][j] = j * BOARD_SIDE + i;
            j += 1;
        }
        lines[2 * BOARD_SIDE][i] = i * BOARD_SIDE + i;
        lines[2 * BOARD_SIDE + 1][i] = i * BOARD_SIDE + (BOARD_SIDE - 1 - i);
        i += 1;
    }
    lines
}

/// A completed line and the role it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinResult {
    pub winner: Role,
    pub line: [usize; LINE_LEN],
}

/// Returns the first line whose cells are all non-zero and share a parity.
///
/// There is no draw: a saturated board without such a line is still in
/// play.
pub fn evaluate(board: &Board) -> Option<WinResult> {
    WINNING_LINES.iter().find_map(|line| {
        let owner = line_owner(board, line)?;
        Some(WinResult {
            winner: owner,
            line: *line,
        })
    })
}

fn line_owner(board: &Board, line: &[usize; LINE_LEN]) -> Option<Role> {
    let mut owners = line
        .iter()
        .map(|&i| board.get(i).and_then(Role::owning));
    let first = owners.next()??;
    owners.all(|o| o == Some(first)).then_some(first)
}

#[cfg(test)]
mod tests {
    use oddeven_protocol::BOARD_CELLS;

    use super::*;

    fn board_with(cells: &[(usize, u64)]) -> Board {
        let mut values = [0; BOARD_CELLS];
        for &(i, v) in cells {
            values[i] = v;
        }
        Board::from_cells(values)
    }

    #[test]
    fn test_lines_are_in_fixed_order() {
        assert_eq!(WINNING_LINES[0], [0, 1, 2, 3, 4]);
        assert_eq!(WINNING_LINES[4], [20, 21, 22, 23, 24]);
        assert_eq!(WINNING_LINES[5], [0, 5, 10, 15, 20]);
        assert_eq!(WINNING_LINES[9], [4, 9, 14, 19, 24]);
        assert_eq!(WINNING_LINES[10], [0, 6, 12, 18, 24]);
        assert_eq!(WINNING_LINES[11], [4, 8, 12, 16, 20]);
    }

    #[test]
    fn test_empty_board_has_no_winner() {
        assert_eq!(evaluate(&Board::new()), None);
    }

    #[test]
    fn test_odd_diagonal_wins() {
        let board = board_with(&[(0, 1), (6, 1), (12, 1), (18, 1), (24, 1)]);
        assert_eq!(
            evaluate(&board),
            Some(WinResult {
                winner: Role::Odd,
                line: [0, 6, 12, 18, 24],
            })
        );
    }

    #[test]
    fn test_even_column_wins() {
        let board = board_with(&[(2, 2), (7, 4), (12, 2), (17, 6), (22, 2)]);
        assert_eq!(
            evaluate(&board),
            Some(WinResult {
                winner: Role::Even,
                line: [2, 7, 12, 17, 22],
            })
        );
    }

    #[test]
    fn test_mixed_values_of_same_parity_win() {
        let board = board_with(&[(20, 1), (21, 3), (22, 5), (23, 7), (24, 9)]);
        assert_eq!(evaluate(&board).map(|w| w.winner), Some(Role::Odd));
    }

    #[test]
    fn test_zero_cell_blocks_even_line() {
        // Zero is even but means "untouched", so it never completes a line.
        let board = board_with(&[(0, 2), (1, 2), (2, 2), (3, 2)]);
        assert_eq!(evaluate(&board), None);
    }

    #[test]
    fn test_mixed_parity_line_does_not_win() {
        let board = board_with(&[(0, 1), (1, 1), (2, 2), (3, 1), (4, 1)]);
        assert_eq!(evaluate(&board), None);
    }

    #[test]
    fn test_earliest_line_wins_tie() {
        // Row 0 and the main diagonal are both complete; the row comes first.
        let board = board_with(&[
            (0, 1),
            (1, 1),
            (2, 1),
            (3, 1),
            (4, 1),
            (6, 1),
            (12, 1),
            (18, 1),
            (24, 1),
        ]);
        assert_eq!(evaluate(&board).map(|w| w.line), Some([0, 1, 2, 3, 4]));
    }

    #[test]
    fn test_row_beats_column_sharing_a_cell() {
        let board = board_with(&[
            (10, 2),
            (11, 2),
            (12, 2),
            (13, 2),
            (14, 2),
            (2, 4),
            (7, 4),
            (17, 4),
            (22, 4),
        ]);
        assert_eq!(
            evaluate(&board),
            Some(WinResult {
                winner: Role::Even,
                line: [10, 11, 12, 13, 14],
            })
        );
    }

    #[test]
    fn test_saturated_board_without_uniform_line_has_no_winner() {
        // Checkerboard parity mixes every row and column.
        let mut values = [0; BOARD_CELLS];
        for (i, v) in values.iter_mut().enumerate() {
            let (r, c) = (i / BOARD_SIDE, i % BOARD_SIDE);
            *v = if (r + c) % 2 == 0 { 1 } else { 2 };
        }
        // The checkerboard makes both diagonals uniform, so break them.
        values[0] = 2;
        values[4] = 2;
        let board = Board::from_cells(values);
        assert!(board.cells().iter().all(|&v| v > 0));
        assert_eq!(evaluate(&board), None);
    }
}
