//! Board state, move legality, and the label format used as a table key

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Contents of one square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | ' ' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }
}

/// One of the two sides. X always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Player::X => "X",
            Player::O => "O",
        })
    }
}

/// A move on the board: a position together with the mark that is placed.
///
/// An action is only meaningful relative to the state it was enumerated from;
/// applying it elsewhere is rejected by the transition model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub position: usize,
    pub player: Player,
}

/// Snapshot of the board plus the side to move.
///
/// Ten bytes, `Copy`, with structural equality and hashing, so states serve
/// directly as keys in value and Q-tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; 9],
    pub to_move: Player,
}

impl BoardState {
    /// The empty board with X to open
    pub fn new() -> Self {
        BoardState {
            cells: [Cell::Empty; 9],
            to_move: Player::X,
        }
    }

    fn mark_count(&self, mark: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == mark).count()
    }

    /// Parse the `"XOX......_P"` label form, where the first nine characters
    /// are cells read left to right, top to bottom, and `P` is the side to
    /// move.
    ///
    /// # Errors
    ///
    /// Rejects labels whose shape is wrong, whose cells are not valid marks,
    /// whose piece counts are impossible under X-first play, whose turn
    /// suffix disagrees with the piece counts, or where both sides hold a
    /// completed line.
    pub fn from_label(label: &str) -> Result<Self, Error> {
        let Some((board_part, turn_part)) = label.split_once('_') else {
            return Err(Error::MissingLabelPart {
                part: "player".to_string(),
                label: label.to_string(),
            });
        };

        if board_part.len() != 9 || turn_part.len() != 1 {
            return Err(Error::InvalidLabelFormat {
                label: label.to_string(),
                expected: "XXXXXXXXX_P".to_string(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (position, character) in board_part.chars().enumerate() {
            cells[position] =
                Cell::from_char(character).ok_or_else(|| Error::InvalidCellCharacter {
                    character,
                    position,
                    context: label.to_string(),
                })?;
        }

        let to_move = match turn_part {
            "X" => Player::X,
            "O" => Player::O,
            other => {
                return Err(Error::InvalidPlayerString {
                    player: other.to_string(),
                    label: label.to_string(),
                });
            }
        };

        let state = BoardState { cells, to_move };
        let x_count = state.mark_count(Cell::X);
        let o_count = state.mark_count(Cell::O);

        // X-first play fixes the turn given the counts
        let derived = match x_count.checked_sub(o_count) {
            Some(0) => Player::X,
            Some(1) => Player::O,
            _ => return Err(Error::InvalidPieceCounts { x_count, o_count }),
        };
        if derived != to_move {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "piece counts (X={x_count}, O={o_count}) are inconsistent with {to_move} to move in '{label}'"
                ),
            });
        }

        if state.has_won(Player::X) && state.has_won(Player::O) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "invalid board label '{label}': both players cannot have winning lines"
                ),
            });
        }

        Ok(state)
    }

    pub fn occupied_count(&self) -> usize {
        9 - self.mark_count(Cell::Empty)
    }

    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    fn empty_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(pos, _)| pos)
    }

    /// Place the current player's mark at `pos`, returning the next state
    #[must_use = "make_move returns a new board state; the original is unchanged"]
    pub fn make_move(&self, pos: usize) -> Result<BoardState, Error> {
        if pos >= 9 || !self.is_empty(pos) {
            return Err(Error::InvalidMove { position: pos });
        }

        let mut next = *self;
        next.cells[pos] = self.to_move.to_cell();
        next.to_move = self.to_move.opponent();
        Ok(next)
    }

    /// Playable positions, empty when the game is over
    pub fn legal_moves(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.empty_positions().collect()
    }

    /// Legal actions for the side to move, empty for terminal states
    pub fn possible_actions(&self) -> Vec<Action> {
        self.legal_moves()
            .into_iter()
            .map(|position| Action {
                position,
                player: self.to_move,
            })
            .collect()
    }

    pub fn has_won(&self, player: Player) -> bool {
        super::lines::has_won(&self.cells, player)
    }

    pub fn is_terminal(&self) -> bool {
        self.has_won(Player::X)
            || self.has_won(Player::O)
            || !self.cells.contains(&Cell::Empty)
    }

    pub fn is_draw(&self) -> bool {
        !self.cells.contains(&Cell::Empty) && self.winner().is_none()
    }

    pub fn winner(&self) -> Option<Player> {
        [Player::X, Player::O]
            .into_iter()
            .find(|&p| self.has_won(p))
    }

    /// The label form of this state, the inverse of [`BoardState::from_label`]
    pub fn encode(&self) -> String {
        let board: String = self.cells.iter().map(|&c| c.to_char()).collect();
        format!("{board}_{}", self.to_move)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for &cell in chunk {
                write!(f, "{}", cell.to_char())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn played(moves: &[usize]) -> BoardState {
        moves.iter().fold(BoardState::new(), |state, &pos| {
            state.make_move(pos).unwrap()
        })
    }

    #[test]
    fn empty_board_has_x_to_open() {
        let board = BoardState::new();
        assert_eq!(board.to_move, Player::X);
        assert_eq!(board.occupied_count(), 0);
        assert_eq!(board.legal_moves().len(), 9);
    }

    #[test]
    fn make_move_places_the_mark_and_flips_the_turn() {
        let board = BoardState::new().make_move(4).unwrap();
        assert_eq!(board.cells[4], Cell::X);
        assert_eq!(board.to_move, Player::O);

        assert!(matches!(
            board.make_move(4),
            Err(Error::InvalidMove { position: 4 })
        ));
        assert!(board.make_move(9).is_err());
    }

    #[test]
    fn legal_moves_shrink_as_the_board_fills() {
        let board = played(&[0, 4]);
        let moves = board.legal_moves();
        assert_eq!(moves.len(), 7);
        assert!(!moves.contains(&0));
        assert!(!moves.contains(&4));
    }

    #[test]
    fn possible_actions_carry_the_mover() {
        let board = played(&[0]);
        let actions = board.possible_actions();
        assert_eq!(actions.len(), 8);
        assert!(actions.iter().all(|a| a.player == Player::O));
        assert!(actions.iter().all(|a| a.position != 0));
    }

    #[test]
    fn wins_are_detected_on_rows_columns_and_diagonals() {
        // X takes the top row
        let row = played(&[0, 3, 1, 4, 2]);
        assert_eq!(row.winner(), Some(Player::X));
        assert!(row.is_terminal());
        assert!(row.possible_actions().is_empty());

        // O takes the middle column
        let column = played(&[0, 1, 2, 4, 5, 7]);
        assert_eq!(column.winner(), Some(Player::O));

        // X takes the main diagonal
        let diagonal = played(&[0, 1, 4, 2, 8]);
        assert_eq!(diagonal.winner(), Some(Player::X));
    }

    #[test]
    fn full_board_without_a_winner_is_a_draw() {
        let board = played(&[0, 1, 2, 4, 3, 6, 5, 8, 7]);
        assert!(board.is_terminal());
        assert!(board.is_draw());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn from_label_parses_cells_and_turn() {
        let board = BoardState::from_label("XOX......_O").unwrap();
        assert_eq!(board.cells[0], Cell::X);
        assert_eq!(board.cells[1], Cell::O);
        assert_eq!(board.cells[2], Cell::X);
        assert_eq!(board.to_move, Player::O);
    }

    #[test]
    fn from_label_rejects_malformed_input() {
        // Wrong shape
        assert!(BoardState::from_label("XO_X").is_err());
        assert!(BoardState::from_label("XOX......X").is_err());
        // Invalid cell character
        assert!(BoardState::from_label("XOZ......_X").is_err());
        // Impossible piece counts
        assert!(BoardState::from_label("XXXX....._X").is_err());
        // Turn suffix disagrees with the counts
        assert!(BoardState::from_label("X........_X").is_err());
        // Two completed lines for different sides
        assert!(BoardState::from_label("XXXOOO..._X").is_err());
    }

    #[test]
    fn encode_round_trips_through_from_label() {
        let board = played(&[4, 0]);
        let encoded = board.encode();
        assert_eq!(encoded, "O...X...._X");
        assert_eq!(BoardState::from_label(&encoded).unwrap(), board);
    }

    #[test]
    fn equal_states_share_a_table_slot() {
        use std::collections::HashMap;

        let a = played(&[4]);
        let b = played(&[4]);
        assert_eq!(a, b);

        let mut table = HashMap::new();
        table.insert(a, 1.0);
        assert_eq!(table.get(&b), Some(&1.0));
    }

    #[test]
    fn display_renders_three_rows() {
        let board = BoardState::from_label("XOX.O.X.._O").unwrap();
        assert_eq!(format!("{board}"), "XOX\n.O.\nX..");
    }
}
