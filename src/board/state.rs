use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::topology::{GRID_7X7, NUM_POSITIONS};
use crate::error::{MuehleError, Result};

pub const STONES_PER_PLAYER: u8 = 9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stone {
    #[default]
    Empty,
    White,
    Black,
}

impl Stone {
    pub fn is(self, player: Player) -> bool {
        self == player.stone()
    }

    pub fn is_empty(self) -> bool {
        self == Stone::Empty
    }

    pub fn as_char(self) -> char {
        match self {
            Stone::Empty => '.',
            Stone::White => 'W',
            Stone::Black => 'B',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::White, Player::Black];

    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    pub fn stone(self) -> Stone {
        match self {
            Player::White => Stone::White,
            Player::Black => Stone::Black,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Player::White => "WHITE",
            Player::Black => "BLACK",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived from hand and board counts; never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Placing,
    Moving,
    Flying,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Placing => "placing",
            Phase::Moving => "moving",
            Phase::Flying => "flying",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Board = [Stone; NUM_POSITIONS];

/// Bookkeeping for the two draw rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawTracker {
    pub no_mill_moves: u32,
    pub position_history: Vec<u64>,
}

/// Immutable game snapshot. Transitions return new values; use the `with_*`
/// copies for single-field updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) to_move: Player,
    pub(crate) in_hand_white: u8,
    pub(crate) in_hand_black: u8,
    pub(crate) pending_remove: bool,
    pub(crate) turn_no: u32,
    #[serde(default)]
    pub(crate) draw: DrawTracker,
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

impl GameState {
    pub fn initial() -> Self {
        Self {
            board: [Stone::Empty; NUM_POSITIONS],
            to_move: Player::White,
            in_hand_white: STONES_PER_PLAYER,
            in_hand_black: STONES_PER_PLAYER,
            pending_remove: false,
            turn_no: 1,
            draw: DrawTracker::default(),
        }
    }

    /// Builds a state from explicit parts, rejecting impossible stone counts.
    pub fn new(board: Board, to_move: Player, in_hand_white: u8, in_hand_black: u8) -> Result<Self> {
        let s = Self {
            board,
            to_move,
            in_hand_white,
            in_hand_black,
            pending_remove: false,
            turn_no: 1,
            draw: DrawTracker::default(),
        };
        s.validate()?;
        Ok(s)
    }

    /// Hand counts are derived as `9 - on_board`, as if nothing was captured yet.
    pub fn from_board(board: Board, to_move: Player) -> Result<Self> {
        let count = |p: Player| board.iter().filter(|s| s.is(p)).count();
        let (w, b) = (count(Player::White), count(Player::Black));
        let cap = STONES_PER_PLAYER as usize;
        if w > cap || b > cap {
            return Err(MuehleError::InvalidStateShape(format!("too many stones on board: white {w}, black {b}")));
        }
        Self::new(board, to_move, (cap - w) as u8, (cap - b) as u8)
    }

    pub fn validate(&self) -> Result<()> {
        for p in Player::BOTH {
            let hand = self.in_hand(p) as usize;
            let on_board = self.stones_on_board(p);
            if hand > STONES_PER_PLAYER as usize || hand + on_board > STONES_PER_PLAYER as usize {
                return Err(MuehleError::InvalidStateShape(format!(
                    "{p}: {hand} in hand + {on_board} on board exceeds {STONES_PER_PLAYER}"
                )));
            }
        }
        Ok(())
    }

    pub fn board(&self) -> &Board { &self.board }
    pub fn to_move(&self) -> Player { self.to_move }
    pub fn pending_remove(&self) -> bool { self.pending_remove }
    pub fn turn_no(&self) -> u32 { self.turn_no }
    pub fn draw(&self) -> &DrawTracker { &self.draw }
    pub fn stone_at(&self, pos: usize) -> Stone { self.board[pos] }
    pub fn is_empty(&self, pos: usize) -> bool { self.board[pos].is_empty() }

    pub fn in_hand(&self, p: Player) -> u8 {
        match p {
            Player::White => self.in_hand_white,
            Player::Black => self.in_hand_black,
        }
    }

    pub fn stones_on_board(&self, p: Player) -> usize {
        self.board.iter().filter(|s| s.is(p)).count()
    }

    pub fn positions_of(&self, p: Player) -> impl Iterator<Item = usize> + '_ {
        self.board.iter().enumerate().filter(move |(_, s)| s.is(p)).map(|(i, _)| i)
    }

    pub fn empty_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.board.iter().enumerate().filter(|(_, s)| s.is_empty()).map(|(i, _)| i)
    }

    pub fn phase(&self, p: Player) -> Phase {
        if self.in_hand(p) > 0 {
            Phase::Placing
        } else if self.stones_on_board(p) == 3 {
            Phase::Flying
        } else {
            Phase::Moving
        }
    }

    pub fn with_board(&self, board: Board) -> Self {
        Self { board, ..self.clone() }
    }

    pub fn with_to_move(&self, to_move: Player) -> Self {
        Self { to_move, ..self.clone() }
    }

    pub fn with_in_hand(&self, p: Player, value: u8) -> Self {
        let mut s = self.clone();
        match p {
            Player::White => s.in_hand_white = value,
            Player::Black => s.in_hand_black = value,
        }
        s
    }

    pub fn with_pending_remove(&self, pending_remove: bool) -> Self {
        Self { pending_remove, ..self.clone() }
    }

    pub fn with_turn_no(&self, turn_no: u32) -> Self {
        Self { turn_no, ..self.clone() }
    }

    pub fn with_draw(&self, draw: DrawTracker) -> Self {
        Self { draw, ..self.clone() }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in GRID_7X7.iter() {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Some(pos) => self.board[*pos].as_char(),
                    None => ' ',
                })
                .flat_map(|c| [c, ' '])
                .collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        write!(
            f,
            "to move: {}  phase: {}  hand W/B: {}/{}  turn: {}{}",
            self.to_move,
            self.phase(self.to_move),
            self.in_hand_white,
            self.in_hand_black,
            self.turn_no,
            if self.pending_remove { "  (remove pending)" } else { "" }
        )
    }
}
