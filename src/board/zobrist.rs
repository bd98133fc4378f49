use std::sync::OnceLock;

use crate::board::state::{Board, GameState, Phase, Player, Stone};
use crate::board::topology::{symmetries, NUM_POSITIONS};

struct Keys {
    squares: [u64; 2 * NUM_POSITIONS],
    side: u64,
    phase: [u64; 3],
    pending: u64,
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

static KEYS: OnceLock<Keys> = OnceLock::new();

fn keys() -> &'static Keys {
    KEYS.get_or_init(|| {
        let mut seed = 0xF00D_F00D_DEAD_BEEF;
        let mut next = || {
            seed = splitmix64(seed);
            seed
        };
        let mut squares = [0u64; 2 * NUM_POSITIONS];
        for v in &mut squares {
            *v = next();
        }
        let side = next();
        let phase = [next(), next(), next()];
        let pending = next();
        Keys { squares, side, phase, pending }
    })
}

fn stone_index(stone: Stone) -> Option<usize> {
    match stone {
        Stone::Empty => None,
        Stone::White => Some(0),
        Stone::Black => Some(1),
    }
}

fn phase_index(phase: Phase) -> usize {
    match phase {
        Phase::Placing => 0,
        Phase::Moving => 1,
        Phase::Flying => 2,
    }
}

fn header_key(state: &GameState) -> u64 {
    let k = keys();
    let to_move = state.to_move();
    let mut key = k.phase[phase_index(state.phase(to_move))];
    if to_move == Player::Black {
        key ^= k.side;
    }
    if state.pending_remove() {
        key ^= k.pending;
    }
    key
}

fn board_key(board: &Board, map: Option<&[usize; NUM_POSITIONS]>) -> u64 {
    let k = keys();
    let mut key = 0u64;
    for (pos, &stone) in board.iter().enumerate() {
        if let Some(si) = stone_index(stone) {
            let target = map.map_or(pos, |m| m[pos]);
            key ^= k.squares[target * 2 + si];
        }
    }
    key
}

/// Digest over side to move, its phase, the pending-removal flag and the board.
pub fn position_key(state: &GameState) -> u64 {
    header_key(state) ^ board_key(state.board(), None)
}

/// Minimum [`position_key`] over all eight board symmetries, so rotated and
/// mirrored positions share one key.
pub fn position_key_with_symmetry(state: &GameState) -> u64 {
    let header = header_key(state);
    symmetries()
        .iter()
        .map(|map| header ^ board_key(state.board(), Some(map)))
        .min()
        .unwrap_or_else(|| position_key(state))
}
