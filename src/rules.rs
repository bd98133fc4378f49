// Pure rule functions over [`GameState`]: legal actions, their application,
// mills, forced removals, wins and draws.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::state::{Board, DrawTracker, GameState, Phase, Player, Stone};
use crate::board::topology::{mills_containing, NEIGHBORS};
use crate::board::zobrist::position_key_with_symmetry;
use crate::error::{MuehleError, Result};

pub const DRAW_NO_MILL_MOVES: u32 = 20;
pub const DRAW_THREEFOLD_REPETITIONS: usize = 3;

/// Atomic rule primitive. A mill-closing place/move is followed by a separate
/// `Remove` from the same player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Place { dst: usize },
    Move { src: usize, dst: usize },
    Remove { dst: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Place,
    Move,
    Remove,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Place { .. } => ActionKind::Place,
            Action::Move { .. } => ActionKind::Move,
            Action::Remove { .. } => ActionKind::Remove,
        }
    }

    pub fn dst(&self) -> usize {
        match *self {
            Action::Place { dst } | Action::Move { dst, .. } | Action::Remove { dst } => dst,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Place { dst } => write!(f, "Place({dst})"),
            Action::Move { src, dst } => write!(f, "Move({src}->{dst})"),
            Action::Remove { dst } => write!(f, "Remove({dst})"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawReason {
    #[serde(rename = "no_mill_20")]
    NoMill20,
    #[serde(rename = "threefold")]
    Threefold,
}

impl DrawReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DrawReason::NoMill20 => "no_mill_20",
            DrawReason::Threefold => "threefold",
        }
    }
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn phase_for(state: &GameState, player: Player) -> Phase {
    state.phase(player)
}

/// True if `pos` completes a line fully owned by `player` on `board`.
pub fn forms_mill_at(board: &Board, player: Player, pos: usize) -> bool {
    mills_containing(pos).any(|line| line.iter().all(|&i| board[i].is(player)))
}

pub fn is_part_of_mill(board: &Board, player: Player, pos: usize) -> bool {
    board[pos].is(player) && forms_mill_at(board, player, pos)
}

/// Victim stones outside mills; all victim stones if every one sits in a mill.
pub fn removable_positions(state: &GameState, victim: Player) -> Vec<usize> {
    let board = state.board();
    let victims: Vec<usize> = state.positions_of(victim).collect();
    let free: Vec<usize> = victims.iter().copied().filter(|&i| !is_part_of_mill(board, victim, i)).collect();
    if free.is_empty() { victims } else { free }
}

pub fn legal_actions(state: &GameState) -> Vec<Action> {
    let p = state.to_move();
    if state.pending_remove() {
        return removable_positions(state, p.opponent()).into_iter().map(|dst| Action::Remove { dst }).collect();
    }

    match state.phase(p) {
        Phase::Placing => state.empty_positions().map(|dst| Action::Place { dst }).collect(),
        Phase::Moving => {
            let mut actions = Vec::new();
            for src in state.positions_of(p) {
                for &dst in NEIGHBORS[src] {
                    if state.is_empty(dst) {
                        actions.push(Action::Move { src, dst });
                    }
                }
            }
            actions
        }
        Phase::Flying => {
            let empties: Vec<usize> = state.empty_positions().collect();
            let mut actions = Vec::with_capacity(3 * empties.len());
            for src in state.positions_of(p) {
                for &dst in &empties {
                    actions.push(Action::Move { src, dst });
                }
            }
            actions
        }
    }
}

/// Applies `action` after re-checking it against [`legal_actions`].
pub fn apply_action(state: &GameState, action: Action) -> Result<GameState> {
    if !legal_actions(state).contains(&action) {
        return Err(MuehleError::IllegalAction(action));
    }

    let p = state.to_move();
    let mut next = state.clone();
    match action {
        Action::Place { dst } => {
            next.board[dst] = p.stone();
            next = next.with_in_hand(p, state.in_hand(p) - 1);
            Ok(finish_half_turn(next, p, dst))
        }
        Action::Move { src, dst } => {
            next.board[src] = Stone::Empty;
            next.board[dst] = p.stone();
            Ok(finish_half_turn(next, p, dst))
        }
        Action::Remove { dst } => {
            let victim = p.opponent();
            if !state.stone_at(dst).is(victim) {
                return Err(MuehleError::IllegalAction(action));
            }
            next.board[dst] = Stone::Empty;
            next.pending_remove = false;
            next.to_move = victim;
            next.turn_no += 1;
            Ok(next)
        }
    }
}

fn finish_half_turn(mut next: GameState, mover: Player, dst: usize) -> GameState {
    if forms_mill_at(&next.board, mover, dst) {
        // Same player removes next; the turn is not complete yet.
        next.pending_remove = true;
        next.to_move = mover;
    } else {
        next.pending_remove = false;
        next.to_move = mover.opponent();
        next.turn_no += 1;
    }
    next
}

pub fn winner(state: &GameState) -> Option<Player> {
    for player in Player::BOTH {
        if state.phase(player) != Phase::Placing && state.stones_on_board(player) < 3 {
            return Some(player.opponent());
        }
    }

    if !state.pending_remove() {
        let tm = state.to_move();
        if state.phase(tm) != Phase::Placing && legal_actions(state).is_empty() {
            return Some(tm.opponent());
        }
    }
    None
}

pub fn is_terminal(state: &GameState) -> bool {
    draw_reason(state).is_some() || winner(state).is_some()
}

/// Updates draw bookkeeping after `prev -> next` was produced by an action of
/// `action_kind` landing on `dst`.
pub fn advance_draw_tracker(prev: &GameState, next: &GameState, action_kind: ActionKind, dst: Option<usize>) -> GameState {
    let mover = prev.to_move();
    let prev_phase = prev.phase(mover);

    let mut history = prev.draw().position_history.clone();
    if history.is_empty() {
        history.push(position_key_with_symmetry(prev));
    }

    let formed_mill = match (action_kind, dst) {
        (ActionKind::Place | ActionKind::Move, Some(d)) => forms_mill_at(next.board(), mover, d),
        _ => false,
    };

    let mut no_mill = prev.draw().no_mill_moves;
    if action_kind == ActionKind::Move && prev_phase != Phase::Placing {
        no_mill = if formed_mill { 0 } else { no_mill + 1 };
    } else if formed_mill {
        no_mill = 0;
    }

    history.push(position_key_with_symmetry(next));
    next.with_draw(DrawTracker { no_mill_moves: no_mill, position_history: history })
}

pub fn draw_reason(state: &GameState) -> Option<DrawReason> {
    let draw = state.draw();
    if draw.no_mill_moves >= DRAW_NO_MILL_MOVES {
        return Some(DrawReason::NoMill20);
    }
    let cur = draw.position_history.last()?;
    if draw.position_history.iter().filter(|k| *k == cur).count() >= DRAW_THREEFOLD_REPETITIONS {
        return Some(DrawReason::Threefold);
    }
    None
}
