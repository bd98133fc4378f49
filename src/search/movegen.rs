// Ply layer: one player's complete turn, with the forced removal after a
// closed mill folded into the same unit. Search and external movers only
// ever deal in plies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::state::{GameState, Phase, Player, Stone};
use crate::error::{MuehleError, Result};
use crate::rules::{advance_draw_tracker, apply_action, forms_mill_at, legal_actions, removable_positions, Action, ActionKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlyKind {
    Place,
    Move,
    Fly,
    Remove,
}

/// `remove` carries the fused capture for place/move/fly plies and the target
/// itself for a standalone `Remove` ply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ply {
    pub kind: PlyKind,
    pub src: Option<usize>,
    pub dst: Option<usize>,
    pub remove: Option<usize>,
}

impl Ply {
    pub fn place(dst: usize) -> Self {
        Self { kind: PlyKind::Place, src: None, dst: Some(dst), remove: None }
    }

    pub fn step(src: usize, dst: usize) -> Self {
        Self { kind: PlyKind::Move, src: Some(src), dst: Some(dst), remove: None }
    }

    pub fn fly(src: usize, dst: usize) -> Self {
        Self { kind: PlyKind::Fly, src: Some(src), dst: Some(dst), remove: None }
    }

    pub fn remove(pos: usize) -> Self {
        Self { kind: PlyKind::Remove, src: None, dst: None, remove: Some(pos) }
    }

    pub fn with_remove(self, pos: usize) -> Self {
        Self { remove: Some(pos), ..self }
    }

    pub fn is_capture(&self) -> bool {
        self.remove.is_some()
    }
}

impl fmt::Display for Ply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::notation::ply_notation(self))
    }
}

pub fn legal_plies(state: &GameState) -> Vec<Ply> {
    let player = state.to_move();

    if state.pending_remove() {
        return removable_positions(state, player.opponent()).into_iter().map(Ply::remove).collect();
    }

    let flying = state.phase(player) == Phase::Flying;
    let mut plies = Vec::new();
    for act in legal_actions(state) {
        let (base, src, dst) = match act {
            Action::Place { dst } => (Ply::place(dst), None, dst),
            Action::Move { src, dst } if flying => (Ply::fly(src, dst), Some(src), dst),
            Action::Move { src, dst } => (Ply::step(src, dst), Some(src), dst),
            Action::Remove { .. } => continue,
        };
        fan_out_removals(state, player, base, src, dst, &mut plies);
    }
    plies
}

fn fan_out_removals(state: &GameState, player: Player, base: Ply, src: Option<usize>, dst: usize, out: &mut Vec<Ply>) {
    let mut board = *state.board();
    if let Some(s) = src {
        board[s] = Stone::Empty;
    }
    board[dst] = player.stone();

    if !forms_mill_at(&board, player, dst) {
        out.push(base);
        return;
    }

    let removables = removable_positions(&state.with_board(board), player.opponent());
    if removables.is_empty() {
        // Only reachable once the victim has no stones left at all.
        debug_assert_eq!(state.stones_on_board(player.opponent()), 0);
        out.push(base);
        return;
    }
    out.extend(removables.into_iter().map(|r| base.with_remove(r)));
}

fn malformed(ply: &Ply, reason: &'static str) -> MuehleError {
    MuehleError::MalformedPly { ply: *ply, reason }
}

/// Applies a complete ply, including its fused removal.
pub fn apply_ply(state: &GameState, ply: &Ply) -> Result<GameState> {
    let player = state.to_move();

    if ply.kind == PlyKind::Fly && state.phase(player) != Phase::Flying {
        return Err(malformed(ply, "fly is only legal in the flying phase"));
    }

    if state.pending_remove() {
        return match (ply.kind, ply.remove) {
            (PlyKind::Remove, Some(dst)) => apply_action(state, Action::Remove { dst }),
            _ => Err(malformed(ply, "state requires a remove ply")),
        };
    }

    let mid = match ply.kind {
        PlyKind::Remove => return Err(malformed(ply, "remove ply without a pending removal")),
        PlyKind::Place => {
            let dst = ply.dst.ok_or_else(|| malformed(ply, "place needs dst"))?;
            apply_action(state, Action::Place { dst })?
        }
        PlyKind::Move | PlyKind::Fly => match (ply.src, ply.dst) {
            (Some(src), Some(dst)) => apply_action(state, Action::Move { src, dst })?,
            _ => return Err(malformed(ply, "move/fly needs src and dst")),
        },
    };

    if !mid.pending_remove() {
        if ply.remove.is_some() {
            return Err(malformed(ply, "remove given but no mill was closed"));
        }
        return Ok(mid);
    }

    match ply.remove {
        Some(dst) => apply_action(&mid, Action::Remove { dst }),
        None => {
            if !removable_positions(&mid, player.opponent()).is_empty() {
                return Err(malformed(ply, "mill closed, ply must carry a removal"));
            }
            debug_assert_eq!(mid.stones_on_board(player.opponent()), 0);
            Ok(mid.with_pending_remove(false).with_to_move(player.opponent()).with_turn_no(mid.turn_no() + 1))
        }
    }
}

/// [`apply_ply`] followed by [`advance_draw_tracker`], for callers that keep
/// draw bookkeeping across a game or a search line.
pub fn play_ply(state: &GameState, ply: &Ply) -> Result<GameState> {
    let next = apply_ply(state, ply)?;
    let (kind, dst) = match ply.kind {
        PlyKind::Place => (ActionKind::Place, ply.dst),
        PlyKind::Move | PlyKind::Fly => (ActionKind::Move, ply.dst),
        PlyKind::Remove => (ActionKind::Remove, ply.remove),
    };
    Ok(advance_draw_tracker(state, &next, kind, dst))
}

/// True if the place/move/fly part of `ply` closes a mill for the side to move.
pub fn closes_mill(state: &GameState, ply: &Ply) -> bool {
    let player = state.to_move();
    let Some(dst) = ply.dst else { return false };
    if ply.kind == PlyKind::Remove {
        return false;
    }
    let mut board = *state.board();
    if let Some(src) = ply.src {
        board[src] = Stone::Empty;
    }
    board[dst] = player.stone();
    forms_mill_at(&board, player, dst)
}
