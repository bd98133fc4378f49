// Explanations on top of search: move-loss labels, last-move summaries,
// per-ply tactic hints and a static overlay of the position.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::state::{GameState, Player};
use crate::error::Result;
use crate::search::alphabeta::{analyze, score_ply, Limits};
use crate::search::eval::{blocked_stones, evaluate, EvalWeights, fork_threat_squares, mobility_profile, mobility_score, threat_squares, MobilityProfile};
use crate::search::movegen::{apply_ply, legal_plies, Ply, PlyKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveLabel {
    Best,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl fmt::Display for MoveLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoveLabel::Best => "Best",
            MoveLabel::Good => "Good",
            MoveLabel::Inaccuracy => "Inaccuracy",
            MoveLabel::Mistake => "Mistake",
            MoveLabel::Blunder => "Blunder",
        };
        f.write_str(s)
    }
}

/// Upper bounds (inclusive) of score loss for each label.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossThresholds {
    pub best: f64,
    pub good: f64,
    pub inaccuracy: f64,
    pub mistake: f64,
}

impl Default for LossThresholds {
    fn default() -> Self {
        Self { best: 0.05, good: 0.5, inaccuracy: 1.5, mistake: 3.0 }
    }
}

/// Maps `best_score - move_score` to a label.
pub fn classify_move_loss(delta: f64, thresholds: &LossThresholds) -> MoveLabel {
    if delta <= thresholds.best {
        MoveLabel::Best
    } else if delta <= thresholds.good {
        MoveLabel::Good
    } else if delta <= thresholds.inaccuracy {
        MoveLabel::Inaccuracy
    } else if delta <= thresholds.mistake {
        MoveLabel::Mistake
    } else {
        MoveLabel::Blunder
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LastMoveSummary {
    pub score: f64,
    pub loss: f64,
    pub label: MoveLabel,
    pub pv: Vec<Ply>,
    pub in_top_n: bool,
}

/// Rates `last_ply` played from `prev`. Uses the ranked list when the ply made
/// it into the top N, otherwise scores it on its own.
pub fn summarize_last_move(prev: &GameState, last_ply: &Ply, limits: &Limits, thresholds: &LossThresholds) -> Result<LastMoveSummary> {
    let mover = prev.to_move();
    let result = analyze(prev, limits, Some(mover));

    let (score, pv, in_top_n) = match result.top_moves.iter().find(|sm| sm.ply == *last_ply) {
        Some(sm) => (sm.score, sm.pv.clone(), true),
        None => {
            let (s, pv) = score_ply(prev, last_ply, limits, Some(mover))?;
            (s, pv, false)
        }
    };

    let loss = (result.score - score).max(0.0);
    Ok(LastMoveSummary { score, loss, label: classify_move_loss(loss, thresholds), pv, in_top_n })
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticHints {
    pub missed_mill_in_1: bool,
    pub missed_threats: BTreeSet<usize>,
    pub used_threat_square: Option<usize>,
    pub allowed_mill_in_1: bool,
    pub allowed_threats: BTreeSet<usize>,
    pub blocked_white: BTreeSet<usize>,
    pub blocked_black: BTreeSet<usize>,
}

/// Missed and used mill-in-1 chances for the mover, new mill-in-1 chances
/// handed to the opponent, and blocked stones after the ply.
pub fn tactic_hints_for_ply(state: &GameState, ply: &Ply) -> Result<TacticHints> {
    let player = state.to_move();
    let opp = player.opponent();

    let own_before: BTreeSet<usize> = threat_squares(state, player).into_iter().collect();
    let opp_before: BTreeSet<usize> = threat_squares(state, opp).into_iter().collect();

    let used_threat_square = match ply.kind {
        PlyKind::Remove => None,
        _ => ply.dst.filter(|d| own_before.contains(d)),
    };
    let missed_mill_in_1 = ply.kind != PlyKind::Remove && !own_before.is_empty() && used_threat_square.is_none();

    let next = apply_ply(state, ply)?;
    let opp_after: BTreeSet<usize> = threat_squares(&next, opp).into_iter().collect();
    let allowed_threats: BTreeSet<usize> = opp_after.difference(&opp_before).copied().collect();

    Ok(TacticHints {
        missed_mill_in_1,
        missed_threats: own_before,
        used_threat_square,
        allowed_mill_in_1: !allowed_threats.is_empty(),
        allowed_threats,
        blocked_white: blocked_stones(&next, Player::White).into_iter().collect(),
        blocked_black: blocked_stones(&next, Player::Black).into_iter().collect(),
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerOverlay {
    pub threats: Vec<usize>,
    pub fork_threats: Vec<usize>,
    pub mobility: usize,
    pub blocked: Vec<usize>,
    pub profile: MobilityProfile,
}

pub fn player_overlay(state: &GameState, player: Player) -> PlayerOverlay {
    PlayerOverlay {
        threats: threat_squares(state, player),
        fork_threats: fork_threat_squares(state, player),
        mobility: mobility_score(state, player),
        blocked: blocked_stones(state, player),
        profile: mobility_profile(state, player),
    }
}

/// A ply scored by static evaluation only, with its change against the
/// evaluation before it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateMove {
    pub ply: Ply,
    pub score: f64,
    pub delta: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOverlay {
    pub base_eval_white: f64,
    pub base_eval_black: f64,
    pub white: PlayerOverlay,
    pub black: PlayerOverlay,
    pub candidates: Vec<CandidateMove>,
}

/// Search-free picture of `state`: both sides' evaluations and features, and
/// the side to move's `max_candidates` best plies by one-ply lookahead.
pub fn analysis_overlay(state: &GameState, weights: &EvalWeights, max_candidates: usize) -> AnalysisOverlay {
    let mover = state.to_move();
    let base_eval_white = evaluate(state, Player::White, weights).0;
    let base_eval_black = evaluate(state, Player::Black, weights).0;
    let base = if mover == Player::White { base_eval_white } else { base_eval_black };

    let mut candidates: Vec<CandidateMove> = legal_plies(state)
        .into_iter()
        .filter_map(|ply| {
            let next = apply_ply(state, &ply).ok()?;
            let score = evaluate(&next, mover, weights).0;
            Some(CandidateMove { ply, score, delta: score - base })
        })
        .collect();
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(max_candidates);

    AnalysisOverlay {
        base_eval_white,
        base_eval_black,
        white: player_overlay(state, Player::White),
        black: player_overlay(state, Player::Black),
        candidates,
    }
}
