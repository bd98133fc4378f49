use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::state::{Board, GameState, Phase, Player};
use crate::board::topology::{ring_weight, MILLS, NEIGHBORS};

// Mate scoring helpers
pub const MATE_SCORE: f64 = 1_000_000.0;
pub const DRAW_SCORE: f64 = 0.0;

/// Coefficients for every scoring feature. Missing fields in a JSON weights
/// file fall back to the defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub material: f64,
    pub mills: f64,
    pub open_mills: f64,
    pub mobility: f64,
    pub threats_mill_in_1: f64,
    pub blocked_opponent: f64,
    pub double_threats: f64,
    pub fork_threats: f64,
    pub connectivity: f64,
    pub initiative_strategic: f64,
    pub initiative_tactical: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            material: 10.0,
            mills: 5.0,
            open_mills: 2.0,
            mobility: 1.0,
            threats_mill_in_1: 2.0,
            blocked_opponent: 0.5,
            double_threats: 1.0,
            fork_threats: 1.0,
            connectivity: 0.5,
            initiative_strategic: 0.0,
            initiative_tactical: 0.0,
        }
    }
}

impl EvalWeights {
    /// All coefficients zero; handy for isolating a single feature.
    pub fn zero() -> Self {
        Self {
            material: 0.0,
            mills: 0.0,
            open_mills: 0.0,
            mobility: 0.0,
            threats_mill_in_1: 0.0,
            blocked_opponent: 0.0,
            double_threats: 0.0,
            fork_threats: 0.0,
            connectivity: 0.0,
            initiative_strategic: 0.0,
            initiative_tactical: 0.0,
        }
    }

    pub fn uses_initiative(&self) -> bool {
        self.initiative_strategic != 0.0 || self.initiative_tactical != 0.0
    }
}

/// Every weighted term of an evaluation, by feature name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalBreakdown {
    pub material: f64,
    pub mills: f64,
    pub open_mills: f64,
    pub mobility: f64,
    pub threats_mill_in_1: f64,
    pub blocked_opponent: f64,
    pub double_threats: f64,
    pub fork_threats: f64,
    pub connectivity: f64,
    pub initiative_strategic: f64,
    pub initiative_tactical: f64,
}

impl EvalBreakdown {
    pub fn entries(&self) -> [(&'static str, f64); 11] {
        [
            ("material", self.material),
            ("mills", self.mills),
            ("open_mills", self.open_mills),
            ("mobility", self.mobility),
            ("threats_mill_in_1", self.threats_mill_in_1),
            ("blocked_opponent", self.blocked_opponent),
            ("double_threats", self.double_threats),
            ("fork_threats", self.fork_threats),
            ("connectivity", self.connectivity),
            ("initiative_strategic", self.initiative_strategic),
            ("initiative_tactical", self.initiative_tactical),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, v)| v).sum()
    }

    /// Term-wise `self - other`.
    pub fn diff(&self, other: &EvalBreakdown) -> EvalBreakdown {
        EvalBreakdown {
            material: self.material - other.material,
            mills: self.mills - other.mills,
            open_mills: self.open_mills - other.open_mills,
            mobility: self.mobility - other.mobility,
            threats_mill_in_1: self.threats_mill_in_1 - other.threats_mill_in_1,
            blocked_opponent: self.blocked_opponent - other.blocked_opponent,
            double_threats: self.double_threats - other.double_threats,
            fork_threats: self.fork_threats - other.fork_threats,
            connectivity: self.connectivity - other.connectivity,
            initiative_strategic: self.initiative_strategic - other.initiative_strategic,
            initiative_tactical: self.initiative_tactical - other.initiative_tactical,
        }
    }

    pub fn non_zero(&self) -> impl Iterator<Item = (&'static str, f64)> {
        self.entries().into_iter().filter(|(_, v)| *v != 0.0)
    }
}

/// Weighted linear evaluation from `player`'s point of view. Every feature is
/// `player` minus opponent, except threats where fewer opponent threats is
/// better.
pub fn evaluate(state: &GameState, player: Player, weights: &EvalWeights) -> (f64, EvalBreakdown) {
    let opp = player.opponent();
    let mut w = *weights;
    if w.uses_initiative() {
        w.mobility = 0.0;
        w.open_mills = 0.0;
        w.threats_mill_in_1 = 0.0;
        w.blocked_opponent = 0.0;
        w.double_threats = 0.0;
        w.fork_threats = 0.0;
        w.connectivity = 0.0;
    }

    let board = state.board();
    let diff = |f: &dyn Fn(Player) -> f64| f(player) - f(opp);

    let mat = diff(&|p| state.stones_on_board(p) as f64);
    let mills = diff(&|p| count_mills(board, p) as f64);
    let open = diff(&|p| count_open_mills(board, p) as f64);
    let mob = diff(&|p| mobility_score(state, p) as f64);
    let thr = threat_squares(state, opp).len() as f64 - threat_squares(state, player).len() as f64;
    let blk = blocked_stones(state, opp).len() as f64 - blocked_stones(state, player).len() as f64;
    let dbl = diff(&|p| double_threat_squares(state, p).len() as f64);
    let fork = diff(&|p| fork_threat_score(state, p));
    let conn = diff(&|p| connectivity_score(board, p) as f64);
    let init_strat = mob + open + blk + conn;
    let init_tact = thr + dbl + fork;

    let breakdown = EvalBreakdown {
        material: w.material * mat,
        mills: w.mills * mills,
        open_mills: w.open_mills * open,
        mobility: w.mobility * mob,
        threats_mill_in_1: w.threats_mill_in_1 * thr,
        blocked_opponent: w.blocked_opponent * blk,
        double_threats: w.double_threats * dbl,
        fork_threats: w.fork_threats * fork,
        connectivity: w.connectivity * conn,
        initiative_strategic: w.initiative_strategic * init_strat,
        initiative_tactical: w.initiative_tactical * init_tact,
    };
    (breakdown.total(), breakdown)
}

pub fn count_mills(board: &Board, player: Player) -> usize {
    MILLS.iter().filter(|line| line.iter().all(|&i| board[i].is(player))).count()
}

/// Lines with two own stones and one empty square.
pub fn count_open_mills(board: &Board, player: Player) -> usize {
    MILLS.iter().filter(|line| open_square(board, line, player).is_some()).count()
}

fn open_square(board: &Board, line: &[usize; 3], player: Player) -> Option<usize> {
    let own = line.iter().filter(|&&i| board[i].is(player)).count();
    let mut empties = line.iter().filter(|&&i| board[i].is_empty());
    match (own, empties.next(), empties.next()) {
        (2, Some(&e), None) => Some(e),
        _ => None,
    }
}

/// Empty squares completing a line for `player`, with the number of lines each
/// one would complete.
pub fn open_mill_squares(board: &Board, player: Player) -> BTreeMap<usize, usize> {
    let mut squares = BTreeMap::new();
    for line in MILLS.iter() {
        if let Some(e) = open_square(board, line, player) {
            *squares.entry(e).or_insert(0) += 1;
        }
    }
    squares
}

fn reachable(state: &GameState, player: Player, pos: usize) -> bool {
    match state.phase(player) {
        Phase::Placing => true,
        Phase::Flying => state.stones_on_board(player) > 0,
        Phase::Moving => NEIGHBORS[pos].iter().any(|&n| state.stone_at(n).is(player)),
    }
}

/// Squares where `player` can close a mill next turn.
pub fn threat_squares(state: &GameState, player: Player) -> Vec<usize> {
    open_mill_squares(state.board(), player)
        .into_keys()
        .filter(|&pos| reachable(state, player, pos))
        .collect()
}

/// Display variant of [`threat_squares`]: falls back to the opponent's threat
/// squares when `player` has none. Not used by evaluation or search.
pub fn display_threat_squares(state: &GameState, player: Player) -> Vec<usize> {
    let own = threat_squares(state, player);
    if own.is_empty() {
        threat_squares(state, player.opponent())
    } else {
        own
    }
}

/// Reachable squares completing two lines at once.
pub fn double_threat_squares(state: &GameState, player: Player) -> Vec<usize> {
    open_mill_squares(state.board(), player)
        .into_iter()
        .filter(|&(pos, lines)| lines >= 2 && reachable(state, player, pos))
        .map(|(pos, _)| pos)
        .collect()
}

/// Threat squares when there are at least two of them; a single block cannot
/// cover both.
pub fn fork_threat_squares(state: &GameState, player: Player) -> Vec<usize> {
    let threats = threat_squares(state, player);
    if threats.len() >= 2 { threats } else { Vec::new() }
}

pub fn fork_threat_score(state: &GameState, player: Player) -> f64 {
    fork_threat_squares(state, player).into_iter().map(ring_weight).sum()
}

/// Reachable destinations per stone: empty neighbours while moving, every
/// empty square while flying. Empty during placing.
pub fn mobility_by_pos(state: &GameState, player: Player) -> Vec<(usize, usize)> {
    match state.phase(player) {
        Phase::Placing => Vec::new(),
        Phase::Flying => {
            let empties = state.empty_positions().count();
            state.positions_of(player).map(|p| (p, empties)).collect()
        }
        Phase::Moving => state
            .positions_of(player)
            .map(|p| (p, NEIGHBORS[p].iter().filter(|&&n| state.is_empty(n)).count()))
            .collect(),
    }
}

pub fn mobility_score(state: &GameState, player: Player) -> usize {
    mobility_by_pos(state, player).iter().map(|(_, m)| m).sum()
}

/// Stones with zero destinations; none while the player is still placing.
pub fn blocked_stones(state: &GameState, player: Player) -> Vec<usize> {
    mobility_by_pos(state, player).into_iter().filter(|&(_, m)| m == 0).map(|(p, _)| p).collect()
}

pub fn connectivity_score(board: &Board, player: Player) -> usize {
    board
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is(player))
        .map(|(i, _)| NEIGHBORS[i].len())
        .sum()
}

/// Mobility summary used by overlays and debugging output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MobilityProfile {
    pub stones: usize,
    pub movable: usize,
    pub blocked: usize,
    pub blocked_ratio: f64,
    pub total_moves: usize,
    pub avg_moves: f64,
}

pub fn mobility_profile(state: &GameState, player: Player) -> MobilityProfile {
    let stones = state.stones_on_board(player);
    let total_moves = mobility_score(state, player);
    let blocked = blocked_stones(state, player).len();
    let (avg_moves, blocked_ratio) = if stones > 0 {
        (total_moves as f64 / stones as f64, blocked as f64 / stones as f64)
    } else {
        (0.0, 0.0)
    };
    MobilityProfile { stones, movable: stones - blocked, blocked, blocked_ratio, total_moves, avg_moves }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state::Stone;
    use crate::board::topology::NUM_POSITIONS;

    #[test]
    fn initial_position_is_balanced() {
        let s = GameState::initial();
        let (score, breakdown) = evaluate(&s, Player::White, &EvalWeights::default());
        assert_eq!(score, 0.0);
        assert!(breakdown.non_zero().next().is_none());
    }

    #[test]
    fn evaluation_is_antisymmetric() {
        let mut board = [Stone::Empty; NUM_POSITIONS];
        for p in [0, 1, 4, 7] { board[p] = Stone::White; }
        for p in [9, 21] { board[p] = Stone::Black; }
        let s = GameState::from_board(board, Player::Black).unwrap();
        let w = EvalWeights::default();
        let (a, _) = evaluate(&s, Player::White, &w);
        let (b, _) = evaluate(&s, Player::Black, &w);
        assert!((a + b).abs() < 1e-9, "{a} vs {b}");
        assert!(a > 0.0);
    }
}
