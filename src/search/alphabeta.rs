use std::cmp::Reverse;
use std::time::{Duration, Instant};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::board::state::{GameState, Player};
use crate::board::zobrist::{position_key, position_key_with_symmetry};
use crate::error::Result;
use crate::rules::{draw_reason, winner};
use crate::search::eval::{evaluate, open_mill_squares, EvalBreakdown, EvalWeights, DRAW_SCORE, MATE_SCORE};
use crate::search::movegen::{closes_mill, legal_plies, play_ply, Ply, PlyKind};
use crate::search::tt::{Bound, Entry, EntryKind, Tt};

pub const DEFAULT_TOP_N_MOVES: usize = 5;

/// Search budget and configuration. Any exhausted budget ends the search with
/// the last fully completed depth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub time_ms: Option<u64>,
    pub max_depth: u32,
    pub max_nodes: Option<u64>,
    pub use_tt: bool,
    pub top_n: usize,
    pub eval_weights: EvalWeights,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            time_ms: None,
            max_depth: 1,
            max_nodes: None,
            use_tt: true,
            top_n: DEFAULT_TOP_N_MOVES,
            eval_weights: EvalWeights::default(),
        }
    }
}

impl Limits {
    pub fn depth(max_depth: u32) -> Self {
        Self { max_depth, ..Self::default() }
    }
}

/// One ranked root ply. `score` uses the analysed player's perspective, like
/// [`AnalysisResult::score`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredMove {
    pub ply: Ply,
    pub score: f64,
    pub pv: Vec<Ply>,
    pub breakdown: EvalBreakdown,
    /// Best move's breakdown minus this move's.
    pub breakdown_diff: EvalBreakdown,
}

/// Scores are from the analysed player's point of view. `top_moves` is ranked
/// best-first for the side to move, so when the analysed player is the
/// opponent the listed scores ascend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub best_move: Option<Ply>,
    pub score: f64,
    pub depth: u32,
    pub nodes: u64,
    pub tt_hits: u64,
    pub tt_misses: u64,
    pub pv: Vec<Ply>,
    pub top_moves: Vec<ScoredMove>,
    pub breakdown: EvalBreakdown,
}

struct RootOutcome {
    score: f64,
    pv: Vec<Ply>,
    top: Vec<ScoredMove>,
}

/// Per-call search context. The transposition table lives here and is never
/// shared; run independent searchers for concurrent analyses.
pub struct Searcher {
    tt: Option<Tt>,
    for_player: Player,
    weights: EvalWeights,
    nodes: u64,
    node_limit: u64,
    deadline: Option<Instant>,
    stopped: bool,
    tt_hits: u64,
    tt_misses: u64,
    top_n: usize,
}

impl Searcher {
    pub fn new(limits: &Limits, for_player: Player) -> Self {
        Self {
            tt: limits.use_tt.then(Tt::new),
            for_player,
            weights: limits.eval_weights,
            nodes: 0,
            node_limit: limits.max_nodes.unwrap_or(u64::MAX),
            deadline: limits.time_ms.filter(|&t| t > 0).map(|t| Instant::now() + Duration::from_millis(t)),
            stopped: false,
            tt_hits: 0,
            tt_misses: 0,
            top_n: limits.top_n,
        }
    }

    fn budget_exhausted(&mut self) -> bool {
        if self.stopped { return true; }
        let out_of_time = self.deadline.map_or(false, |dl| Instant::now() >= dl);
        if out_of_time || self.nodes >= self.node_limit {
            self.stopped = true;
        }
        self.stopped
    }

    /// +1 when the side to move is the analysed player.
    fn sign(&self, state: &GameState) -> f64 {
        if state.to_move() == self.for_player { 1.0 } else { -1.0 }
    }

    fn terminal_score(&self, state: &GameState) -> Option<f64> {
        if draw_reason(state).is_some() {
            return Some(DRAW_SCORE);
        }
        winner(state).map(|w| if w == self.for_player { MATE_SCORE } else { -MATE_SCORE })
    }

    fn static_eval(&self, state: &GameState) -> f64 {
        evaluate(state, self.for_player, &self.weights).0
    }

    // Raw key first; a canonical hit is flagged so its move is never used.
    fn tt_find(&self, key: u64, sym_key: u64) -> Option<(Entry, bool)> {
        let tt = self.tt.as_ref()?;
        match tt.get(key) {
            Some(e) => Some((e, false)),
            None if sym_key != key => tt.get(sym_key).map(|e| (e, true)),
            None => None,
        }
    }

    fn tt_lookup(&mut self, key: u64, sym_key: u64) -> Option<(Entry, bool)> {
        let hit = self.tt_find(key, sym_key);
        if hit.is_some() { self.tt_hits += 1; } else { self.tt_misses += 1; }
        hit
    }

    fn tt_store(&mut self, key: u64, sym_key: u64, depth: u32, score: f64, bound: Bound, best: Option<Ply>) {
        let Some(tt) = self.tt.as_mut() else { return };
        trace!("tt store key={key:016x} depth={depth} score={score:.2} bound={bound:?}");
        tt.put(Entry { key, depth, score, bound, kind: EntryKind::Full { best }, gen: 0 });
        if sym_key != key {
            tt.put(Entry { key: sym_key, depth, score, bound, kind: EntryKind::ScoreOnly, gen: 0 });
        }
    }

    /// Fail-soft negamax. Scores are from the side to move's point of view;
    /// `None` means the budget ran out and the caller must discard the line.
    fn negamax(&mut self, state: &GameState, depth: u32, mut alpha: f64, beta: f64) -> Option<(f64, Vec<Ply>)> {
        if self.budget_exhausted() { return None; }
        self.nodes += 1;
        if self.budget_exhausted() { return None; }

        let sign = self.sign(state);
        if let Some(t) = self.terminal_score(state) {
            return Some((sign * t, Vec::new()));
        }
        if depth == 0 {
            return Some((sign * self.static_eval(state), Vec::new()));
        }

        let key = position_key(state);
        let sym_key = position_key_with_symmetry(state);
        let hit = self.tt_lookup(key, sym_key);
        if let Some((e, symmetric)) = hit {
            if e.depth >= depth {
                let pv: Vec<Ply> = if symmetric { Vec::new() } else { e.best().into_iter().collect() };
                match e.bound {
                    Bound::Exact => return Some((e.score, pv)),
                    Bound::Lower if e.score >= beta => return Some((e.score, pv)),
                    Bound::Upper if e.score <= alpha => return Some((e.score, pv)),
                    _ => {}
                }
            }
        }
        let tt_best = hit.filter(|(_, symmetric)| !symmetric).and_then(|(e, _)| e.best());

        let plies = order_plies(state, legal_plies(state), tt_best.as_ref());
        if plies.is_empty() {
            return Some((sign * self.static_eval(state), Vec::new()));
        }

        let orig_alpha = alpha;
        let mut best = f64::NEG_INFINITY;
        let mut best_pv: Vec<Ply> = Vec::new();
        for ply in plies {
            // Generated plies always apply.
            let Ok(child) = play_ply(state, &ply) else { continue };
            let (child_score, child_pv) = self.negamax(&child, depth - 1, -beta, -alpha)?;
            let score = -child_score;
            if score > best {
                best = score;
                best_pv = std::iter::once(ply).chain(child_pv).collect();
            }
            if score > alpha { alpha = score; }
            if alpha >= beta { break; }
        }

        let bound = if best <= orig_alpha { Bound::Upper } else if best >= beta { Bound::Lower } else { Bound::Exact };
        self.tt_store(key, sym_key, depth, best, bound, best_pv.first().copied());
        Some((best, best_pv))
    }

    fn search_root(&mut self, state: &GameState, depth: u32, prev_best: Option<Ply>) -> Option<RootOutcome> {
        let root_sign = self.sign(state);
        let plies = order_plies(state, legal_plies(state), prev_best.as_ref());

        // Every root ply gets a full window so the ranked scores are exact.
        let mut scored: Vec<(Ply, f64, Vec<Ply>, EvalBreakdown)> = Vec::with_capacity(plies.len());
        for ply in plies {
            let Ok(child) = play_ply(state, &ply) else { continue };
            let (child_score, child_pv) = self.negamax(&child, depth - 1, f64::NEG_INFINITY, f64::INFINITY)?;
            let score = -child_score;
            let (_, breakdown) = evaluate(&child, self.for_player, &self.weights);
            let pv = std::iter::once(ply).chain(child_pv).collect();
            scored.push((ply, score, pv, breakdown));
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        let (best_ply, best_score, best_pv, best_breakdown) = scored.first().cloned()?;

        let key = position_key(state);
        let sym_key = position_key_with_symmetry(state);
        self.tt_store(key, sym_key, depth, best_score, Bound::Exact, Some(best_ply));

        let top = scored
            .into_iter()
            .take(self.top_n)
            .map(|(ply, score, pv, breakdown)| ScoredMove {
                ply,
                score: root_sign * score,
                pv,
                breakdown_diff: best_breakdown.diff(&breakdown),
                breakdown,
            })
            .collect();
        Some(RootOutcome { score: root_sign * best_score, pv: best_pv, top })
    }

    /// Iterative deepening from depth 1 to `max_depth`; an iteration cut short
    /// by the budget is discarded.
    pub fn analyze(&mut self, state: &GameState, max_depth: u32) -> AnalysisResult {
        let (static_score, breakdown) = evaluate(state, self.for_player, &self.weights);
        let mut result = AnalysisResult { score: static_score, breakdown, ..AnalysisResult::default() };

        if let Some(t) = self.terminal_score(state) {
            result.score = t;
            return self.finish(result);
        }
        if legal_plies(state).is_empty() {
            return self.finish(result);
        }

        let mut best_move: Option<Ply> = None;
        for depth in 1..=max_depth.max(1) {
            if let Some(tt) = self.tt.as_mut() { tt.bump_generation(); }
            let Some(outcome) = self.search_root(state, depth, best_move) else {
                debug!("depth {depth} aborted after {} nodes; keeping depth {}", self.nodes, result.depth);
                break;
            };
            best_move = outcome.pv.first().copied();
            debug!(
                "depth {depth} score {:.2} nodes {} best {}",
                outcome.score,
                self.nodes,
                best_move.map_or_else(|| "(none)".to_string(), |p| p.to_string())
            );
            result.depth = depth;
            result.score = outcome.score;
            result.pv = outcome.pv;
            result.top_moves = outcome.top;
            result.best_move = best_move;
        }
        self.finish(result)
    }

    fn finish(&self, mut result: AnalysisResult) -> AnalysisResult {
        result.nodes = self.nodes;
        result.tt_hits = self.tt_hits;
        result.tt_misses = self.tt_misses;
        result
    }

    /// Scores one given ply by searching the resulting position `depth` deep.
    /// If the budget runs out, the static evaluation after the ply is returned.
    pub fn score_ply(&mut self, state: &GameState, ply: &Ply, depth: u32) -> Result<(f64, Vec<Ply>)> {
        let child = play_ply(state, ply)?;
        let root_sign = self.sign(state);
        match self.negamax(&child, depth, f64::NEG_INFINITY, f64::INFINITY) {
            Some((child_score, child_pv)) => {
                let pv = std::iter::once(*ply).chain(child_pv).collect();
                Ok((root_sign * -child_score, pv))
            }
            None => Ok((self.static_eval(&child), vec![*ply])),
        }
    }

    pub fn tt_probe(&self, state: &GameState) -> Option<(u32, Bound)> {
        self.tt.as_ref()?.get(position_key(state)).map(|e| (e.depth, e.bound))
    }

    /// The entry a search of `state` would see, and whether it was found only
    /// under the canonical key. Does not touch the hit counters.
    pub fn tt_entry(&self, state: &GameState) -> Option<(Entry, bool)> {
        self.tt_find(position_key(state), position_key_with_symmetry(state))
    }
}

/// TT move first, then captures, mill closures, and blocks of opponent
/// open-mill squares. Stable, so generation order breaks ties.
pub fn order_plies(state: &GameState, mut plies: Vec<Ply>, tt_best: Option<&Ply>) -> Vec<Ply> {
    let threats = open_mill_squares(state.board(), state.to_move().opponent());
    plies.sort_by_cached_key(|ply| {
        let tt = tt_best == Some(ply);
        let capture = ply.is_capture() || ply.kind == PlyKind::Remove;
        let formed = closes_mill(state, ply);
        let block = ply.dst.map_or(false, |d| threats.contains_key(&d));
        Reverse((tt, capture, formed, block))
    });
    plies
}

/// Analyses `state` for `for_player` (defaults to the side to move).
pub fn analyze(state: &GameState, limits: &Limits, for_player: Option<Player>) -> AnalysisResult {
    let mut searcher = Searcher::new(limits, for_player.unwrap_or(state.to_move()));
    searcher.analyze(state, limits.max_depth)
}

pub fn best_move(state: &GameState, limits: &Limits, for_player: Option<Player>) -> Option<Ply> {
    analyze(state, limits, for_player).best_move
}

/// Score of a specific ply at `max_depth - 1` plies below it, for classifying
/// a played move that did not make the top-N list.
pub fn score_ply(state: &GameState, ply: &Ply, limits: &Limits, for_player: Option<Player>) -> Result<(f64, Vec<Ply>)> {
    let mut searcher = Searcher::new(limits, for_player.unwrap_or(state.to_move()));
    searcher.score_ply(state, ply, limits.max_depth.max(1) - 1)
}
