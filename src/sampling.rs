// Self-play position sampler for weight tuning.
//
// Games are played independently (one `SmallRng` per game, seeded with
// `seed + game_id`) and in parallel; candidates are then merged in game order
// so the output only depends on the parameters, never on thread scheduling.

use std::collections::HashSet;
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::state::{GameState, Phase, Player, Stone};
use crate::board::zobrist::position_key_with_symmetry;
use crate::rules::is_terminal;
use crate::search::alphabeta::{analyze, AnalysisResult, Limits};
use crate::search::movegen::{play_ply, Ply};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTargets {
    pub placing: usize,
    pub moving: usize,
    pub flying: usize,
}

impl PhaseTargets {
    /// 50 % placing, 35 % moving, remainder flying.
    pub fn default_for(total: usize) -> Self {
        let placing = total / 2;
        let moving = total * 35 / 100;
        Self { placing, moving, flying: total - placing - moving }
    }

    /// `"placing,moving,flying"`, which must sum to `total`.
    pub fn parse(raw: &str, total: usize) -> Result<Self> {
        let parts = raw
            .split(',')
            .map(|p| p.trim().parse::<usize>().with_context(|| format!("bad phase target {:?}", p)))
            .collect::<Result<Vec<_>>>()?;
        if parts.len() != 3 {
            bail!("phase targets must be three comma-separated ints: placing,moving,flying");
        }
        if parts.iter().sum::<usize>() != total {
            bail!("phase targets must sum to target ({})", total);
        }
        Ok(Self { placing: parts[0], moving: parts[1], flying: parts[2] })
    }

    pub fn get(&self, phase: Phase) -> usize {
        match phase {
            Phase::Placing => self.placing,
            Phase::Moving => self.moving,
            Phase::Flying => self.flying,
        }
    }

    fn slot(&mut self, phase: Phase) -> &mut usize {
        match phase {
            Phase::Placing => &mut self.placing,
            Phase::Moving => &mut self.moving,
            Phase::Flying => &mut self.flying,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SampleParams {
    pub target: usize,
    pub depth: u32,
    pub top_n: usize,
    pub epsilon: f64,
    pub games: usize,
    pub interval: usize,
    pub max_plies: usize,
    pub seed: u64,
    pub use_tt: bool,
    pub phase_targets: Option<PhaseTargets>,
    pub progress: bool,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            target: 30,
            depth: 4,
            top_n: 5,
            epsilon: 0.2,
            games: 10,
            interval: 2,
            max_plies: 200,
            seed: 7,
            use_tt: true,
            phase_targets: None,
            progress: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleReason {
    Interval,
    PendingRemove,
    Flying,
}

/// One line of the output file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub key: u64,
    pub board: Vec<u8>,
    pub to_move: u8,
    pub to_move_label: String,
    pub in_hand_white: u8,
    pub in_hand_black: u8,
    pub pending_remove: bool,
    pub turn_no: u32,
    pub phase_to_move: Phase,
    pub phase_white: Phase,
    pub phase_black: Phase,
    pub game_id: usize,
    pub ply_index: usize,
    pub reason: Vec<SampleReason>,
}

fn stone_code(s: Stone) -> u8 {
    match s {
        Stone::Empty => 0,
        Stone::White => 1,
        Stone::Black => 2,
    }
}

impl SampleRecord {
    pub fn from_state(state: &GameState, reason: Vec<SampleReason>, game_id: usize, ply_index: usize) -> Self {
        let to_move = state.to_move();
        Self {
            key: position_key_with_symmetry(state),
            board: state.board().iter().map(|s| stone_code(*s)).collect(),
            to_move: stone_code(to_move.stone()),
            to_move_label: to_move.label().to_string(),
            in_hand_white: state.in_hand(Player::White),
            in_hand_black: state.in_hand(Player::Black),
            pending_remove: state.pending_remove(),
            turn_no: state.turn_no(),
            phase_to_move: state.phase(to_move),
            phase_white: state.phase(Player::White),
            phase_black: state.phase(Player::Black),
            game_id,
            ply_index,
            reason,
        }
    }
}

pub fn sample_reasons(state: &GameState, ply_index: usize, interval: usize) -> Vec<SampleReason> {
    let mut reasons = Vec::new();
    if interval > 0 && ply_index % interval == 0 {
        reasons.push(SampleReason::Interval);
    }
    if state.pending_remove() {
        reasons.push(SampleReason::PendingRemove);
    }
    if state.phase(state.to_move()) == Phase::Flying {
        reasons.push(SampleReason::Flying);
    }
    reasons
}

/// Epsilon-greedy: with probability `epsilon` a uniform pick among the top N,
/// otherwise the best move.
pub fn select_ply(result: &AnalysisResult, rng: &mut SmallRng, epsilon: f64, top_n: usize) -> Option<Ply> {
    if result.top_moves.is_empty() {
        return result.best_move;
    }
    if epsilon > 0.0 && rng.gen::<f64>() < epsilon {
        let n = top_n.max(1).min(result.top_moves.len());
        return Some(result.top_moves[rng.gen_range(0..n)].ply);
    }
    result.best_move.or(Some(result.top_moves[0].ply))
}

fn play_game(params: &SampleParams, limits: &Limits, game_id: usize) -> Vec<SampleRecord> {
    let mut rng = SmallRng::seed_from_u64(params.seed.wrapping_add(game_id as u64));
    let mut state = GameState::initial();
    let mut candidates = Vec::new();

    for ply_index in 0..params.max_plies {
        if is_terminal(&state) {
            break;
        }
        let reasons = sample_reasons(&state, ply_index, params.interval);
        if !reasons.is_empty() {
            candidates.push(SampleRecord::from_state(&state, reasons, game_id, ply_index));
        }

        let result = analyze(&state, limits, Some(state.to_move()));
        let Some(ply) = select_ply(&result, &mut rng, params.epsilon, params.top_n) else { break };
        state = match play_ply(&state, &ply) {
            Ok(next) => next,
            Err(e) => {
                debug!("game {} stopped at ply {}: {}", game_id, ply_index, e);
                break;
            }
        };
    }
    debug!("game {} produced {} candidates", game_id, candidates.len());
    candidates
}

/// Plays `params.games` games and returns at most `params.target` distinct
/// positions, respecting the per-phase targets.
pub fn generate_samples(params: &SampleParams) -> Result<Vec<SampleRecord>> {
    if params.target == 0 {
        bail!("target must be > 0");
    }
    let targets = params.phase_targets.unwrap_or_else(|| PhaseTargets::default_for(params.target));
    let limits = Limits { max_depth: params.depth, top_n: params.top_n, use_tt: params.use_tt, ..Limits::default() };

    let pb = if params.progress { ProgressBar::new(params.games as u64) } else { ProgressBar::hidden() };
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} games") {
        pb.set_style(style);
    }

    let per_game: Vec<Vec<SampleRecord>> = (0..params.games)
        .into_par_iter()
        .map(|game_id| {
            let c = play_game(params, &limits, game_id);
            pb.inc(1);
            c
        })
        .collect();
    pb.finish_and_clear();

    let mut counts = PhaseTargets { placing: 0, moving: 0, flying: 0 };
    let mut seen = HashSet::new();
    let mut samples = Vec::new();
    for record in per_game.into_iter().flatten() {
        if samples.len() >= params.target {
            break;
        }
        let phase = record.phase_to_move;
        if *counts.slot(phase) >= targets.get(phase) || !seen.insert(record.key) {
            continue;
        }
        *counts.slot(phase) += 1;
        samples.push(record);
    }
    info!(
        "sampled {} positions (placing={}, moving={}, flying={})",
        samples.len(),
        counts.placing,
        counts.moving,
        counts.flying
    );
    Ok(samples)
}

pub fn write_jsonl<P: AsRef<Path>>(samples: &[SampleRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    for s in samples {
        serde_json::to_writer(&mut w, s)?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<SampleRecord>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut out = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        out.push(serde_json::from_str(&line).with_context(|| format!("{}:{}", path.display(), i + 1))?);
    }
    Ok(out)
}
