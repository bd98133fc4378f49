// Nine Men's Morris rules, ply generation and alpha-beta analysis
pub mod board;
pub mod error;
pub mod notation;
pub mod rules;
pub mod sampling;
pub mod search;

pub use board::{Board, GameState, Phase, Player, Stone};
pub use error::{MuehleError, Result};
pub use rules::{Action, DrawReason};
pub use search::alphabeta::{analyze, best_move, score_ply, AnalysisResult, Limits, ScoredMove};
pub use search::eval::{evaluate, EvalBreakdown, EvalWeights};
pub use search::movegen::{apply_ply, legal_plies, play_ply, Ply, PlyKind};
