pub mod state;
pub mod topology;
pub mod zobrist;

pub use state::{Board, DrawTracker, GameState, Phase, Player, Stone};
