pub mod alphabeta;
pub mod eval;
pub mod movegen;
pub mod report;
pub mod tt;
