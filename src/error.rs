use thiserror::Error;

use crate::rules::Action;
use crate::search::movegen::Ply;

/// Errors raised synchronously by state transitions. A failed transition never
/// leaves a partially updated state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MuehleError {
    #[error("illegal action: {0}")]
    IllegalAction(Action),
    #[error("malformed ply {ply:?}: {reason}")]
    MalformedPly { ply: Ply, reason: &'static str },
    #[error("invalid state shape: {0}")]
    InvalidStateShape(String),
    #[error("cannot parse {input:?}: {reason}")]
    Notation { input: String, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, MuehleError>;
