//! Core error types

use serde::Serialize;
use thiserror::Error;

/// A PGN load that produced nothing playable. The caller keeps its previous game.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty PGN text")]
    Empty,

    #[error("no valid games found")]
    NoValidGames,
}

/// A move token that cannot be applied at its position in the sequence.
///
/// Replay absorbs this and halts on the previous ply; it only surfaces to
/// callers that ask where a sequence stops being reachable.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("illegal move '{san}' at ply {ply}: {reason}")]
pub struct IllegalMove {
    pub ply: usize,
    pub san: String,
    pub reason: String,
}
