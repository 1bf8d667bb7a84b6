//! Replay engine: rebuilds the game state at a ply from the move list.
//!
//! Every call starts from a reset adapter, so a snapshot depends only on the
//! moves up to the requested ply.

use serde::Serialize;
use tracing::warn;

use crate::captured::CapturedPieces;
use crate::error::IllegalMove;
use crate::rules::{BoardGrid, PieceKind, RulesEngine, ShakmatyEngine, Side, SquareName};

/// Ply index of the initial position.
pub const INITIAL_PLY: isize = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LastMove {
    pub from: SquareName,
    pub to: SquareName,
}

/// Derived state at one ply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Ply actually reached; lower than requested when replay halted.
    pub ply: isize,
    pub position: String,
    pub last_move: Option<LastMove>,
    pub captured: CapturedPieces,
    pub in_check: bool,
    pub in_checkmate: bool,
    pub king_square: Option<SquareName>,
    pub turn: Side,
}

/// Clamp a requested ply into `[-1, len-1]`.
pub fn clamp_ply(target: isize, len: usize) -> isize {
    target.clamp(INITIAL_PLY, len as isize - 1)
}

/// First king of `side` in row-major order (row 0 = rank 8).
pub fn find_king(board: &BoardGrid, side: Side) -> Option<SquareName> {
    for (row, cells) in board.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if let Some(piece) = cell {
                if piece.kind == PieceKind::King && piece.side == side {
                    return SquareName::new(row, col);
                }
            }
        }
    }
    None
}

/// Owns a rules engine and replays move lists on it.
#[derive(Debug, Default)]
pub struct Replayer<E = ShakmatyEngine> {
    engine: E,
}

impl Replayer<ShakmatyEngine> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: RulesEngine> Replayer<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    /// Replay `moves[0..=target]` from the initial position.
    ///
    /// `target` is clamped to the sequence. On an illegal token the replay
    /// stops at the last applied move and reports that state.
    pub fn replay(&mut self, moves: &[String], target: isize) -> GameSnapshot {
        self.engine.reset();
        let target = clamp_ply(target, moves.len());

        let mut reached = INITIAL_PLY;
        let mut last_move = None;
        let mut captured = CapturedPieces::default();

        for (ply, token) in moves.iter().enumerate().take((target + 1) as usize) {
            match self.engine.apply(ply, token) {
                Ok(applied) => {
                    if let Some(kind) = applied.captured {
                        captured.record(applied.color, kind);
                    }
                    last_move = Some(LastMove {
                        from: applied.from,
                        to: applied.to,
                    });
                    reached = ply as isize;
                }
                Err(e) => {
                    warn!(error = %e, "Replay halted");
                    break;
                }
            }
        }

        self.snapshot(reached, last_move, captured)
    }

    /// Where the sequence stops being replayable, if anywhere.
    pub fn first_illegal(&mut self, moves: &[String]) -> Option<IllegalMove> {
        self.engine.reset();
        moves
            .iter()
            .enumerate()
            .find_map(|(ply, token)| self.engine.apply(ply, token).err())
    }

    /// Build the snapshot for the engine's current position.
    pub(crate) fn snapshot(
        &self,
        ply: isize,
        last_move: Option<LastMove>,
        captured: CapturedPieces,
    ) -> GameSnapshot {
        let in_check = self.engine.in_check();
        let in_checkmate = self.engine.is_checkmate();
        let turn = self.engine.turn();
        let king_square = if in_check || in_checkmate {
            find_king(&self.engine.board(), turn)
        } else {
            None
        };

        GameSnapshot {
            ply,
            position: self.engine.fen(),
            last_move,
            captured,
            in_check,
            in_checkmate,
            king_square,
            turn,
        }
    }

    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
