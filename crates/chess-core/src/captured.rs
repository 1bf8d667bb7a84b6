//! Captured-piece accounting.
//!
//! Lists are keyed by the side that lost the pieces: a capture made by White
//! lands in `black`, a capture made by Black lands in `white`. How a list is
//! drawn is a separate question, answered by [`display_symbol`].

use serde::Serialize;
use tracing::warn;

use crate::rules::{PieceKind, RulesEngine, ShakmatyEngine, Side};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CapturedPieces {
    /// Pieces White lost, in capture order.
    pub white: Vec<char>,
    /// Pieces Black lost, in capture order.
    pub black: Vec<char>,
}

impl CapturedPieces {
    /// Credit a capture made by `captor`.
    pub fn record(&mut self, captor: Side, kind: PieceKind) {
        match captor {
            Side::White => self.black.push(kind.letter()),
            Side::Black => self.white.push(kind.letter()),
        }
    }

    pub fn len(&self) -> usize {
        self.white.len() + self.black.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lost_by(&self, side: Side) -> &[char] {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }
}

/// Captured pieces for `moves[0..=target]`, on a fresh engine.
pub fn captured_pieces(moves: &[String], target: isize) -> CapturedPieces {
    captured_pieces_with(&mut ShakmatyEngine::new(), moves, target)
}

pub fn captured_pieces_with<E: RulesEngine>(
    engine: &mut E,
    moves: &[String],
    target: isize,
) -> CapturedPieces {
    engine.reset();
    let mut captured = CapturedPieces::default();
    if target < 0 {
        return captured;
    }

    for (ply, token) in moves.iter().enumerate().take(target as usize + 1) {
        match engine.apply(ply, token) {
            Ok(applied) => {
                if let Some(kind) = applied.captured {
                    captured.record(applied.color, kind);
                }
            }
            Err(e) => {
                warn!(error = %e, "Capture accounting halted");
                break;
            }
        }
    }
    captured
}

const DISPLAY_ORDER: [char; 5] = ['q', 'r', 'b', 'n', 'p'];

/// Sorted for display: queens first, pawns last.
pub fn display_order(pieces: &[char]) -> Vec<char> {
    let rank = |c: &char| {
        DISPLAY_ORDER
            .iter()
            .position(|o| *o == c.to_ascii_lowercase())
            .unwrap_or(DISPLAY_ORDER.len())
    };
    let mut sorted = pieces.to_vec();
    sorted.sort_by_key(rank);
    sorted
}

/// Glyph for an entry of the list owned by `list_side`.
///
/// The `white` list is drawn with black glyphs and the `black` list with
/// white glyphs.
pub fn display_symbol(piece: char, list_side: Side) -> char {
    let Some(kind) = PieceKind::from_letter(piece) else {
        return piece;
    };
    match (list_side, kind) {
        (Side::White, PieceKind::King) => '♚',
        (Side::White, PieceKind::Queen) => '♛',
        (Side::White, PieceKind::Rook) => '♜',
        (Side::White, PieceKind::Bishop) => '♝',
        (Side::White, PieceKind::Knight) => '♞',
        (Side::White, PieceKind::Pawn) => '♟',
        (Side::Black, PieceKind::King) => '♔',
        (Side::Black, PieceKind::Queen) => '♕',
        (Side::Black, PieceKind::Rook) => '♖',
        (Side::Black, PieceKind::Bishop) => '♗',
        (Side::Black, PieceKind::Knight) => '♘',
        (Side::Black, PieceKind::Pawn) => '♙',
    }
}
