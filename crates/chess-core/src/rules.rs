//! Rules engine adapter.
//!
//! The viewer never implements chess rules itself. Everything it needs from a
//! rules engine goes through [`RulesEngine`]; [`ShakmatyEngine`] binds it to
//! shakmaty.

use std::fmt;

use serde::{Serialize, Serializer};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, EnPassantMode, File, Move, Position, Rank, Role, Square};

use crate::error::IllegalMove;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// FEN side-to-move letter.
    pub fn letter(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }
}

impl Serialize for Side {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.letter())
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase type letter, as used in captured-piece lists.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

impl From<Role> for PieceKind {
    fn from(role: Role) -> Self {
        match role {
            Role::Pawn => PieceKind::Pawn,
            Role::Knight => PieceKind::Knight,
            Role::Bishop => PieceKind::Bishop,
            Role::Rook => PieceKind::Rook,
            Role::Queen => PieceKind::Queen,
            Role::King => PieceKind::King,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoardPiece {
    pub kind: PieceKind,
    pub side: Side,
}

impl BoardPiece {
    /// FEN letter: uppercase for White.
    pub fn fen_char(self) -> char {
        match self.side {
            Side::White => self.kind.letter().to_ascii_uppercase(),
            Side::Black => self.kind.letter(),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Self> {
        let kind = PieceKind::from_letter(c)?;
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Self { kind, side })
    }
}

/// 8×8 grid, row 0 = rank 8, column 0 = file a.
pub type BoardGrid = [[Option<BoardPiece>; 8]; 8];

/// A board square by (row, col), named like `e4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SquareName {
    pub row: u8,
    pub col: u8,
}

impl SquareName {
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < 8 && col < 8).then_some(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    pub fn parse(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].checked_sub(b'a')? as usize;
        let rank = bytes[1].checked_sub(b'1')? as usize;
        if rank > 7 {
            return None;
        }
        Self::new(7 - rank, col)
    }

    pub fn file_char(self) -> char {
        (b'a' + self.col) as char
    }

    pub fn rank_char(self) -> char {
        (b'8' - self.row) as char
    }
}

impl fmt::Display for SquareName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl Serialize for SquareName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<Square> for SquareName {
    fn from(sq: Square) -> Self {
        let col = sq.file() as u8;
        let rank = sq.rank() as u8;
        Self { row: 7 - rank, col }
    }
}

/// Grid coordinates to a shakmaty square; `None` off the board.
pub(crate) fn to_square(row: usize, col: usize) -> Option<Square> {
    if row > 7 || col > 7 {
        return None;
    }
    Some(Square::from_coords(
        File::new(col as u32),
        Rank::new((7 - row) as u32),
    ))
}

/// What the rules engine reports for one applied move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub from: SquareName,
    pub to: SquareName,
    pub captured: Option<PieceKind>,
    pub color: Side,
}

/// Legal-move application and board introspection.
pub trait RulesEngine {
    /// Restore the standard starting position.
    fn reset(&mut self);

    /// Apply one SAN token in the current position. `ply` is only used to
    /// label the error.
    fn apply(&mut self, ply: usize, token: &str) -> Result<AppliedMove, IllegalMove>;

    fn fen(&self) -> String;

    fn board(&self) -> BoardGrid;

    fn in_check(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    fn turn(&self) -> Side;
}

#[derive(Clone, Debug, Default)]
pub struct ShakmatyEngine {
    pos: Chess,
}

impl ShakmatyEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RulesEngine for ShakmatyEngine {
    fn reset(&mut self) {
        self.pos = Chess::default();
    }

    fn apply(&mut self, ply: usize, token: &str) -> Result<AppliedMove, IllegalMove> {
        let illegal = |reason: String| IllegalMove {
            ply,
            san: token.to_string(),
            reason,
        };

        let san: SanPlus = token
            .parse()
            .map_err(|e| illegal(format!("invalid SAN: {e}")))?;
        let mv = san
            .san
            .to_move(&self.pos)
            .map_err(|e| illegal(format!("not legal here: {e}")))?;

        let color = Side::from(self.pos.turn());
        let (from, to, captured) = match &mv {
            Move::Normal {
                from, to, capture, ..
            } => (*from, *to, capture.map(PieceKind::from)),
            Move::EnPassant { from, to } => (*from, *to, Some(PieceKind::Pawn)),
            Move::Castle { king, rook } => {
                // Report the king's destination, not the rook square
                let file = if rook.file() > king.file() {
                    File::G
                } else {
                    File::C
                };
                (*king, Square::from_coords(file, king.rank()), None)
            }
            Move::Put { .. } => return Err(illegal("drops are not chess moves".into())),
        };

        self.pos.play_unchecked(mv);

        Ok(AppliedMove {
            from: from.into(),
            to: to.into(),
            captured,
            color,
        })
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    fn board(&self) -> BoardGrid {
        let board = self.pos.board();
        let mut grid: BoardGrid = [[None; 8]; 8];
        for (row, cells) in grid.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = to_square(row, col)
                    .and_then(|sq| board.piece_at(sq))
                    .map(|p| BoardPiece {
                        kind: p.role.into(),
                        side: p.color.into(),
                    });
            }
        }
        grid
    }

    fn in_check(&self) -> bool {
        self.pos.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    fn turn(&self) -> Side {
        self.pos.turn().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_mapping() {
        let e4 = SquareName::parse("e4").unwrap();
        assert_eq!((e4.row, e4.col), (4, 4));
        assert_eq!(SquareName::new(0, 0).unwrap().to_string(), "a8");
        assert_eq!(SquareName::new(7, 7).unwrap().to_string(), "h1");
        assert_eq!(SquareName::from(Square::E2).to_string(), "e2");
        assert_eq!(SquareName::parse("i9"), None);
        assert_eq!(to_square(7, 4), Some(Square::E1));
        assert_eq!(to_square(0, 0), Some(Square::A8));
        assert_eq!(to_square(8, 0), None);
        assert_eq!(to_square(0, 8), None);
    }

    #[test]
    fn test_apply_reports_squares_and_color() {
        let mut engine = ShakmatyEngine::new();
        let mv = engine.apply(0, "e4").unwrap();
        assert_eq!(mv.from.to_string(), "e2");
        assert_eq!(mv.to.to_string(), "e4");
        assert_eq!(mv.color, Side::White);
        assert_eq!(mv.captured, None);
        assert_eq!(engine.turn(), Side::Black);
    }

    #[test]
    fn test_castling_reports_king_destination() {
        let mut engine = ShakmatyEngine::new();
        for (ply, san) in ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"].iter().enumerate() {
            engine.apply(ply, san).unwrap();
        }
        let castle = engine.apply(6, "O-O").unwrap();
        assert_eq!(castle.from.to_string(), "e1");
        assert_eq!(castle.to.to_string(), "g1");
    }

    #[test]
    fn test_illegal_move_leaves_position() {
        let mut engine = ShakmatyEngine::new();
        let before = engine.fen();
        let err = engine.apply(0, "Ke2").unwrap_err();
        assert_eq!(err.ply, 0);
        assert_eq!(err.san, "Ke2");
        assert_eq!(engine.fen(), before);
        assert!(engine.apply(0, "zz").is_err());
    }

    #[test]
    fn test_start_position() {
        let engine = ShakmatyEngine::new();
        assert_eq!(engine.fen(), STANDARD_START_FEN);
        let board = engine.board();
        assert_eq!(
            board[0][4],
            Some(BoardPiece {
                kind: PieceKind::King,
                side: Side::Black
            })
        );
        assert_eq!(board[4][4], None);
    }
}
