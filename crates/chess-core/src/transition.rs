//! Transition planning between two snapshots.
//!
//! Pure data for whoever animates the board: which pieces slide where, which
//! disappear and which appear. Nothing here depends on a rendering stack.

use serde::Serialize;

use crate::replay::GameSnapshot;
use crate::rules::{BoardGrid, BoardPiece, SquareName};

/// Decode the piece-placement field of a FEN into a grid.
///
/// Malformed input decodes to whatever squares could be read.
pub fn board_from_fen(fen: &str) -> BoardGrid {
    let mut grid: BoardGrid = [[None; 8]; 8];
    let placement = fen.split_whitespace().next().unwrap_or("");

    for (row, rank) in placement.split('/').take(8).enumerate() {
        let mut col = 0usize;
        for c in rank.chars() {
            if let Some(skip) = c.to_digit(10) {
                col += skip as usize;
            } else if let Some(piece) = BoardPiece::from_fen_char(c) {
                if col < 8 {
                    grid[row][col] = Some(piece);
                }
                col += 1;
            }
        }
    }
    grid
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PieceMotion {
    #[serde(serialize_with = "serialize_piece")]
    pub piece: BoardPiece,
    pub from: SquareName,
    pub to: SquareName,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlacedPiece {
    #[serde(serialize_with = "serialize_piece")]
    pub piece: BoardPiece,
    pub square: SquareName,
}

fn serialize_piece<S: serde::Serializer>(piece: &BoardPiece, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_char(piece.fen_char())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transition {
    #[serde(skip)]
    from_board: BoardGrid,
    #[serde(skip)]
    to_board: BoardGrid,
    pub moving: Vec<PieceMotion>,
    pub vanishing: Vec<PlacedPiece>,
    pub appearing: Vec<PlacedPiece>,
}

impl Transition {
    /// Plan the change from `prev` to `next`.
    ///
    /// `next.last_move` decides the primary motion when it starts on a square
    /// that changed; other motions pair a vacated square with the nearest
    /// square that received the same piece.
    pub fn between(prev: &GameSnapshot, next: &GameSnapshot) -> Self {
        let from_board = board_from_fen(&prev.position);
        let to_board = board_from_fen(&next.position);

        let mut left = Vec::new();
        let mut arrived = Vec::new();
        for row in 0..8 {
            for col in 0..8 {
                let (before, after) = (from_board[row][col], to_board[row][col]);
                if before == after {
                    continue;
                }
                let Some(square) = SquareName::new(row, col) else {
                    continue;
                };
                if let Some(piece) = before {
                    left.push(PlacedPiece { piece, square });
                }
                if let Some(piece) = after {
                    arrived.push(PlacedPiece { piece, square });
                }
            }
        }

        let mut moving = Vec::new();

        if let Some(last) = next.last_move {
            let origin = left.iter().position(|p| p.square == last.from);
            let target = arrived.iter().position(|p| p.square == last.to);
            if let (Some(o), Some(t)) = (origin, target) {
                // A promotion keeps drawing the pawn until the move lands
                let piece = left[o].piece;
                moving.push(PieceMotion {
                    piece,
                    from: last.from,
                    to: last.to,
                });
                left.remove(o);
                arrived.remove(t);
            }
        }

        let mut vanishing = Vec::new();
        for gone in left {
            let nearest = arrived
                .iter()
                .enumerate()
                .filter(|(_, a)| a.piece == gone.piece)
                .min_by_key(|(_, a)| distance(gone.square, a.square))
                .map(|(i, _)| i);
            match nearest {
                Some(i) => {
                    let landed = arrived.remove(i);
                    moving.push(PieceMotion {
                        piece: gone.piece,
                        from: gone.square,
                        to: landed.square,
                    });
                }
                None => vanishing.push(gone),
            }
        }

        Self {
            from_board,
            to_board,
            moving,
            vanishing,
            appearing: arrived,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.moving.is_empty() && self.vanishing.is_empty() && self.appearing.is_empty()
    }

    /// Pieces that stay put at `progress`; moving pieces are left out while in
    /// flight and drawn from [`Transition::in_flight`].
    pub fn board_at(&self, progress: f64) -> BoardGrid {
        if progress >= 1.0 {
            return self.to_board;
        }
        if progress <= 0.0 {
            return self.from_board;
        }
        let mut board = self.from_board;
        for motion in &self.moving {
            board[motion.from.row as usize][motion.from.col as usize] = None;
        }
        board
    }

    /// Eased (row, col) coordinates of every moving piece at `progress`.
    pub fn in_flight(&self, progress: f64) -> Vec<(BoardPiece, (f64, f64))> {
        self.moving
            .iter()
            .map(|m| (m.piece, interpolate(m.from, m.to, progress)))
            .collect()
    }
}

fn distance(a: SquareName, b: SquareName) -> u8 {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}

pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

/// Square-space (row, col) position between two squares at `progress`.
pub fn interpolate(from: SquareName, to: SquareName, progress: f64) -> (f64, f64) {
    let eased = ease_in_out_cubic(progress);
    let lerp = |a: u8, b: u8| a as f64 + (b as f64 - a as f64) * eased;
    (lerp(from.row, to.row), lerp(from.col, to.col))
}
