//! Simulated per-move evaluation series.
//!
//! This is a heuristic stand-in for engine analysis, not a real evaluation.
//! Values are from White's point of view.

use serde::Serialize;

const CAPTURE_BONUS: f64 = 0.3;
const CHECK_BONUS: f64 = 0.2;
const CASTLE_BONUS: f64 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveQuality {
    Excellent,
    Good,
    Neutral,
    Questionable,
}

impl MoveQuality {
    pub fn label(self) -> &'static str {
        match self {
            MoveQuality::Excellent => "Excellent move",
            MoveQuality::Good => "Good move",
            MoveQuality::Neutral => "Neutral move",
            MoveQuality::Questionable => "Questionable move",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationPoint {
    /// 1-based move number on the chart axis.
    pub move_number: usize,
    pub san: String,
    pub evaluation: f64,
    pub quality: MoveQuality,
    pub is_current: bool,
}

/// Simulated evaluation of the move at `index`.
pub fn evaluate_move(san: &str, index: usize) -> f64 {
    let mut eval = 0.0;
    if san.contains('x') {
        eval += CAPTURE_BONUS;
    }
    if san.contains('+') {
        eval += CHECK_BONUS;
    }
    if san == "O-O" || san == "O-O-O" {
        eval += CASTLE_BONUS;
    }
    eval += (index as f64 * 0.7).sin() * 0.5;

    if index % 2 == 0 {
        eval
    } else {
        -eval
    }
}

pub fn classify(evaluation: f64) -> MoveQuality {
    if evaluation > 0.3 {
        MoveQuality::Excellent
    } else if evaluation > 0.0 {
        MoveQuality::Good
    } else if evaluation > -0.3 {
        MoveQuality::Neutral
    } else {
        MoveQuality::Questionable
    }
}

/// One point per move; `current` is the ply pointer (-1 marks none).
pub fn evaluation_series(moves: &[String], current: isize) -> Vec<EvaluationPoint> {
    moves
        .iter()
        .enumerate()
        .map(|(index, san)| {
            let evaluation = evaluate_move(san, index);
            EvaluationPoint {
                move_number: index + 1,
                san: san.clone(),
                evaluation,
                quality: classify(evaluation),
                is_current: index as isize == current,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_move_has_no_oscillation() {
        assert!(approx(evaluate_move("e4", 0), 0.0));
        assert!(approx(evaluate_move("exd5", 0), 0.3));
        assert!(approx(evaluate_move("O-O", 0), 0.4));
        assert!(approx(evaluate_move("Bxf7+", 0), 0.5));
    }

    #[test]
    fn test_black_moves_negated() {
        let expected = -(0.7f64.sin() * 0.5);
        assert!(approx(evaluate_move("e5", 1), expected));
        assert!(approx(evaluate_move("Nxe4", 1), -(0.3 + 0.7f64.sin() * 0.5)));
    }

    #[test]
    fn test_castling_bonus_needs_exact_token() {
        assert!(approx(evaluate_move("O-O+", 0), 0.2));
    }

    #[test]
    fn test_classify_buckets() {
        assert_eq!(classify(0.31), MoveQuality::Excellent);
        assert_eq!(classify(0.3), MoveQuality::Good);
        assert_eq!(classify(0.0), MoveQuality::Neutral);
        assert_eq!(classify(-0.3), MoveQuality::Questionable);
        assert_eq!(MoveQuality::Good.label(), "Good move");
    }

    #[test]
    fn test_series_marks_current() {
        let moves: Vec<String> = ["e4", "e5", "Nf3"].iter().map(|s| s.to_string()).collect();
        let series = evaluation_series(&moves, 1);
        assert_eq!(series.len(), 3);
        assert_eq!(series[2].move_number, 3);
        assert_eq!(
            series.iter().map(|p| p.is_current).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert!(evaluation_series(&moves, -1).iter().all(|p| !p.is_current));
    }
}
