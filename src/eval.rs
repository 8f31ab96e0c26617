/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, File, Move, PieceKind, Rank, Square};

use crate::{Board, Psqt, Score};

/// Non-pawn material of both sides in a standard setup.
pub const INITIAL_NON_PAWN_MATERIAL: i32 = value_of(PieceKind::Knight) * 4
    + value_of(PieceKind::Bishop) * 4
    + value_of(PieceKind::Rook) * 4
    + value_of(PieceKind::Queen) * 2;

/// Material and Piece-Square totals for one side.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    /// Raw value of every piece.
    pub raw: i32,

    /// Sum of the beginning Piece-Square tables.
    pub beginning: i32,

    /// Sum of the endgame Piece-Square tables.
    pub endgame: i32,

    /// Raw value of every piece except pawns and the king.
    pub non_pawn: i32,
}

impl Material {
    #[inline(always)]
    fn add(&mut self, kind: PieceKind, color: Color, square: Square) {
        let value = value_of(kind);
        let (beg, end) = Psqt::evals(kind, color, square);

        self.raw += value;
        self.beginning += beg;
        self.endgame += end;
        if kind != PieceKind::Pawn {
            self.non_pawn += value;
        }
    }
}

/// Encapsulates the logic of scoring a chess position.
///
/// Scores are absolute: a high score is good for White, and a low score is good for Black.
#[derive(Debug, Clone)]
pub struct Evaluator<'a, B> {
    /// The board whose position to evaluate.
    board: &'a B,

    white: Material,

    black: Material,
}

impl<'a, B: Board> Evaluator<'a, B> {
    /// Construct a new [`Evaluator`], tallying the material of both sides.
    pub fn new(board: &'a B) -> Self {
        let mut white = Material::default();
        let mut black = Material::default();

        for (square, piece) in board.pieces() {
            match piece.color() {
                Color::White => white.add(piece.kind(), Color::White, square),
                Color::Black => black.add(piece.kind(), Color::Black, square),
            }
        }

        Self {
            board,
            white,
            black,
        }
    }

    /// Evaluate this position.
    ///
    /// Decided games score as mate or draw; everything else is scored by [`Evaluator::material`].
    #[inline(always)]
    pub fn eval(&self) -> Score {
        terminal_score(self.board, &self.board.legal_moves()).unwrap_or_else(|| self.material())
    }

    /// Material and Piece-Square score, blending the beginning and endgame tables by game phase.
    ///
    /// The blend is evaluated as a single fraction over [`INITIAL_NON_PAWN_MATERIAL`] and rounded
    /// once, so mirrored positions always score as exact opposites.
    pub fn material(&self) -> Score {
        let weight = self.beginning_weight();

        let raw = self.white.raw - self.black.raw;
        let beg = self.white.beginning - self.black.beginning;
        let end = self.white.endgame - self.black.endgame;

        let numerator = raw * INITIAL_NON_PAWN_MATERIAL
            + beg * weight
            + end * (INITIAL_NON_PAWN_MATERIAL - weight);

        Score::from_ratio(numerator, INITIAL_NON_PAWN_MATERIAL)
    }

    /// Totals for `color`.
    #[inline(always)]
    pub const fn side(&self, color: Color) -> &Material {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// Non-pawn material of both sides, capped at its starting value.
    ///
    /// This is the weight of the beginning tables, out of [`INITIAL_NON_PAWN_MATERIAL`].
    #[inline(always)]
    fn beginning_weight(&self) -> i32 {
        (self.white.non_pawn + self.black.non_pawn).min(INITIAL_NON_PAWN_MATERIAL)
    }

    /// Fraction of the game's material that has come off the board, in the range `[0, 1]`.
    #[inline(always)]
    pub fn endgame_coefficient(&self) -> f32 {
        1.0 - self.beginning_weight() as f32 / INITIAL_NON_PAWN_MATERIAL as f32
    }

    /// Fetches the blended value of the piece on the specified square, if one exists.
    ///
    /// Only used when printing the evaluator
    fn value_at(&self, square: Square) -> Option<Score> {
        self.board.piece_at(square).map(|piece| {
            let weight = self.beginning_weight();
            let (beg, end) = Psqt::evals(piece.kind(), piece.color(), square);
            let numerator = value_of(piece.kind()) * INITIAL_NON_PAWN_MATERIAL
                + beg * weight
                + end * (INITIAL_NON_PAWN_MATERIAL - weight);

            let score = Score::from_ratio(numerator, INITIAL_NON_PAWN_MATERIAL);
            match piece.color() {
                Color::White => score,
                Color::Black => -score,
            }
        })
    }
}

impl<B: Board> fmt::Display for Evaluator<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  +")?;
        for _ in File::iter() {
            write!(f, "-----+")?;
        }
        writeln!(f)?;

        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;

            // Step 1: Write the piece char
            for file in File::iter() {
                let square = Square::new(file, rank);
                let piece_char = self.board.piece_at(square).map(|p| p.char()).unwrap_or(' ');
                write!(f, "  {piece_char}  |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece
            for file in File::iter() {
                let square = Square::new(file, rank);
                let score = if let Some(val) = self.value_at(square) {
                    let s = if val > Score::DRAW {
                        format!("+{}", val.normalize())
                    } else {
                        format!("{}", val.normalize())
                    };

                    format!("{s:^5}")
                } else {
                    String::from("     ")
                };
                write!(f, "{score}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "-----+")?;
            }
            writeln!(f)?;
        }
        for file in File::iter() {
            write!(f, "     {file}")?;
        }

        writeln!(f, "\n\nEndgame: {:.1}%", self.endgame_coefficient() * 100.0)?;
        for color in [Color::White, Color::Black] {
            let side = self.side(color);
            writeln!(
                f,
                "{:<6} raw {:>5} beginning {:>5} endgame {:>5}",
                color.name(),
                side.raw,
                side.beginning,
                side.endgame
            )?;
        }

        let score = self.eval();
        let winning_side = if score > Score::DRAW {
            Some(Color::White)
        } else if score < Score::DRAW {
            Some(Color::Black)
        } else {
            None
        };

        writeln!(
            f,
            "Winning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        write!(f, "Score: {score}")
    }
}

/// Evaluate `board` from scratch.
#[inline(always)]
pub fn evaluate<B: Board>(board: &B) -> Score {
    evaluate_with_moves(board, &board.legal_moves())
}

/// Evaluate `board`, whose legal moves the caller has already generated as `legal`.
#[inline(always)]
pub fn evaluate_with_moves<B: Board>(board: &B, legal: &[Move]) -> Score {
    terminal_score(board, legal).unwrap_or_else(|| Evaluator::new(board).material())
}

/// Returns the score of a position whose outcome is already decided by the rules, if any.
///
/// The side to move being checkmated scores as a mate for its opponent;
/// every kind of draw scores as [`Score::DRAW`].
pub fn terminal_score<B: Board>(board: &B, legal: &[Move]) -> Option<Score> {
    if legal.is_empty() {
        let score = if board.is_in_check() {
            Score::mate_for(board.side_to_move().opponent())
        } else {
            Score::DRAW
        };
        return Some(score);
    }

    board.is_draw_by_rule().then_some(Score::DRAW)
}

/// Returns a value of the provided `PieceKind`.
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 300,
        PieceKind::Bishop => 305,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 0, // King is invaluable, but 0 is easier to work with in computations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameBoard;

    fn eval(fen: &str) -> Score {
        evaluate(&GameBoard::from_fen(fen).unwrap())
    }

    #[test]
    fn test_initial_material() {
        assert_eq!(INITIAL_NON_PAWN_MATERIAL, 6220);
    }

    #[test]
    fn test_startpos_is_equal() {
        assert_eq!(evaluate(&GameBoard::default()), Score::DRAW);
    }

    #[test]
    fn test_checkmate_scores_against_the_mated_side() {
        // Black to move, back-rank mated
        assert_eq!(eval("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1"), Score::MATE);

        // White to move, back-rank mated
        assert_eq!(eval("6k1/8/8/8/8/8/5PPP/r5K1 w - - 0 1"), -Score::MATE);
    }

    #[test]
    fn test_draws_score_zero() {
        // Stalemate
        assert_eq!(eval("k7/8/KQ6/8/8/8/8/8 b - - 0 1"), Score::DRAW);

        // Insufficient material
        assert_eq!(eval("8/8/4k3/8/8/3K4/8/8 w - - 0 1"), Score::DRAW);
        assert_eq!(eval("8/8/4k3/8/8/3KN3/8/8 w - - 0 1"), Score::DRAW);

        // Fifty-move rule, despite the extra rook
        assert_eq!(eval("8/8/4k3/8/8/3K4/4R3/8 w - - 100 80"), Score::DRAW);
    }

    #[test]
    fn test_evaluation_with_known_moves() {
        let fens = [
            chessie::FEN_STARTPOS,
            "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1",
            "k7/8/KQ6/8/8/8/8/8 b - - 0 1",
            "8/8/4k3/8/8/3K4/4R3/8 w - - 100 80",
            "4k3/8/8/8/8/8/8/3QK3 w - - 0 1",
        ];

        for fen in fens {
            let board = GameBoard::from_fen(fen).unwrap();
            assert_eq!(evaluate_with_moves(&board, &board.legal_moves()), evaluate(&board), "{fen}");
        }
    }

    #[test]
    fn test_mirrored_positions_are_opposite() {
        let pairs = [
            (
                "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
                "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3",
            ),
            (
                "8/5k2/3p4/8/2B5/8/1P3K2/8 w - - 0 40",
                "8/1p3k2/8/2b5/8/3P4/5K2/8 b - - 0 40",
            ),
        ];

        for (white, black) in pairs {
            assert_eq!(eval(white), -eval(black), "{white} vs {black}");
        }
    }

    #[test]
    fn test_material_advantage() {
        // White is up a queen
        let score = eval("4k3/8/8/8/8/8/8/3QK3 w - - 0 1");
        assert!(score > 800, "{score}");

        // Black is up a rook
        let score = eval("3rk3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert!(score < -400, "{score}");
    }

    #[test]
    fn test_phase_blend() {
        // Lone kings and pawns: pure endgame tables
        let board = GameBoard::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        let evaluator = Evaluator::new(&board);
        assert_eq!(evaluator.endgame_coefficient(), 1.0);

        // e1 king on KING_END is -10, e2 pawn on PAWN_END is -20; e8 black king mirrors e1
        let expected = 100 + (-20) + (-10) - (-10);
        assert_eq!(evaluator.material(), expected);

        // Startpos: pure beginning tables
        let board = GameBoard::default();
        assert_eq!(Evaluator::new(&board).endgame_coefficient(), 0.0);
    }
}
