/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, File, PieceKind, Rank, Square};

// Tables are written as the board is seen from White's side: rank 8 on top, file A on the left.

#[rustfmt::skip]
const PAWN_BEG: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
     70,  70,  70,  70,  80,  70,  70,  70,
     50,  50,  50,  60,  60,  50,  50,  50,
     20,  20,  20,  40,  40,  20,  20,  20,
     10,  10,  15,  30,  30,  15,  10,  10,
      5,   5,  10,  20,  20,  10,   5,   5,
      5,   5,   5, -20, -20,   5,   5,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
]);

#[rustfmt::skip]
const PAWN_END: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
     20,  20,  20,  40,  40,  20,  20,  20,
      5,   5,  15,  30,  30,  15,   5,   5,
      5,   5,  10,  20,  20,  10,   5,   5,
      5,   5,   5, -20, -20,   5,   5,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
]);

#[rustfmt::skip]
const KNIGHT: Psqt = Psqt::new([
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,  -5,  -5,  -5,  -5,  -5,  -5, -10,
    -10,  -5,  15,  15,  15,  15,  -5, -10,
    -10,  -5,  15,  15,  15,  15,  -5, -10,
    -10,  -5,  15,  15,  15,  15,  -5, -10,
    -10,  -5,  15,  15,  15,  15,  -5, -10,
    -10,  -5,  -5,  -5,  -5,  -5,  -5, -10,
    -20,   0, -10, -10, -10, -10,   0, -20,
]);

#[rustfmt::skip]
const BISHOP_BEG: Psqt = Psqt::new([
    -15,   0,   0,   0,   0,   0,   0, -15,
    -15,   0,   0,   0,   0,   0,   0, -15,
    -10,   0,   0,   5,   5,   0,   0, -10,
    -10,  10,  10,  30,  30,  10,  10, -10,
      5,   5,  10,  25,  25,  10,   5,   5,
      5,   5,   5,  10,  10,   5,   5,   5,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
]);

/// Shared by bishops and queens once the board empties out.
#[rustfmt::skip]
const CENTRALIZE_END: Psqt = Psqt::new([
    -30, -20, -10, -10, -10, -10, -20, -30,
    -10,  -5,  10,  10,  10,  10,  -5, -10,
    -10,  -5,  10,  10,  10,  10,  -5, -10,
    -10,  -5,  10,  20,  20,  10,  -5, -10,
    -10,  -5,  10,  20,  20,  10,  -5, -10,
    -10,  -5,  -5,  -5,  -5,  -5,  -5, -10,
    -20, -10,  -5,  -5,  -5,  -5, -10, -20,
    -30, -20, -10, -10, -10, -10, -20, -30,
]);

#[rustfmt::skip]
const ROOK: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
     22,  22,  22,  25,  25,  22,  25,  22,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,  20,  20,  20,   0,   0,
]);

#[rustfmt::skip]
const QUEEN_BEG: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
     10,  10,  10,  10,  10,  10,  10,  10,
     10,  10,  10,  20,  10,  10,  10,  10,
]);

#[rustfmt::skip]
const KING_BEG: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0, -40, -40, -40,   0,   0,
      0,   0,  20, -40, -10, -40,  20,   0,
]);

#[rustfmt::skip]
const KING_END: Psqt = Psqt::new([
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,  -5,  -5,  -5,  -5,  -5,  -5, -10,
    -10,  -5,  15,  15,  15,  15,  -5, -10,
    -10,  -5,  15,  20,  20,  15,  -5, -10,
    -10,  -5,  15,  20,  20,  15,  -5, -10,
    -10,  -5,  15,  15,  15,  15,  -5, -10,
    -10,  -5,  -5,  -5,  -5,  -5,  -5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
]);

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation.
#[derive(Debug)]
pub struct Psqt([i32; Square::COUNT]);

impl Psqt {
    /// Fetch the Piece-Square Tables (beginning and endgame) for the provided [`PieceKind`].
    #[inline(always)]
    pub fn get_tables_for<'a>(kind: PieceKind) -> (&'a Self, &'a Self) {
        match kind {
            PieceKind::Pawn => (&PAWN_BEG, &PAWN_END),
            PieceKind::Knight => (&KNIGHT, &KNIGHT),
            PieceKind::Bishop => (&BISHOP_BEG, &CENTRALIZE_END),
            PieceKind::Rook => (&ROOK, &ROOK),
            PieceKind::Queen => (&QUEEN_BEG, &CENTRALIZE_END),
            PieceKind::King => (&KING_BEG, &KING_END),
        }
    }

    /// Fetch the (beginning, endgame) values for a `kind` of `color` standing on `square`.
    #[inline(always)]
    pub fn evals(kind: PieceKind, color: Color, square: Square) -> (i32, i32) {
        let (beg, end) = Self::get_tables_for(kind);
        (
            beg.get_relative(square, color),
            end.get_relative(square, color),
        )
    }

    /// Creates a new [`Psqt`] from values laid out with rank 8 first.
    const fn new(psqt: [i32; Square::COUNT]) -> Self {
        let mut flipped = psqt;

        let mut i = 0;
        while i < psqt.len() {
            // Flip the rank, not the file, so it can be indexed by White's squares directly
            flipped[i] = psqt[i ^ 56];
            i += 1;
        }

        Self(flipped)
    }

    /// Get the value of this PSQT at the provided square.
    #[inline(always)]
    pub const fn get(&self, square: Square) -> i32 {
        self.0[square.index()]
    }

    /// Get the value of this PSQT at the provided square, relative to `color`.
    #[inline(always)]
    pub const fn get_relative(&self, square: Square, color: Color) -> i32 {
        self.get(square.rank_relative_to(color))
    }
}

impl fmt::Display for Psqt {
    /// Printing a [`Psqt`] will display it in the same way it is written in the code (White's perspective).
    ///
    /// If the alternate formatter is used (`#`), it will print as if from Black's perspective.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}| ")?;
            for file in File::iter() {
                let color = Color::from_bool(f.alternate());
                let value = self.get_relative(Square::new(file, rank), color);
                write!(f, "{value:3} ")?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "----")?;
        }
        write!(f, "\n    ")?;
        for file in File::iter() {
            write!(f, "{file}   ")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_mirrored_for_black() {
        for square in Square::iter() {
            for kind in PieceKind::all() {
                let white = Psqt::evals(kind, Color::White, square);
                let black = Psqt::evals(kind, Color::Black, square.rank_relative_to(Color::Black));

                assert_eq!(white, black, "{} on {square}", kind.name());
            }
        }
    }

    #[test]
    fn test_tables_read_from_whites_side() {
        // Castled king is rewarded, a king stuck on d1 is not
        assert_eq!(KING_BEG.get(Square::G1), 20);
        assert_eq!(KING_BEG.get(Square::D1), -40);
        assert_eq!(KING_BEG.get_relative(Square::G8, Color::Black), 20);

        // Seventh rank rook
        assert_eq!(ROOK.get(Square::E7), 25);
        assert_eq!(ROOK.get_relative(Square::E2, Color::Black), 25);

        // Blocked central pawns
        assert_eq!(PAWN_BEG.get(Square::D2), -20);
        assert_eq!(PAWN_END.get(Square::A5), 20);
        assert_eq!(PAWN_BEG.get(Square::E7), 80);
        assert_eq!(KNIGHT.get(Square::B1), 0);
    }
}
