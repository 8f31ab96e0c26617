/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::Color;
use uci_parser::UciScore;

/// A numerical representation of the evaluation of a position, in units of ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Scores are absolute: a positive score favors White, a negative score favors Black.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Bound that no evaluation ever reaches; the edges of an unbounded search window.
    pub const INF: Self = Self(i32::MAX / 2);

    /// Score of a checkmate delivered by White.
    pub const MATE: Self = Self(1_000_000);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Returns `true` if the score is a mate score.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::MATE.0
    }

    /// Returns the mate score won by `color`.
    #[inline(always)]
    pub const fn mate_for(color: Color) -> Self {
        match color {
            Color::White => Self::MATE,
            Color::Black => Self(-Self::MATE.0),
        }
    }

    /// Divides `numerator` by `denominator`, rounding halves away from zero.
    ///
    /// `denominator` must be positive.
    #[inline(always)]
    pub const fn from_ratio(numerator: i32, denominator: i32) -> Self {
        let half = denominator / 2;
        if numerator >= 0 {
            Self((numerator + half) / denominator)
        } else {
            Self((numerator - half) / denominator)
        }
    }

    /// Converts this absolute [`Score`] into a [`UciScore`] from `color`'s point of view.
    ///
    /// Used when sending the `info score` message, which is always relative to the engine.
    #[inline(always)]
    pub fn into_uci(self, color: Color) -> UciScore {
        let relative = if color.is_white() { self.0 } else { -self.0 };
        UciScore::cp(relative)
    }

    /// "Normalizes" a score so that it can be printed as a float.
    ///
    /// Presently, this just divides by 100, since a score represents a centipawn value.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: Self) {
                self.0.$fn(rhs.0);
            }
        }

        impl std::ops::$trait<i32> for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: i32) {
                self.0.$fn(rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl PartialEq<i32> for Score {
    fn eq(&self, other: &i32) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<i32> for Score {
    fn partial_cmp(&self, other: &i32) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            let side = if self.0 > 0 { "White" } else { "Black" };
            write!(f, "{} (mate for {side})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_rounds_half_away_from_zero() {
        assert_eq!(Score::from_ratio(15, 10), 2);
        assert_eq!(Score::from_ratio(-15, 10), -2);
        assert_eq!(Score::from_ratio(14, 10), 1);
        assert_eq!(Score::from_ratio(-14, 10), -1);
        assert_eq!(Score::from_ratio(0, 6220), 0);

        // Symmetric around zero
        for n in -5000..5000 {
            assert_eq!(Score::from_ratio(n, 6220), -Score::from_ratio(-n, 6220));
        }
    }

    #[test]
    fn test_mate_scores() {
        assert!(Score::mate_for(Color::White).is_mate());
        assert_eq!(Score::mate_for(Color::Black), -Score::MATE);
        assert!(!Score(999_999).is_mate());
        assert!(Score::INF > Score::MATE);
    }
}
