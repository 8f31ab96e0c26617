/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::Result;
use chessie::{pawn_attacks, Color, Game, Move, Piece, PieceKind, Square};

/// Everything the search and evaluation need from a chess position.
///
/// Positions are searched destructively: [`Board::push`] advances the position by a move
/// and [`Board::pop`] restores it. Calls must nest like a stack.
pub trait Board {
    /// All legal moves in the current position.
    fn legal_moves(&self) -> Vec<Move>;

    /// Plays `mv`, which must be legal.
    fn push(&mut self, mv: Move);

    /// Takes back the most recently pushed move, returning it.
    ///
    /// # Panics
    ///
    /// If no move has been pushed.
    fn pop(&mut self) -> Move;

    /// Zobrist hash of the current position.
    fn key(&self) -> u64;

    /// The side whose turn it is.
    fn side_to_move(&self) -> Color;

    /// The piece on `square`, if any.
    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Every occupied square alongside its piece.
    fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_;

    /// Returns `true` if the side to move is in check.
    fn is_in_check(&self) -> bool;

    /// Returns `true` if a pawn of color `by` attacks `square`.
    fn is_attacked_by_pawn(&self, square: Square, by: Color) -> bool;

    /// Returns `true` if neither side can possibly deliver mate.
    fn is_insufficient_material(&self) -> bool;

    /// Returns `true` if the fifty-move rule applies.
    fn is_fifty_moves(&self) -> bool;

    /// Returns `true` if the current position has occurred at least three times.
    fn is_repetition(&self) -> bool;

    /// Number of half moves played since the start of the game.
    fn ply(&self) -> usize;

    /// Returns `true` if the side to move is checkmated.
    #[inline(always)]
    fn is_checkmate(&self) -> bool {
        self.is_in_check() && self.legal_moves().is_empty()
    }

    /// Returns `true` if the side to move has no legal moves but is not in check.
    #[inline(always)]
    fn is_stalemate(&self) -> bool {
        !self.is_in_check() && self.legal_moves().is_empty()
    }

    /// Returns `true` if the position is drawn by insufficient material, the fifty-move rule or repetition.
    ///
    /// Unlike [`Board::is_draw`], this never generates moves.
    #[inline(always)]
    fn is_draw_by_rule(&self) -> bool {
        self.is_insufficient_material() || self.is_fifty_moves() || self.is_repetition()
    }

    /// Returns `true` if the game is drawn in the current position.
    #[inline(always)]
    fn is_draw(&self) -> bool {
        self.is_stalemate() || self.is_draw_by_rule()
    }
}

/// A [`Game`] with enough history to take moves back and detect repetitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameBoard {
    /// Current position.
    game: Game,

    /// Positions before each pushed move, alongside that move.
    undo: Vec<(Game, Move)>,

    /// Hash of every position reached since the game was set up, current one last.
    keys: Vec<u64>,
}

impl GameBoard {
    /// Wraps `game`, treating it as the start of the game's history.
    pub fn new(game: Game) -> Self {
        Self {
            keys: vec![game.key().inner()],
            undo: Vec::with_capacity(64),
            game,
        }
    }

    /// Parses a FEN string into a new [`GameBoard`].
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::new(Game::from_fen(fen)?))
    }

    /// The underlying position.
    #[inline(always)]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Plays `mv` permanently: it becomes part of the game's history and cannot be popped.
    pub fn play(&mut self, mv: Move) {
        self.game = self.game.with_move_made(mv);
        self.keys.push(self.key());
    }

    /// Parses `uci` as a move in the current position and plays it permanently.
    pub fn play_uci(&mut self, uci: &str) -> Result<Move> {
        let mv = Move::from_uci(&self.game, uci)?;
        self.play(mv);
        Ok(mv)
    }

    /// Generates a FEN string for the current position.
    pub fn to_fen(&self) -> String {
        self.game.to_fen()
    }
}

impl Default for GameBoard {
    fn default() -> Self {
        Self::new(Game::default())
    }
}

impl fmt::Display for GameBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.game)
    }
}

impl Board for GameBoard {
    #[inline(always)]
    fn legal_moves(&self) -> Vec<Move> {
        self.game.get_legal_moves().into_iter().collect()
    }

    fn push(&mut self, mv: Move) {
        self.undo.push((self.game, mv));
        self.play(mv);
    }

    fn pop(&mut self) -> Move {
        let Some((game, mv)) = self.undo.pop() else {
            panic!("attempted to pop a move from {} but none were pushed", self.to_fen());
        };
        self.game = game;
        self.keys.pop();
        mv
    }

    #[inline(always)]
    fn key(&self) -> u64 {
        self.game.key().inner()
    }

    #[inline(always)]
    fn side_to_move(&self) -> Color {
        self.game.side_to_move()
    }

    #[inline(always)]
    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.game.piece_at(square)
    }

    fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| Some((square, self.game.piece_at(square)?)))
    }

    #[inline(always)]
    fn is_in_check(&self) -> bool {
        self.game.is_in_check()
    }

    fn is_attacked_by_pawn(&self, square: Square, by: Color) -> bool {
        // A pawn of `by` attacks `square` iff a pawn of the other color on `square` would attack it
        let attackers = pawn_attacks(square, by.opponent())
            & self.game.kind(PieceKind::Pawn)
            & self.game.color(by);
        attackers.is_nonempty()
    }

    #[inline(always)]
    fn is_insufficient_material(&self) -> bool {
        self.game.can_draw_by_insufficient_material()
    }

    #[inline(always)]
    fn is_fifty_moves(&self) -> bool {
        self.game.can_draw_by_fifty()
    }

    fn is_repetition(&self) -> bool {
        let current = self.key();

        // Positions before the last capture or pawn move can never recur
        let reversible = self.game.halfmove().min(self.keys.len() - 1);
        let earlier = self
            .keys
            .iter()
            .rev()
            .skip(1)
            .take(reversible)
            .filter(|&&key| key == current)
            .count();

        earlier >= 2
    }

    #[inline(always)]
    fn ply(&self) -> usize {
        let black = usize::from(self.side_to_move() == Color::Black);
        self.game.fullmove().saturating_sub(1) * 2 + black
    }
}
