/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cmp::Reverse;

use chessie::{Move, PieceKind};

use crate::{tune, value_of, Board};

/// Heuristic priority of `mv` for the main search. Higher is searched earlier.
///
/// Captures are ranked most-valuable-victim first, then least-valuable-attacker.
/// Promotions earn the value of the promoted piece.
/// Moving a piece (other than a pawn or king) onto a square guarded by an enemy pawn costs that piece's value.
pub fn move_priority<B: Board>(board: &B, mv: Move) -> i32 {
    let mover = board
        .piece_at(mv.from())
        .map(|piece| piece.kind())
        .unwrap_or(PieceKind::Pawn);

    let mut priority = 0;

    if mv.is_capture() {
        // En passant leaves the destination empty; the victim is a pawn
        let victim = board
            .piece_at(mv.to())
            .map(|piece| piece.kind())
            .unwrap_or(PieceKind::Pawn);

        priority += 10 * value_of(victim) - value_of(mover);
    }

    if let Some(promotion) = mv.promotion() {
        priority += value_of(promotion);
    }

    if !matches!(mover, PieceKind::Pawn | PieceKind::King)
        && board.is_attacked_by_pawn(mv.to(), board.side_to_move().opponent())
    {
        priority -= value_of(mover);
    }

    priority
}

/// Orders `moves` for the main search.
///
/// `candidate`, if it is among `moves`, comes first. The remaining moves follow in
/// descending [`move_priority`], keeping their generation order among equal priorities.
pub fn order_moves<B: Board>(board: &B, mut moves: Vec<Move>, candidate: Option<Move>) -> Vec<Move> {
    let first = candidate.and_then(|candidate| {
        let idx = moves.iter().position(|&mv| mv == candidate)?;
        Some(moves.remove(idx))
    });

    // `sort_by_cached_key` is stable
    moves.sort_by_cached_key(|&mv| Reverse(move_priority(board, mv)));

    if let Some(first) = first {
        moves.insert(0, first);
    }

    moves
}

/// Priority of `mv` during quiescence search, or `None` if it is too quiet to be searched there.
///
/// Only queen promotions and captures of a valuable piece that do not lose much material qualify.
pub fn quiescence_priority<B: Board>(board: &B, mv: Move) -> Option<i32> {
    if mv.promotion() == Some(PieceKind::Queen) {
        return Some(tune::queen_promotion_priority!());
    }

    if !mv.is_capture() {
        return None;
    }

    // En passant is never considered, as its victim is not on the destination square
    let victim = value_of(board.piece_at(mv.to())?.kind());
    let mover = value_of(board.piece_at(mv.from())?.kind());
    let delta = victim - mover;

    (victim >= tune::min_quiescence_victim!() && delta >= -tune::max_quiescence_loss!())
        .then_some(delta)
}

/// Moves to consider during quiescence search, best first.
///
/// Out of check, this is the moves with a [`quiescence_priority`], sorted by it.
/// In check every evasion must be considered, so all legal moves are returned in [`order_moves`] order.
///
/// `moves` must be the legal moves of `board`.
pub fn quiescence_moves<B: Board>(board: &B, moves: Vec<Move>) -> Vec<Move> {
    if board.is_in_check() {
        return order_moves(board, moves, None);
    }

    let mut scored = moves
        .into_iter()
        .filter_map(|mv| Some((mv, quiescence_priority(board, mv)?)))
        .collect::<Vec<_>>();

    scored.sort_by_key(|&(_, priority)| Reverse(priority));

    scored.into_iter().map(|(mv, _)| mv).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameBoard;

    fn board(fen: &str) -> GameBoard {
        GameBoard::from_fen(fen).unwrap()
    }

    fn uci(board: &GameBoard, mv: &str) -> Move {
        Move::from_uci(board.game(), mv).unwrap()
    }

    #[test]
    fn test_candidate_comes_first() {
        let board = GameBoard::default();
        let moves = board.legal_moves();
        let candidate = uci(&board, "g1f3");

        let ordered = order_moves(&board, moves.clone(), Some(candidate));
        assert_eq!(ordered[0], candidate);
        assert_eq!(ordered.len(), moves.len());
        assert!(moves.iter().all(|mv| ordered.contains(mv)));
    }

    #[test]
    fn test_unknown_candidate_is_ignored() {
        let board = GameBoard::default();
        let moves = board.legal_moves();

        // A move from another position entirely
        let other = GameBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let foreign = uci(&other, "a1a8");

        let ordered = order_moves(&board, moves.clone(), Some(foreign));
        assert_eq!(ordered, moves);
    }

    #[test]
    fn test_ties_keep_generation_order() {
        // Nothing is attacked or capturable from the start position, so every priority is zero
        let board = GameBoard::default();
        let moves = board.legal_moves();

        assert!(moves.iter().all(|&mv| move_priority(&board, mv) == 0));
        assert_eq!(order_moves(&board, moves.clone(), None), moves);
    }

    #[test]
    fn test_captures_come_first() {
        let board = board("4k3/8/8/3q4/8/2N5/8/4K3 w - - 0 1");
        let ordered = order_moves(&board, board.legal_moves(), None);

        let capture = uci(&board, "c3d5");
        assert_eq!(ordered[0], capture);
        assert_eq!(move_priority(&board, capture), 10 * 900 - 300);
    }

    #[test]
    fn test_pawn_guarded_squares_come_last() {
        // The c6 pawn guards b5 and d5
        let board = board("4k3/8/2p5/8/8/2N5/8/4K3 w - - 0 1");
        let ordered = order_moves(&board, board.legal_moves(), None);

        let last_two = &ordered[ordered.len() - 2..];
        assert!(last_two.contains(&uci(&board, "c3b5")));
        assert!(last_two.contains(&uci(&board, "c3d5")));
        assert_eq!(move_priority(&board, uci(&board, "c3d5")), -300);

        // Pawns are never penalized
        let pawns = GameBoard::from_fen("4k3/8/8/2p5/8/8/3P4/4K3 w - - 0 1").unwrap();
        assert_eq!(move_priority(&pawns, uci(&pawns, "d2d4")), 0);
    }

    #[test]
    fn test_promotion_priority() {
        let board = board("8/4P3/8/8/8/k7/8/7K w - - 0 1");
        assert_eq!(move_priority(&board, uci(&board, "e7e8q")), 900);
        assert_eq!(move_priority(&board, uci(&board, "e7e8n")), 300);

        let ordered = order_moves(&board, board.legal_moves(), None);
        assert_eq!(ordered[0], uci(&board, "e7e8q"));
    }

    #[test]
    fn test_en_passant_victim_is_a_pawn() {
        let board = board("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let ep = uci(&board, "e5d6");
        assert_eq!(move_priority(&board, ep), 10 * 100 - 100);

        // But it is never a quiescence move
        assert_eq!(quiescence_priority(&board, ep), None);
    }

    fn loud(board: &GameBoard) -> Vec<Move> {
        quiescence_moves(board, board.legal_moves())
    }

    #[test]
    fn test_quiescence_moves_empty_when_quiet() {
        assert!(loud(&GameBoard::default()).is_empty());

        // Pawn takes pawn is not worth a quiescence search
        let board = board("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        assert!(loud(&board).is_empty());
    }

    #[test]
    fn test_quiescence_moves_filter_and_order() {
        // Knight takes queen or knight; rook takes knight gives up too much
        let board = board("4k3/8/8/3q4/4n3/2N5/8/4RK2 w - - 0 1");
        let moves = loud(&board);

        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0], uci(&board, "c3d5"));
        assert_eq!(moves[1], uci(&board, "c3e4"));

        // Only the queen promotion is loud enough
        let promotion = GameBoard::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let moves = loud(&promotion);
        assert_eq!(moves, vec![uci(&promotion, "a7a8q")]);
    }

    #[test]
    fn test_quiescence_moves_in_check_are_all_evasions() {
        let board = board("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1");
        let moves = loud(&board);

        assert_eq!(moves.len(), board.legal_moves().len());
        assert_eq!(moves[0], uci(&board, "e1e2"));
    }
}
