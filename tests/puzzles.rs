/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use bullfrog::{Board, CacheFlags, Caches, GameBoard, LogNone, Score, Search, SearchBounds, SearchConfig};

/// Best move found by a single full-window search of `fen`.
fn best_move(fen: &str, depth: u8, pruning: bool, capture_depth: u8) -> (String, Score) {
    let mut board = GameBoard::from_fen(fen).unwrap();
    let maximizing = board.side_to_move().is_white();
    let config = SearchConfig {
        max_depth: depth,
        capture_depth,
        pruning,
        caches: CacheFlags::NONE,
    };

    let mut caches = Caches::new(0, 0, 0);
    let res = Search::<LogNone>::new(&mut caches, config).minimax(
        &mut board,
        depth,
        SearchBounds::default(),
        maximizing,
        None,
        None,
    );

    let bestmove = res.bestmove.map(|mv| mv.to_string()).unwrap_or_default();
    (bestmove, res.score)
}

fn test_puzzle(fen: &str, expected: &str, depth: u8, pruning: bool, capture_depth: u8) {
    let (mv, score) = best_move(fen, depth, pruning, capture_depth);
    assert_eq!(mv, expected, "{fen} at depth {depth} (score {score})");
}

#[test]
fn test_recapture_the_queen() {
    // The e8 rook is pinned, but may still take the pinning queen
    test_puzzle("1k2rQ2/1p2P3/1Ppq3p/p7/P7/6P1/5P2/5RK1 b - - 2 50", "e8f8", 2, true, 0);
}

#[test]
fn test_rook_takes_with_check() {
    // Rxf5+ forks king and queen; after Qxf5 Nxf5 Black is a queen for a rook up
    let fen = "8/1p3p2/1Pkn1Q2/2r2P1P/8/5K2/8/8 b - - 0 63";
    test_puzzle(fen, "c5f5", 2, true, 2);
    test_puzzle(fen, "c5f5", 2, false, 2);
    test_puzzle(fen, "c5f5", 2, true, 1);
}

#[test]
fn test_queen_check_forks_the_knight() {
    // Qd4+ attacks the king on g1 and the knight on e5 at once
    test_puzzle("r2qkb1r/pp3ppp/2n1bn2/1Bp1N3/4P3/2N5/PPPP2PP/R1BQ1RK1 b kq - 0 8", "d8d4", 4, true, 0);
}

#[test]
fn test_king_takes_rook() {
    let fen = "8/8/3R4/1pk5/8/P2p3K/1P5P/8 b - - 2 50";
    test_puzzle(fen, "c5d6", 1, true, 0);
    test_puzzle(fen, "c5d6", 2, true, 2);
}

#[test]
fn test_back_rank_mates() {
    let (mv, score) = best_move("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 2, true, 0);
    assert_eq!(mv, "a1a8");
    assert_eq!(score, Score::MATE);

    let (mv, score) = best_move("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1", 2, false, 0);
    assert_eq!(mv, "a8a1");
    assert_eq!(score, -Score::MATE);
}

#[test]
fn test_promote_with_capture() {
    test_puzzle("3q1n2/4P3/8/8/8/8/k7/7K w - - 0 1", "e7d8q", 1, true, 4);
}

#[test]
fn test_stalemate_has_no_move() {
    let board = GameBoard::from_fen("k7/8/KQ6/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(board.legal_moves().is_empty());

    let (mv, score) = best_move("k7/8/KQ6/8/8/8/8/8 b - - 0 1", 3, true, 2);
    assert!(mv.is_empty());
    assert_eq!(score, Score::DRAW);
}
