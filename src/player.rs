/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::{Duration, Instant};

use chessie::Move;
use rand::Rng;

use crate::{
    default_cadence, send_string, Board, Caches, LogLevel, LogNone, Score, Search, SearchConfig,
    SearchReport, TimeControl,
};

/// A computer player: chooses moves under a time control, remembering what it learned across moves.
///
/// The caches and the game's cadence persist between calls to [`Player::choose_move`]
/// until [`Player::clear`] is called.
#[derive(Debug, Clone)]
pub struct Player {
    /// Memo caches shared by every search this player runs.
    caches: Caches,

    /// Configuration for every search.
    config: SearchConfig,

    /// The clock time each side started the game with.
    cadence: Duration,
}

impl Player {
    /// Creates a player with empty caches of the default capacities.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_caches(config, Caches::default())
    }

    /// Creates a player that searches with the supplied `caches`.
    pub fn with_caches(config: SearchConfig, caches: Caches) -> Self {
        Self {
            caches,
            config,
            cadence: default_cadence(),
        }
    }

    /// The configuration used for searches.
    #[inline(always)]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Mutable access to the configuration used for searches.
    #[inline(always)]
    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    /// The caches shared by this player's searches.
    #[inline(always)]
    pub const fn caches(&self) -> &Caches {
        &self.caches
    }

    /// The cadence of the game currently being played.
    #[inline(always)]
    pub const fn cadence(&self) -> Duration {
        self.cadence
    }

    /// Forgets everything learned so far, ready for a new game.
    pub fn clear(&mut self) {
        self.clear_caches();
        self.cadence = default_cadence();
    }

    /// Empties every cache, keeping the game's cadence.
    #[inline(always)]
    pub fn clear_caches(&mut self) {
        self.caches.clear();
    }

    /// Chooses a legal move to play on `board`, thinking for as long as `time` allows.
    ///
    /// # Panics
    ///
    /// If `board` has no legal moves.
    pub fn choose_move<B: Board + Clone>(&mut self, board: &B, time: &TimeControl) -> Move {
        self.play::<LogNone, B>(board, time).bestmove
    }

    /// Like [`Player::choose_move`], but logs its progress and reports how the move was found.
    ///
    /// The report's `score` is `None` if the move was chosen at random because no search finished in time.
    ///
    /// # Panics
    ///
    /// If `board` has no legal moves.
    pub fn play<Log: LogLevel, B: Board + Clone>(&mut self, board: &B, time: &TimeControl) -> PlayReport {
        let moves = board.legal_moves();
        if moves.is_empty() {
            panic!("cannot choose a move in a position without legal moves");
        }

        let starttime = Instant::now();
        let ply = board.ply();
        let color = board.side_to_move();

        // The opening moves tell us how much time the game started with
        if (2..=4).contains(&ply) {
            if let Some(btime) = time.btime {
                self.cadence = btime;
            }
        }

        let allowance = time.allowance(color, ply, self.cadence);
        let deadline = starttime + allowance;

        if Log::DEBUG {
            send_string(format!(
                "Thinking for {}ms at ply {ply} (cadence {}s)",
                allowance.as_millis(),
                self.cadence.as_secs()
            ));
        }

        let SearchReport {
            bestmove,
            score,
            depth,
            nodes,
        } = Search::<Log>::new(&mut self.caches, self.config).iterative_deepening(board, deadline);

        let bestmove = match bestmove {
            Some(mv) => mv,
            None => {
                let mv = moves[rand::thread_rng().gen_range(0..moves.len())];
                if Log::DEBUG {
                    send_string(format!("No search finished in time; playing random move {mv}"));
                }
                mv
            }
        };

        if Log::DEBUG {
            self.send_cache_stats();
        }

        PlayReport {
            bestmove,
            score,
            depth,
            nodes,
            elapsed: starttime.elapsed(),
        }
    }

    /// Sends the statistics of every enabled cache.
    fn send_cache_stats(&self) {
        let flags = self.config.caches;

        if flags.search {
            send_string(format!("search cache: {}", self.caches.search));
        }
        if flags.eval {
            send_string(format!("eval cache: {}", self.caches.eval));
        }
        if flags.pv {
            send_string(format!("pv cache: {}", self.caches.pv));
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

/// How a [`Player`] arrived at its move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayReport {
    /// The move chosen.
    pub bestmove: Move,

    /// Score of the deepest completed search, if the move came from one.
    pub score: Option<Score>,

    /// Deepest iteration completed.
    pub depth: u8,

    /// Nodes searched.
    pub nodes: u64,

    /// Time spent choosing the move.
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CacheFlags, GameBoard};

    fn small_player() -> Player {
        let config = SearchConfig {
            max_depth: 2,
            capture_depth: 2,
            ..Default::default()
        };
        Player::with_caches(config, Caches::new(1 << 12, 1 << 12, 1 << 12))
    }

    #[test]
    fn test_zero_time_plays_random_legal_move() {
        let board = GameBoard::default();
        let mut player = small_player();
        let time = TimeControl::fixed(Duration::ZERO);

        let report = player.play::<LogNone, _>(&board, &time);
        assert!(board.legal_moves().contains(&report.bestmove));
        assert_eq!(report.score, None);
        assert_eq!(report.depth, 0);
    }

    #[test]
    #[should_panic]
    fn test_no_legal_moves_panics() {
        let board = GameBoard::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        small_player().choose_move(&board, &TimeControl::default());
    }

    #[test]
    fn test_finds_mate_in_one() {
        let board = GameBoard::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mut player = small_player();

        let report = player.play::<LogNone, _>(&board, &TimeControl::fixed(Duration::from_secs(30)));
        assert_eq!(report.bestmove.to_string(), "a1a8");
        assert_eq!(report.score, Some(Score::MATE));
        assert_eq!(report.depth, 2);
    }

    #[test]
    fn test_cadence_follows_blacks_opening_clock() {
        let mut board = GameBoard::default();
        board.play_uci("e2e4").unwrap();
        board.play_uci("e7e5").unwrap();

        let mut player = small_player();
        let time = TimeControl {
            wtime: Some(Duration::from_secs(300)),
            btime: Some(Duration::from_secs(300)),
            ..Default::default()
        };
        let _ = player.play::<LogNone, _>(&board, &time);
        assert_eq!(player.cadence(), Duration::from_secs(300));

        player.clear();
        assert_eq!(player.cadence(), default_cadence());
        assert!(player.caches().pv.is_empty());
    }

    #[test]
    fn test_cadence_ignored_after_opening() {
        let board = GameBoard::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 10").unwrap();
        let mut player = small_player();
        let time = TimeControl {
            btime: Some(Duration::from_secs(60)),
            movetime: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let _ = player.choose_move(&board, &time);
        assert_eq!(player.cadence(), default_cadence());
    }

    #[test]
    fn test_moves_are_legal_with_every_cache() {
        let board = GameBoard::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();

        for caches in [CacheFlags::NONE, CacheFlags::default(), CacheFlags::ALL] {
            let mut player = small_player();
            player.config_mut().caches = caches;

            let mv = player.choose_move(&board, &TimeControl::fixed(Duration::from_secs(30)));
            assert!(board.legal_moves().contains(&mv));
        }
    }
}
