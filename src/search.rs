/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    marker::PhantomData,
    time::{Duration, Instant},
};

use chessie::{Color, Move};
use uci_parser::UciInfo;

use crate::{
    evaluate, evaluate_with_moves, order_moves, quiescence_moves, send_info, send_string, tune,
    Board, CacheFlags, CachedSearch, Caches, LogLevel, Score, MAX_DEPTH,
};

/// The result of a single call to [`Search::minimax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Score of the position searched.
    pub score: Score,

    /// Best move found, or `None` at terminal nodes, leaves, and searches cancelled before any move was tried.
    pub bestmove: Option<Move>,

    /// Whether the deadline expired before every move was searched.
    pub cancelled: bool,
}

impl SearchResult {
    #[inline(always)]
    const fn new(score: Score, bestmove: Option<Move>, cancelled: bool) -> Self {
        Self {
            score,
            bestmove,
            cancelled,
        }
    }
}

/// The conclusion of an iterative deepening search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    /// Move chosen by the search, if any iteration produced one.
    pub bestmove: Option<Move>,

    /// Score of `bestmove`, if it came from a search.
    pub score: Option<Score>,

    /// Deepest iteration whose result was accepted.
    pub depth: u8,

    /// Number of nodes searched across every iteration.
    pub nodes: u64,
}

impl SearchReport {
    /// Folds the result of the iteration at `depth` into this report.
    ///
    /// A cancelled iteration never counts as a completed depth, and only replaces the
    /// incumbent move and score if it got far enough to find a move of its own.
    fn record(&mut self, depth: u8, result: SearchResult) {
        if result.cancelled && result.bestmove.is_none() {
            return;
        }

        self.bestmove = result.bestmove;
        self.score = Some(result.score);

        if !result.cancelled {
            self.depth = depth;
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchConfig {
    /// Deepest iteration of iterative deepening.
    pub max_depth: u8,

    /// Plies of quiescence search below the horizon of the main search.
    pub capture_depth: u8,

    /// Whether to cut off moves once the window closes.
    ///
    /// Disabling this never changes the score of a search, only how long it takes.
    pub pruning: bool,

    /// Which caches the search reads and writes.
    pub caches: CacheFlags,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: tune::max_depth!(),
            capture_depth: tune::capture_depth!(),
            pruning: true,
            caches: CacheFlags::default(),
        }
    }
}

/// A window of scores for a search, outside of which results are only bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchBounds {
    /// Score White is already assured of.
    pub alpha: Score,

    /// Score Black is already assured of.
    pub beta: Score,
}

impl SearchBounds {
    /// Creates a new window between `alpha` and `beta`.
    #[inline(always)]
    pub const fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }

    /// An [aspiration window](https://www.chessprogramming.org/Aspiration_Windows) of
    /// `delta` centipawns either side of `score`.
    #[inline(always)]
    pub fn around(score: Score, delta: i32) -> Self {
        Self::new(score - delta, score + delta)
    }

    /// Returns `true` if neither edge of the window has been narrowed.
    #[inline(always)]
    pub fn is_unbounded(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `true` if `score` lies strictly inside the window.
    #[inline(always)]
    pub fn contains(&self, score: Score) -> bool {
        self.alpha < score && score < self.beta
    }
}

impl Default for SearchBounds {
    #[inline(always)]
    fn default() -> Self {
        Self::new(-Score::INF, Score::INF)
    }
}

/// Executes searches on a position, reading and writing a set of [`Caches`].
///
/// `Log` determines how much is printed while iterative deepening runs.
pub struct Search<'a, Log> {
    /// Memo caches shared with every other search on the same game.
    caches: &'a mut Caches,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Number of nodes visited so far, quiescence nodes included.
    nodes: u64,

    /// Marker for the level of logging to perform.
    log: PhantomData<Log>,
}

impl<'a, Log: LogLevel> Search<'a, Log> {
    /// Construct a new [`Search`] instance, backed by `caches`.
    #[inline(always)]
    pub fn new(caches: &'a mut Caches, config: SearchConfig) -> Self {
        Self {
            caches,
            config,
            nodes: 0,
            log: PhantomData,
        }
    }

    /// Number of nodes visited so far.
    #[inline(always)]
    pub const fn nodes(&self) -> u64 {
        self.nodes
    }

    /*****************************************************************************************************
     * Iterative Deepening
     *****************************************************************************************************/

    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening) on `board`
    /// until `max_depth` is reached or `deadline` makes another iteration unlikely to finish.
    ///
    /// Each iteration after the first is searched with an aspiration window around the previous score.
    /// A result that lands on or outside the window is only a bound, so that depth is searched again
    /// with an unbounded window.
    ///
    /// An iteration cut short by the deadline ends the loop. Its move is kept only if it found one,
    /// since the previous best move is always searched first and so has been re-examined.
    ///
    /// The search happens on a private copy of `board`.
    pub fn iterative_deepening<B: Board + Clone>(&mut self, board: &B, deadline: Instant) -> SearchReport {
        let mut board = board.clone();
        let color = board.side_to_move();
        let maximizing = color == Color::White;
        let starttime = Instant::now();

        let mut report = SearchReport {
            bestmove: None,
            score: None,
            depth: 0,
            nodes: 0,
        };

        for depth in 1..=self.config.max_depth.min(MAX_DEPTH) {
            if Instant::now() >= deadline {
                if Log::DEBUG {
                    send_string(format!("Out of time before depth {depth}"));
                }
                break;
            }

            let bounds = match report.score {
                Some(score) => SearchBounds::around(score, tune::aspiration_window_delta!(depth)),
                None => SearchBounds::default(),
            };

            let iteration_start = Instant::now();
            let mut result = self.minimax(&mut board, depth, bounds, maximizing, report.bestmove, Some(deadline));

            // Aspiration miss; re-search with a full window to get an exact score
            if !result.cancelled && !bounds.is_unbounded() && !bounds.contains(result.score) {
                if Log::DEBUG {
                    send_string(format!(
                        "Aspiration miss at depth {depth}: {} outside ({}, {})",
                        result.score, bounds.alpha, bounds.beta
                    ));
                }

                result = self.minimax(
                    &mut board,
                    depth,
                    SearchBounds::default(),
                    maximizing,
                    report.bestmove,
                    Some(deadline),
                );
            }

            report.record(depth, result);

            if result.cancelled {
                if Log::DEBUG {
                    send_string(format!(
                        "Search cancelled during depth {depth}, keeping {} with score {}",
                        fmt_move(report.bestmove),
                        fmt_score(report.score),
                    ));
                }
                break;
            }

            report.nodes = self.nodes;

            let iteration_time = iteration_start.elapsed();
            let remaining = deadline.saturating_duration_since(Instant::now());

            if Log::INFO {
                self.send_search_info(depth, result.score, color, starttime.elapsed());
            }

            if Log::DEBUG {
                send_string(format!(
                    "Depth {depth} done in {}ms, {}ms remaining, best move {} score {}",
                    iteration_time.as_millis(),
                    remaining.as_millis(),
                    fmt_move(report.bestmove),
                    result.score
                ));
            }

            // The next iteration takes longer than this one, so it will probably not finish
            if iteration_time * 2 > remaining {
                if Log::DEBUG {
                    send_string("Not enough time left for the next depth");
                }
                break;
            }
        }

        report.nodes = self.nodes;
        report
    }

    /// Sends the UCI `info` line for a completed iteration.
    fn send_search_info(&self, depth: u8, score: Score, color: Color, elapsed: Duration) {
        let nps = self.nodes as f32 / elapsed.as_secs_f32().max(f32::EPSILON);

        send_info(
            UciInfo::new()
                .depth(depth)
                .nodes(self.nodes)
                .score(score.into_uci(color))
                .nps(nps.trunc())
                .time(elapsed.as_millis()),
        );
    }

    /*****************************************************************************************************
     * Main Search
     *****************************************************************************************************/

    /// Primary location of search logic.
    ///
    /// Uses the [minimax](https://www.chessprogramming.org/Minimax) algorithm with
    /// [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta): White maximizes the absolute
    /// score and Black minimizes it. Scores outside of `bounds` are bounds on the true score, not the score itself.
    ///
    /// `candidate` is searched first if it is legal here.
    /// `deadline` is only checked between moves of this node; deeper nodes always run to completion.
    pub fn minimax<B: Board>(
        &mut self,
        board: &mut B,
        depth: u8,
        mut bounds: SearchBounds,
        maximizing: bool,
        mut candidate: Option<Move>,
        deadline: Option<Instant>,
    ) -> SearchResult {
        self.nodes += 1;
        let initial_bounds = bounds;
        let flags = self.config.caches;
        let key = if flags.any() { board.key() } else { 0 };

        if flags.search {
            if let Some(entry) = self.caches.search.get(&(key, depth)).copied() {
                if let Some(score) = entry.try_score(bounds) {
                    return SearchResult::new(score, entry.bestmove, false);
                }
            }
        }

        if flags.pv && candidate.is_none() {
            candidate = self.caches.pv.get(&key).copied();
        }

        // Reached the horizon; resolve captures before trusting the evaluation
        if depth == 0 {
            let score = self.quiescence(board, self.config.capture_depth, bounds, maximizing);

            if flags.search {
                self.caches
                    .search
                    .insert((key, depth), CachedSearch::new(score, None, initial_bounds));
            }

            return SearchResult::new(score, None, false);
        }

        let moves = order_moves(board, board.legal_moves(), candidate);

        let mut best = if maximizing { -Score::INF } else { Score::INF };
        let mut bestmove = None;
        let mut cancelled = false;

        for &mv in &moves {
            if deadline.is_some_and(|deadline| Instant::now() > deadline) {
                cancelled = true;
                break;
            }

            board.push(mv);
            let score = self.minimax(board, depth - 1, bounds, !maximizing, None, None).score;
            board.pop();

            if maximizing {
                if score > best {
                    best = score;
                    bestmove = Some(mv);
                }
                bounds.alpha = bounds.alpha.max(best);
            } else {
                if score < best {
                    best = score;
                    bestmove = Some(mv);
                }
                bounds.beta = bounds.beta.min(best);
            }

            if self.config.pruning && bounds.beta <= bounds.alpha {
                break;
            }
        }

        // No move was searched: checkmate, stalemate, or out of time before the first move
        if bestmove.is_none() {
            best = self.evaluate(board, Some(moves.as_slice()));
        }

        // Unfinished nodes are never cached
        if !cancelled {
            if flags.search {
                self.caches
                    .search
                    .insert((key, depth), CachedSearch::new(best, bestmove, initial_bounds));
            }

            if flags.pv {
                if let Some(mv) = bestmove {
                    self.caches.pv.insert(key, mv);
                }
            }
        }

        SearchResult::new(best, bestmove, cancelled)
    }

    /*****************************************************************************************************
     * Quiescence Search
     *****************************************************************************************************/

    /// Searches captures and queen promotions (or every evasion, when in check) for up to `depth` plies,
    /// so that positions in the middle of an exchange are not scored at face value.
    ///
    /// The static evaluation (the "stand pat" score) is a floor for the side to move, which may decline
    /// every capture.
    pub fn quiescence<B: Board>(
        &mut self,
        board: &mut B,
        depth: u8,
        mut bounds: SearchBounds,
        maximizing: bool,
    ) -> Score {
        self.nodes += 1;

        if depth == 0 {
            return self.evaluate(board, None);
        }

        let legal = board.legal_moves();
        let stand_pat = self.evaluate(board, Some(legal.as_slice()));

        // A level score may be a draw that ends the game here
        if stand_pat == Score::DRAW && (legal.is_empty() || board.is_draw_by_rule()) {
            return Score::DRAW;
        }

        let moves = quiescence_moves(board, legal);
        if moves.is_empty() {
            return stand_pat;
        }

        if maximizing {
            if stand_pat >= bounds.beta {
                return stand_pat;
            }
            bounds.alpha = bounds.alpha.max(stand_pat);
            let mut best = stand_pat;

            for mv in moves {
                board.push(mv);
                let score = self.quiescence(board, depth - 1, bounds, false);
                board.pop();

                best = best.max(score);
                if best >= bounds.beta {
                    return best;
                }
                bounds.alpha = bounds.alpha.max(best);
            }

            best
        } else {
            if stand_pat <= bounds.alpha {
                return stand_pat;
            }
            bounds.beta = bounds.beta.min(stand_pat);
            let mut best = stand_pat;

            for mv in moves {
                board.push(mv);
                let score = self.quiescence(board, depth - 1, bounds, true);
                board.pop();

                best = best.min(score);
                if best <= bounds.alpha {
                    return best;
                }
                bounds.beta = bounds.beta.min(best);
            }

            best
        }
    }

    /// Static evaluation of `board`, served from the evaluation cache when it is enabled.
    ///
    /// `legal` holds the legal moves of `board`, if they have already been generated.
    fn evaluate<B: Board>(&mut self, board: &B, legal: Option<&[Move]>) -> Score {
        let fresh = |board: &B| match legal {
            Some(legal) => evaluate_with_moves(board, legal),
            None => evaluate(board),
        };

        if !self.config.caches.eval {
            return fresh(board);
        }

        let key = board.key();
        if let Some(&score) = self.caches.eval.get(&key) {
            return score;
        }

        let score = fresh(board);
        self.caches.eval.insert(key, score);
        score
    }
}

/// Formats an optional move for logging.
fn fmt_move(mv: Option<Move>) -> String {
    mv.map(|mv| mv.to_string()).unwrap_or_else(|| String::from("(none)"))
}

/// Formats an optional score for logging.
fn fmt_score(score: Option<Score>) -> String {
    score.map(|score| score.to_string()).unwrap_or_else(|| String::from("N/A"))
}
