/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// The position interface the search is written against, and its adapter over `chessie`.
mod board;

/// Bounded LRU memo caches for search results, evaluations, and best moves.
mod cache;

/// Command-line interface for the engine.
mod cli;

/// Time controls and how long to think about a move.
mod clock;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// Move ordering for the main and quiescence searches.
mod movepicker;

/// Chooses moves under a time control.
mod player;

/// Piece-Square tables.
mod psqt;

/// Numerical scores of positions.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Tunable search parameters.
mod tune;

/// Misc utility functions, constants, and types.
mod utils;

pub use board::*;
pub use cache::*;
pub use cli::*;
pub use clock::*;
pub use engine::*;
pub use eval::*;
pub use movepicker::*;
pub use player::*;
pub use psqt::*;
pub use score::*;
pub use search::*;
pub use utils::*;
