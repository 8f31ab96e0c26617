/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Duration;

use chessie::Color;
use uci_parser::UciSearchOptions;

use crate::tune;

/// The state of both clocks when a move is requested.
///
/// Absent clocks are assumed to hold the default cadence; absent increments are zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeControl {
    /// White's remaining time.
    pub wtime: Option<Duration>,

    /// Black's remaining time.
    pub btime: Option<Duration>,

    /// White's increment per move.
    pub winc: Option<Duration>,

    /// Black's increment per move.
    pub binc: Option<Duration>,

    /// Exact time to spend on this move, overriding the schedule.
    pub movetime: Option<Duration>,
}

impl TimeControl {
    /// A time control with no clock at all, spending exactly `movetime`.
    pub fn fixed(movetime: Duration) -> Self {
        Self {
            movetime: Some(movetime),
            ..Default::default()
        }
    }

    /// Remaining time of `color`, if known.
    #[inline(always)]
    pub const fn remaining(&self, color: Color) -> Option<Duration> {
        match color {
            Color::White => self.wtime,
            Color::Black => self.btime,
        }
    }

    /// Increment of `color`, if known.
    #[inline(always)]
    pub const fn increment(&self, color: Color) -> Option<Duration> {
        match color {
            Color::White => self.winc,
            Color::Black => self.binc,
        }
    }

    /// How long `color` may think about its move at `ply`, in a game played at `cadence`.
    ///
    /// The base allowance follows a schedule that peaks in the middlegame and is scaled by
    /// the cadence. It shrinks as the clock runs low, and most of the increment is added on top.
    pub fn allowance(&self, color: Color, ply: usize, cadence: Duration) -> Duration {
        if let Some(movetime) = self.movetime {
            return movetime;
        }

        let time_left = self
            .remaining(color)
            .map(|time| time.as_secs_f64())
            .unwrap_or(tune::default_clock_secs!());
        let increment = self
            .increment(color)
            .map(|inc| inc.as_secs_f64())
            .unwrap_or(0.0);

        let mut allowed = base_allowance(ply) * (cadence.as_secs_f64() / tune::default_clock_secs!())
            * tune::allowance_scale!();

        if time_left < tune::low_clock_secs!() {
            allowed = allowed.min(tune::low_clock_cap_secs!());
        }

        if time_left < tune::critical_clock_secs!() {
            allowed = if increment > 0.0 {
                time_left / 10.0
            } else {
                time_left / 5.0
            };
        }

        let allowed = allowed.min(0.5 * time_left) + increment * tune::increment_usage!();

        Duration::try_from_secs_f64(allowed).unwrap_or_default()
    }
}

impl From<&UciSearchOptions> for TimeControl {
    fn from(options: &UciSearchOptions) -> Self {
        Self {
            wtime: options.wtime,
            btime: options.btime,
            winc: options.winc,
            binc: options.binc,
            movetime: options.movetime,
        }
    }
}

/// Seconds to think about a move at `ply`, before any scaling.
#[inline(always)]
pub const fn base_allowance(ply: usize) -> f64 {
    match ply / 20 {
        0 => 4.0,
        1 => 6.0,
        2 => 11.0,
        3 => 14.0,
        4 => 11.0,
        5 => 7.0,
        _ => 4.0,
    }
}

/// The default cadence of a game: the clock time each side started with.
#[inline(always)]
pub fn default_cadence() -> Duration {
    Duration::from_secs_f64(tune::default_clock_secs!())
}
