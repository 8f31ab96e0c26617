/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Deepest iteration of iterative deepening, unless overridden.
macro_rules! max_depth {
    () => {
        10
    };
}
pub(crate) use max_depth;

/// Plies of quiescence search at the horizon of the main search.
macro_rules! capture_depth {
    () => {
        4
    };
}
pub(crate) use capture_depth;

/// Maximum entries in the search-result cache.
macro_rules! search_cache_capacity {
    () => {
        10_000_000
    };
}
pub(crate) use search_cache_capacity;

/// Maximum entries in the evaluation cache.
macro_rules! eval_cache_capacity {
    () => {
        100_000_000
    };
}
pub(crate) use eval_cache_capacity;

/// Maximum entries in the principal-variation cache.
macro_rules! pv_cache_capacity {
    () => {
        10_000_000
    };
}
pub(crate) use pv_cache_capacity;

/// Half-width, in centipawns, of the aspiration window searched at `depth`.
macro_rules! aspiration_window_delta {
    ($depth:expr) => {
        match $depth {
            1 => 400,
            2 => 300,
            3 => 200,
            4 => 80,
            5 => 60,
            _ => 40,
        }
    };
}
pub(crate) use aspiration_window_delta;

/// Ordering bonus of a promotion to a queen during quiescence search.
macro_rules! queen_promotion_priority {
    () => {
        400
    };
}
pub(crate) use queen_promotion_priority;

/// Smallest victim value worth capturing during quiescence search.
macro_rules! min_quiescence_victim {
    () => {
        300
    };
}
pub(crate) use min_quiescence_victim;

/// Largest material loss (victim minus attacker) still considered during quiescence search.
macro_rules! max_quiescence_loss {
    () => {
        20
    };
}
pub(crate) use max_quiescence_loss;

/// Seconds on the clock assumed when none were given, and the initial game cadence.
macro_rules! default_clock_secs {
    () => {
        180.0
    };
}
pub(crate) use default_clock_secs;

/// Fraction of the scaled base allowance that is actually used.
macro_rules! allowance_scale {
    () => {
        0.9
    };
}
pub(crate) use allowance_scale;

/// Below this many seconds on the clock, thinking time is capped.
macro_rules! low_clock_secs {
    () => {
        30.0
    };
}
pub(crate) use low_clock_secs;

/// Thinking time cap when the clock is low.
macro_rules! low_clock_cap_secs {
    () => {
        5.0
    };
}
pub(crate) use low_clock_cap_secs;

/// Below this many seconds on the clock, thinking time becomes a fraction of what remains.
macro_rules! critical_clock_secs {
    () => {
        10.0
    };
}
pub(crate) use critical_clock_secs;

/// Fraction of the increment added to every allowance.
macro_rules! increment_usage {
    () => {
        0.8
    };
}
pub(crate) use increment_usage;
