/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use uci_parser::{UciInfo, UciResponse};

/// Maximum depth that can be searched
pub const MAX_DEPTH: u8 = 64;

/// How much a search reports about itself while running.
pub trait LogLevel {
    /// Send an `info` line after every completed iteration.
    const INFO: bool;

    /// Send `info string` diagnostics about the search's decisions.
    const DEBUG: bool;
}

/// Print nothing.
pub struct LogNone;

/// Print the standard UCI `info` lines.
pub struct LogInfo;

/// Print UCI `info` lines and diagnostics.
pub struct LogDebug;

impl LogLevel for LogNone {
    const INFO: bool = false;
    const DEBUG: bool = false;
}

impl LogLevel for LogInfo {
    const INFO: bool = true;
    const DEBUG: bool = false;
}

impl LogLevel for LogDebug {
    const INFO: bool = true;
    const DEBUG: bool = true;
}

/// Sends a UCI `info` message.
#[inline(always)]
pub fn send_info(info: UciInfo) {
    let resp = UciResponse::<String>::Info(Box::new(info));
    println!("{resp}");
}

/// Sends a UCI `info string` message.
#[inline(always)]
pub fn send_string<T: fmt::Display>(string: T) {
    send_info(UciInfo::new().string(string.to_string()));
}

/// Positions searched by the `bench` command.
pub const BENCHMARK_FENS: [&str; 8] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    "rn1qk2r/pbpp1ppp/1p2pn2/8/1bPP4/2N2NP1/PPQ1PP1P/R1B1KB1R b KQkq - 2 6",
    "2k2r2/R7/3b4/1R6/n5N1/5PP1/P4PK1/3r4 b - - 2 45",
];
