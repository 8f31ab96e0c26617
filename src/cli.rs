/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;
use uci_parser::UciCommand;

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND> | <UCI COMMAND>")
)]
pub enum EngineCommand {
    /// Run a benchmark with the provided parameters.
    Bench {
        /// If set, the benchmarking results will be printed in a well-formatted table.
        #[arg(short, long, default_value = "false")]
        pretty: bool,

        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<u8>,
    },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, the contribution of every piece and the game phase will be printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Shows all legal moves in the current position.
    Moves,

    /// Display the current value of the specified option.
    Option {
        name: Vec<String>, // This is a vector in order to support multi-word options
    },

    /// Performs a split perft on the current position at the supplied depth.
    Perft { depth: usize },

    /// Wrapper over UCI commands sent to the engine.
    #[command(skip)]
    Uci { cmd: UciCommand },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    ///
    /// If this fails, it will attempt to parse the string as a [`UciCommand`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::try_parse_from(s.split_ascii_whitespace()) {
            Ok(cmd) => Ok(cmd),
            Err(e) => {
                // If parsing failed, attempt to parse as a UciCommand
                if let Ok(cmd) = UciCommand::new(s) {
                    Ok(Self::Uci { cmd })
                } else {
                    Err(e)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_commands() {
        assert!(matches!(
            "bench --depth 3".parse(),
            Ok(EngineCommand::Bench {
                pretty: false,
                depth: Some(3)
            })
        ));
        assert!(matches!("d".parse(), Ok(EngineCommand::Display)));
        assert!(matches!("perft 4".parse(), Ok(EngineCommand::Perft { depth: 4 })));

        let Ok(EngineCommand::Option { name }) = "option Clear Hash".parse() else {
            panic!("failed to parse a multi-word option");
        };
        assert_eq!(name.join(" "), "Clear Hash");
    }

    #[test]
    fn test_uci_commands() {
        assert!(matches!(
            "isready".parse(),
            Ok(EngineCommand::Uci {
                cmd: UciCommand::IsReady
            })
        ));
        assert!(matches!(
            "go movetime 100".parse(),
            Ok(EngineCommand::Uci {
                cmd: UciCommand::Go(_)
            })
        ));
        assert!("definitely not a command".parse::<EngineCommand>().is_err());
    }
}
