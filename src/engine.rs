/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io::{self, Write},
    str::FromStr,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use chessie::print_perft;
use clap::Parser;
use uci_parser::{UciCommand, UciOption, UciParseError, UciResponse, UciSearchOptions};

use crate::{
    send_string, tune, Board, EngineCommand, Evaluator, GameBoard, LogDebug, LogInfo, LogNone,
    Player, SearchConfig, TimeControl, BENCHMARK_FENS, MAX_DEPTH,
};

/// Default depth at which to run the benchmark searches.
const BENCH_DEPTH: u8 = 4;

/// Time given to searches that are only bounded by depth.
const UNTIMED: Duration = Duration::from_secs(60 * 60 * 24);

/// Largest quiescence depth that can be set through `setoption`.
const MAX_CAPTURE_DEPTH: u8 = 16;

/// The Bullfrog chess engine.
#[derive(Debug)]
pub struct Engine {
    /// The current state of the chess board, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    board: GameBoard,

    /// Chooses the engine's moves, keeping its caches between them.
    player: Player,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Whether to display extra information during execution.
    debug: bool,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            board: GameBoard::default(),
            player: Player::default(),
            sender,
            receiver,
            debug: false,
        }
    }

    /// Returns a string of the engine's name and current version.
    #[inline(always)]
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Returns a string of all authors of this engine.
    #[inline(always)]
    pub fn authors(&self) -> String {
        // Split multiple authors by comma-space
        env!("CARGO_PKG_AUTHORS").replace(':', ", ").to_string()
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.sender
            .send(command)
            .context("Failed to send a command to the engine")
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and executes received commands in order.
    /// Searches run on this thread, so commands sent during a search wait until it concludes.
    pub fn run(&mut self) -> Result<()> {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                eprintln!("Input handler thread stopping after fatal error: {err:#}");
            }
        });

        while let Ok(cmd) = self.receiver.recv() {
            match cmd {
                EngineCommand::Bench { depth, pretty } => self.bench(depth, pretty)?,

                EngineCommand::Display => println!("{}", self.board),

                EngineCommand::Eval { pretty } => self.eval(pretty),

                EngineCommand::Exit => break,

                EngineCommand::Fen => println!("{}", self.board.to_fen()),

                EngineCommand::Moves => {
                    let moves = self.board.legal_moves();

                    let moves_string = if moves.is_empty() {
                        String::from("(none)")
                    } else {
                        moves
                            .into_iter()
                            .map(|mv| mv.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    };
                    println!("{moves_string}");
                }

                EngineCommand::Option { name } => {
                    let name = name.join(" ");
                    if let Some(value) = self.get_option(&name) {
                        println!("{name} := {value}");
                    } else {
                        println!("{} has no option {name:?}", self.name());
                    }
                }

                EngineCommand::Perft { depth } => {
                    print_perft::<false, true>(self.board.game(), depth);
                }

                EngineCommand::Uci { cmd } => {
                    // Keep running, even on error
                    if let Err(e) = self.handle_uci_command(cmd) {
                        eprintln!("Error: {e:#}");
                    }
                }
            }
        }

        Ok(())
    }

    /// Handle the execution of a single [`UciCommand`].
    fn handle_uci_command(&mut self, uci: UciCommand) -> Result<()> {
        use UciCommand::*;
        match uci {
            Uci => self.uci(),

            Debug(status) => self.debug = status,

            IsReady => println!("{}", UciResponse::<&str>::ReadyOk),

            SetOption { name, value } => self.set_option(&name, value)?,

            Register { name: _, code: _ } => println!("{} requires no registration", self.name()),

            UciNewGame => self.new_game(),

            Position { fen, moves } => self.position(fen, moves)?,

            Go(options) => self.go(&options),

            // Searches conclude before the next command is read
            Stop => {}

            Quit => self.send_command(EngineCommand::Exit)?,

            _ => bail!("{} does not support UCI command {uci:?}", self.name()),
        }

        Ok(())
    }

    /// Executes the `go` command, searching the current position and printing the move chosen.
    fn go(&mut self, options: &UciSearchOptions) {
        if let Some(depth) = options.perft {
            print_perft::<false, true>(self.board.game(), depth as usize);
            return;
        }

        // Nothing to search; tell the GUI instead of panicking
        if self.board.legal_moves().is_empty() {
            println!("{}", UciResponse::<String>::BestMove { bestmove: None, ponder: None });
            return;
        }

        let mut time = TimeControl::from(options);
        let max_depth = self.player.config().max_depth;

        if let Some(depth) = options.depth {
            self.player.config_mut().max_depth = (depth as usize).clamp(1, MAX_DEPTH as usize) as u8;

            // A depth without a clock is searched to completion
            if time == TimeControl::default() {
                time = TimeControl::fixed(UNTIMED);
            }
        }

        let report = if self.debug {
            self.player.play::<LogDebug, _>(&self.board, &time)
        } else {
            self.player.play::<LogInfo, _>(&self.board, &time)
        };

        self.player.config_mut().max_depth = max_depth;

        let resp = UciResponse::BestMove {
            bestmove: Some(report.bestmove.to_string()),
            ponder: None,
        };
        println!("{resp}");
    }

    /// Execute the `bench` command, running a benchmark of a fixed search on a series of positions and displaying the results.
    fn bench(&mut self, depth: Option<u8>, pretty: bool) -> Result<()> {
        // Set up the benchmarking config
        let config = SearchConfig {
            max_depth: depth.unwrap_or(BENCH_DEPTH).min(MAX_DEPTH),
            ..*self.player.config()
        };

        let benches = BENCHMARK_FENS;
        let mut nodes = 0;

        // Padding for printing FENs
        let width = benches.iter().map(|fen| fen.len()).max().unwrap_or_default();

        println!(
            "Running fixed-depth search (d={}) on {} positions",
            config.max_depth,
            benches.len()
        );

        let starttime = Instant::now();

        // Run a fixed search on each position
        for (i, fen) in benches.into_iter().enumerate() {
            print!("{:>2}/{:>2}: {fen:<width$} := ", i + 1, benches.len());
            // Flush stdout so the node count will appear on the same line after the search concludes
            io::stdout().lock().flush()?;

            // Each bench is essentially a new game, so it gets fresh caches
            let board = GameBoard::from_fen(fen)?;
            let report =
                Player::new(config).play::<LogNone, _>(&board, &TimeControl::fixed(UNTIMED));

            nodes += report.nodes;
            println!("{}", report.nodes);
        }

        // Compute results
        let elapsed = starttime.elapsed();
        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        let m_nps = nodes as f32 / elapsed.as_secs_f32() / 1_000_000.0;
        let ms = elapsed.as_millis();

        if pretty {
            // Display the results in a nice table
            println!();
            println!("+-- Benchmark Complete --+");
            println!("| time (ms)  {ms:<12}|");
            println!("|     nodes  {nodes:<12}|");
            println!("|       nps  {nps:<12}|");
            println!("|      Mnps  {m_nps:<12.2}|");
            println!("+------------------------+");
        } else {
            println!("{nodes} nodes / {elapsed:?} := {nps} nps");
        }

        Ok(())
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::new(&self.board);
        if pretty {
            println!("{evaluator}");
        } else {
            println!("{}", evaluator.eval());
        }
    }

    /// Set the position to the supplied FEN string (defaults to the standard startpos if not supplied),
    /// and then apply `moves` one-by-one to the position.
    fn position<T: AsRef<str>>(
        &mut self,
        fen: Option<T>,
        moves: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        // Build the new position aside, so a bad move leaves the old one intact
        let mut board = if let Some(fen) = fen {
            GameBoard::from_fen(fen.as_ref())?
        } else {
            GameBoard::default()
        };

        for mv_str in moves {
            board
                .play_uci(mv_str.as_ref())
                .with_context(|| format!("Failed to apply move {:?}", mv_str.as_ref()))?;
        }

        self.board = board;
        Ok(())
    }

    /// Resets the engine's internal game state, clearing every cache.
    fn new_game(&mut self) {
        self.board = GameBoard::default();
        self.player.clear();
    }

    /// Called when the engine receives the `uci` command.
    ///
    /// Prints engine's ID, version, and authors, and lists all UCI options.
    fn uci(&self) {
        println!("id name {}\nid author {}\n", self.name(), self.authors());

        // Print all UCI options
        for opt in self.options() {
            println!("{}", UciResponse::Option(opt));
        }

        // We're ready to go!
        println!("{}", UciResponse::<&str>::UciOk)
    }

    /// Convenience function to return an iterator over all UCI options this engine supports.
    fn options(&self) -> impl Iterator<Item = UciOption> {
        let defaults = SearchConfig::default();

        [
            UciOption::button("Clear Hash"),
            UciOption::spin("MaxDepth", tune::max_depth!() as i32, 1, MAX_DEPTH as i32),
            UciOption::spin(
                "CaptureDepth",
                tune::capture_depth!() as i32,
                0,
                MAX_CAPTURE_DEPTH as i32,
            ),
            UciOption::check("Pruning", defaults.pruning),
            UciOption::check("SearchCache", defaults.caches.search),
            UciOption::check("EvalCache", defaults.caches.eval),
            UciOption::check("PvCache", defaults.caches.pv),
        ]
        .into_iter()
    }

    /// Handles the `setoption` command, setting option `name` to `value`.
    ///
    /// Will return an error if `name` isn't a valid option or `value` is not a valid value for that option.
    fn set_option(&mut self, name: &str, value: Option<String>) -> Result<()> {
        if name == "Clear Hash" {
            self.player.clear_caches();
            return Ok(());
        }

        let config = self.player.config_mut();

        match name {
            "MaxDepth" => {
                let depth = parse_value::<u8>(name, value.as_deref())?;
                if !(1..=MAX_DEPTH).contains(&depth) {
                    bail!("{name} must be between 1 and {MAX_DEPTH}");
                }
                config.max_depth = depth;
            }

            "CaptureDepth" => {
                let depth = parse_value::<u8>(name, value.as_deref())?;
                if depth > MAX_CAPTURE_DEPTH {
                    bail!("Maximum value for {name} is {MAX_CAPTURE_DEPTH}");
                }
                config.capture_depth = depth;
            }

            "Pruning" => config.pruning = parse_value(name, value.as_deref())?,

            "SearchCache" => config.caches.search = parse_value(name, value.as_deref())?,

            "EvalCache" => config.caches.eval = parse_value(name, value.as_deref())?,

            "PvCache" => config.caches.pv = parse_value(name, value.as_deref())?,

            _ => {
                if let Some(value) = value.as_ref() {
                    bail!("Unrecognized option {name:?} with value {value:?}")
                } else {
                    bail!("Unrecognized option {name:?}")
                }
            }
        }

        if self.debug {
            let info = if let Some(value) = value.as_ref() {
                format!("Option {name} set to {value}")
            } else {
                format!("Option {name} toggled")
            };
            send_string(info);
        }

        Ok(())
    }

    /// Returns the current value of the option `name`, if it exists on this engine.
    fn get_option(&self, name: &str) -> Option<String> {
        let config = self.player.config();

        let value = match name {
            "Clear Hash" => String::default(),
            "MaxDepth" => config.max_depth.to_string(),
            "CaptureDepth" => config.capture_depth.to_string(),
            "Pruning" => config.pruning.to_string(),
            "SearchCache" => config.caches.search.to_string(),
            "EvalCache" => config.caches.eval.to_string(),
            "PvCache" => config.caches.pv.to_string(),
            _ => return None,
        };

        Some(value)
    }
}

impl Default for Engine {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the value given to option `name`.
fn parse_value<T: FromStr>(name: &str, value: Option<&str>) -> Result<T> {
    let Some(value) = value else {
        bail!("usage: setoption name {name} value <value>");
    };

    let Ok(parsed) = value.parse() else {
        bail!("invalid value for {name}: {value:?}");
    };

    Ok(parsed)
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing UCI commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'quit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        // Attempt to parse the input as a UCI command first, since that's the primary use case of the engine
        match UciCommand::new(buf) {
            Ok(cmd) => sender
                .send(EngineCommand::Uci { cmd })
                .context("Failed to send UCI command to engine")?,

            // If it's not a UCI command, check if it's an engine-specific command
            Err(UciParseError::UnrecognizedCommand { cmd: _ }) => {
                match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
                    Ok(cmd) => sender
                        .send(cmd)
                        .context("Failed to send command to engine")?,

                    // If it wasn't a custom command, either, print an error.
                    Err(err) => eprintln!("{err}"),
                }
            }

            // If it was a UCI command, print a usage message.
            Err(uci_err) => eprintln!("{uci_err}"),
        }
    }
}
