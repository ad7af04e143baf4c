//! Mazerunner -- a maze pursuit engine implementing the MRI protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout,
//! following the MRI (Maze Runner Interface) convention. Diagnostics go to
//! stderr through `env_logger`; set `RUST_LOG` to see them.

use std::io::{self, BufRead, Write};

use log::{error, warn};

use mazerunner::engine::Engine;
use mazerunner::protocol::parser::{parse_command, Command};

/// Runs the main MRI protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() {
    env_logger::init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            // the offending bytes are consumed, so reading can carry on
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("skipping unreadable input line: {}", e);
                continue;
            }
            Err(e) => {
                error!("failed to read stdin: {}", e);
                break;
            }
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let result = match cmd {
            Command::Mri => engine.handle_mri(&mut out),
            Command::IsReady => engine.handle_isready(&mut out),
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewGame => {
                engine.new_game();
                Ok(())
            }
            Command::Grid(spec) => engine.set_grid(spec),
            Command::Position(spec) => engine.set_position(spec),
            Command::SetSide { side } => {
                engine.set_side(side);
                Ok(())
            }
            Command::Go(params) => engine.handle_go(&params, &mut out).map(|_| ()),
            Command::Play(params) => engine.handle_play(&params, &mut out),
            Command::Move { side, cell } => engine.apply_move(side, cell, &mut out),
            Command::Report { path } => engine.write_report(&path),
            Command::Quit => break,
        };

        if let Err(e) = result {
            error!("{}", e);
            let _ = writeln!(out, "error {}", e);
            let _ = out.flush();
        }
    }
}
