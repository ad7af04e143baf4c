//! Self-play game generation CLI.
//!
//! Plays engine-vs-engine maze games and outputs the records as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N          Number of games to play (default: 10)
//!   --rows N           Rows of the open grid (default: 10)
//!   --cols N           Columns of the open grid (default: 10)
//!   --maze FILE        JSON maze to play on instead of an open grid
//!   --algorithm TAG    minimax or alpha-beta (default: minimax)
//!   --depth N          Search horizon in plies, at most 12 (default: 5)
//!   --max-plies N      Plies before a game is drawn (default: 200)
//!   --threads N        Number of parallel threads (default: 4)
//!   --seed N           Random seed, 0 for entropy (default: 0)
//!   --output FILE      Output file path (default: stdout)
//!   --quiet            Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use mazerunner::grid::load_grid;
use mazerunner::search::{Algorithm, MAX_DEPTH_LIMIT};
use mazerunner::selfplay::{self, SelfPlayConfig};

/// Parses the value following a flag, exiting with usage on failure.
fn flag_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|s| s.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid or missing value for {}", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = flag_value(&args, i, "--games");
            }
            "--rows" => {
                i += 1;
                config.rows = flag_value(&args, i, "--rows");
            }
            "--cols" => {
                i += 1;
                config.cols = flag_value(&args, i, "--cols");
            }
            "--maze" => {
                i += 1;
                let path: String = flag_value(&args, i, "--maze");
                match load_grid(&path) {
                    Ok(g) => config.grid = Some(g),
                    Err(e) => {
                        eprintln!("{}", e);
                        process::exit(1);
                    }
                }
            }
            "--algorithm" => {
                i += 1;
                config.algorithm = match args.get(i).map(|s| s.parse::<Algorithm>()) {
                    Some(Ok(a)) => a,
                    Some(Err(e)) => {
                        eprintln!("{}", e);
                        process::exit(1);
                    }
                    None => {
                        print_usage();
                        process::exit(1);
                    }
                };
            }
            "--depth" => {
                i += 1;
                config.max_depth = flag_value(&args, i, "--depth");
                if config.max_depth > MAX_DEPTH_LIMIT {
                    eprintln!("--depth must be at most {}", MAX_DEPTH_LIMIT);
                    process::exit(1);
                }
            }
            "--max-plies" => {
                i += 1;
                config.max_plies = flag_value(&args, i, "--max-plies");
            }
            "--threads" => {
                i += 1;
                config.threads = flag_value(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = flag_value(&args, i, "--seed");
            }
            "--output" => {
                i += 1;
                output_path = Some(flag_value(&args, i, "--output"));
            }
            "--quiet" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if !quiet {
        let (rows, cols) = match &config.grid {
            Some(g) => (g.rows(), g.cols()),
            None => (config.rows, config.cols),
        };
        eprintln!(
            "Self-play: {} games on {}x{}, {} depth {}, max {} plies, {} threads",
            config.num_games,
            rows,
            cols,
            config.algorithm,
            config.max_depth,
            config.max_plies,
            config.threads
        );
    }

    let start = Instant::now();
    let games = match selfplay::run_self_play(&config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("self-play failed: {}", e);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if !quiet {
        let s = selfplay::summarize(&games);
        eprintln!(
            "Completed {} games in {:.1}s",
            s.games,
            elapsed.as_secs_f64()
        );
        eprintln!("MAX wins: {}", s.max_wins);
        eprintln!("MIN wins: {}", s.min_wins);
        eprintln!("Stalemates: {}", s.stalemates);
        eprintln!("Ply limit reached: {}", s.ply_limits);
        eprintln!("Nodes searched: {}", s.total_nodes);
    }

    let written = match &output_path {
        Some(path) => File::create(path)
            .and_then(|file| selfplay::write_jsonl(&games, &mut BufWriter::new(file))),
        None => {
            let stdout = io::stdout();
            selfplay::write_jsonl(&games, &mut BufWriter::new(stdout.lock()))
        }
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {}", e);
        process::exit(1);
    }
    if let (Some(path), false) = (&output_path, quiet) {
        eprintln!("Wrote {} games to {}", games.len(), path);
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --rows N         Rows of the open grid (default: 10)");
    eprintln!("  --cols N         Columns of the open grid (default: 10)");
    eprintln!("  --maze FILE      JSON maze to play on instead of an open grid");
    eprintln!("  --algorithm TAG  minimax or alpha-beta (default: minimax)");
    eprintln!("  --depth N        Search horizon in plies, at most 12 (default: 5)");
    eprintln!("  --max-plies N    Plies before a game is drawn (default: 200)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
