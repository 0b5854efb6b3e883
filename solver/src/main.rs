//! Command line driver for the azeotrope puzzle solvers.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use azeotrope::{chrooma, transmission};
use clap::{Parser, Subcommand};
use log::warn;

/// Solvers for the Chrooma and Transmission puzzle games.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a Chrooma board
    Chrooma {
        /// Board file; reads standard input when omitted
        file: Option<PathBuf>,
    },
    /// Solve Transmission level files, one level per file
    Transmission {
        /// Level files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Attempt all of a level's objectives at once instead of one at a
        /// time; the ALLOBJ environment variable (any value) does the same
        #[arg(long)]
        all_objectives: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    match Args::parse().command {
        Command::Chrooma { file } => run_chrooma(file),
        Command::Transmission {
            files,
            all_objectives,
        } => run_transmission(
            &files,
            all_objectives || std::env::var_os("ALLOBJ").is_some(),
        ),
    }
}

fn run_chrooma(file: Option<PathBuf>) -> ExitCode {
    let text = match &file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
    };
    let text = match text {
        Ok(text) => text,
        Err(e) => {
            eprintln!("cannot read board: {e}");
            return ExitCode::from(1);
        }
    };

    let (board, initial) = match chrooma::Board::parse(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            println!("{e}");
            return ExitCode::from(1);
        }
    };

    match chrooma::solve(&board, initial.clone()) {
        chrooma::Outcome::Solved { trace } => {
            print!("{}", chrooma::render_solution(&board, &initial, &trace));
            ExitCode::SUCCESS
        }
        chrooma::Outcome::StepLimitExceeded => {
            println!("STEP LIMIT EXCEEDED");
            ExitCode::from(1)
        }
        chrooma::Outcome::NoSolution => {
            println!("NO SOLUTION");
            ExitCode::from(2)
        }
    }
}

fn run_transmission(files: &[PathBuf], all_objectives: bool) -> ExitCode {
    let mut unsolved = 0usize;
    for path in files {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                // unreadable inputs are skipped, matching the level batch runner
                warn!("skipping {}: {e}", path.display());
                continue;
            }
        };
        if files.len() > 1 {
            println!("## {}", path.display());
        }
        match transmission::Level::parse(&text) {
            Ok(level) => {
                let report = transmission::solve(&level, all_objectives);
                print!("{}", report.output);
                unsolved += report.unsolved;
            }
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                unsolved += 1;
            }
        }
    }
    // the exit status counts the unsolved level/objective combinations
    ExitCode::from(unsolved.min(u8::MAX as usize) as u8)
}
