// blackout/src/main.rs
//! Blackout entry point.
//!
//! Parses the CLI, configures logging, and dispatches to the selected
//! command. Validation failures (the input PDF is at fault) exit with code
//! 2; engine failures exit with code 1.

use blackout::cli::{Cli, Commands};
use blackout::commands::{self, exit_code_for};
use blackout::logger;
use clap::Parser;
use owo_colors::OwoColorize;
use is_terminal::IsTerminal;

fn main() {
    let args = Cli::parse();

    if args.quiet {
        logger::init_logger(Some(log::LevelFilter::Off));
    } else if args.debug {
        logger::init_logger(Some(log::LevelFilter::Debug));
    } else {
        logger::init_logger(None);
    }

    let outcome = match &args.command {
        Commands::Redact(cmd) => commands::redact::run(cmd, args.quiet),
        Commands::Scan(cmd) => commands::scan::run(cmd, args.quiet),
    };

    if let Err(e) = outcome {
        let message = format!("Error: {:#}", e);
        if std::io::stderr().is_terminal() {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{}", message);
        }
        std::process::exit(exit_code_for(&e));
    }
}
