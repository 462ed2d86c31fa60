//! redone-build - environment-driven build and deploy CLI for the Redone Android app
//!
//! ## Architecture
//!
//! ```text
//! CLI → build/orchestrator.rs → npx react-native bundle / gradlew / adb
//! ```
//!
//! Every failure is terminal: the error is reported with a hint and the
//! process exits with status 1.

mod build;
mod cli;
mod config;
mod error;
mod exec;
mod utils;

use clap::Parser;

use cli::Cli;
use error::BuildError;
use utils::terminal::print_error;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version go to stdout and succeed; usage errors exit 1
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = cli.execute() {
        match err.downcast_ref::<BuildError>() {
            Some(build_err) => build_err.display_with_hints(),
            None => print_error(&format!("{:#}", err)),
        }
        std::process::exit(1);
    }
}
