//! Handles all user-facing output for the CLI.
//!
//! Per-test detail goes to the test logs; the terminal only gets the run
//! summary and rendered error reports.

use miette::Report;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::HarnessError;

fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Prints the one-line summary of a passing run.
pub fn print_success(files: usize, workers: usize) {
    let mut stdout = StandardStream::stdout(color_choice(atty::Stream::Stdout));
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    print!("PASS");
    let _ = stdout.reset();
    println!(" {} test file(s), {} worker(s)", files, workers);
}

/// Renders `error` as a miette report on stderr, preceded by a FAIL banner.
pub fn print_error(error: HarnessError) {
    let mut stderr = StandardStream::stderr(color_choice(atty::Stream::Stderr));
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    eprint!("FAIL");
    let _ = stderr.reset();
    eprintln!();

    let report = Report::new(error);
    eprintln!("{report:?}");
}
