//! `belts` batch CLI (§4.10): reads one JSON object from stdin, writes one
//! pretty-printed JSON object to stdout, exits 0 for ok/infeasible and 1 for
//! error. All diagnostic logging goes to stderr.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use factory_belts::belts::solve_belts;

/// Bounded-flow feasibility and max-flow solver for a belt network.
///
/// Reads a single JSON instance from stdin and writes a single JSON result
/// to stdout. Takes no flags besides `--version`/`--help`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli;

fn main() -> ExitCode {
    Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read stdin: {e}");
        return ExitCode::from(1);
    }

    let value: serde_json::Value = match serde_json::from_str(&input) {
        Ok(v) => v,
        Err(e) => {
            let output = serde_json::json!({"status": "error", "message": format!("invalid JSON: {e}")});
            print_output(&output);
            return ExitCode::from(1);
        }
    };

    let output = solve_belts(&value);
    let exit_code = output.exit_code();
    let value = serde_json::to_value(&output).expect("solver output always serializes");
    print_output(&value);
    ExitCode::from(exit_code as u8)
}

fn print_output(value: &serde_json::Value) {
    let mut stdout = io::stdout();
    if serde_json::to_writer_pretty(&mut stdout, value).is_ok() {
        let _ = stdout.write_all(b"\n");
    }
}
