use std::fs::File;

use anyhow::{Context, Result};
use toy_bank::{
    bin_utils::{RowError, Service},
    processor::Outcome,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let filename = std::env::args()
        .nth(1)
        .context("Expected a scenario file name as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        error_printer: Box::new(|line, err| match err {
            RowError::Malformed(err) => eprintln!("Error at line {line}: {err}"),
            RowError::Rejected(err) => eprintln!("Line {line} rejected: {err}"),
        }),
        outcome_printer: Box::new(|line, outcome| match outcome {
            Outcome::Projected(balance) => eprintln!("Line {line}: projected balance {balance}"),
            Outcome::Transferred(None) => eprintln!("Line {line}: transfer refused"),
            _ => {}
        }),
    };
    service.run()
}
