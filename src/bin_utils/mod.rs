//! Replays a CSV scenario against a fresh [`Bank`] and prints the resulting
//! accounts as CSV. Kept in the library so integration tests can drive it.

use std::io::{Read, Write};

use crate::{
    bank::Bank,
    processor::{CommandProcessor, Outcome, ProcessError},
};
use anyhow::Result;
use csv_parser::CsvScenarioParser;
use csv_printer::print_accounts;
use thiserror::Error;
use tracing::warn;

pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum RowError {
    /// The row couldn't be read as a command.
    #[error(transparent)]
    Malformed(csv::Error),
    #[error(transparent)]
    Rejected(ProcessError),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, RowError)>,
    pub outcome_printer: Box<dyn FnMut(u64, Outcome)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvScenarioParser::new(self.input);

        let mut bank = Bank::default();

        for (line, row) in parser {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    warn!(line, %err, "malformed scenario row");
                    (self.error_printer)(line, RowError::Malformed(err));
                    continue;
                }
            };
            let (kind, args) = row.into_parts();
            match bank.process_command(kind, args) {
                Ok(outcome) => (self.outcome_printer)(line, outcome),
                Err(err) => (self.error_printer)(line, RowError::Rejected(err)),
            }
        }

        print_accounts(self.output, &bank)
    }
}
