use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    bank::{AccountDescriptor, BankError, ClientId, TransactionId},
    command::{CommandArgs, CommandError, CommandKind},
};

pub mod bank_processor;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    BankErr(#[from] BankError),
}

/// What a successfully processed command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ClientAdded(ClientId),
    AccountOpened(AccountDescriptor),
    Deposited(Decimal),
    Withdrawn(Decimal),
    /// `None` when the source account couldn't cover the transfer.
    Transferred(Option<TransactionId>),
    Projected(Decimal),
    /// `false` when there was nothing to cancel.
    Cancelled(bool),
    Done,
}

pub trait CommandProcessor {
    fn process_command(
        &mut self,
        kind: CommandKind,
        args: CommandArgs,
    ) -> Result<Outcome, ProcessError>;
}
