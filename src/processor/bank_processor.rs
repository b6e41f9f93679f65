use tracing::debug;

use crate::{
    bank::{AccountDescriptor, Bank},
    clock::Clock,
    command::{BankCommand, CommandArgs, CommandKind},
};

use super::{CommandProcessor, Outcome, ProcessError};

impl<C: Clock> CommandProcessor for Bank<C> {
    fn process_command(
        &mut self,
        kind: CommandKind,
        args: CommandArgs,
    ) -> Result<Outcome, ProcessError> {
        let cmd = BankCommand::parse_command(kind, args)?;
        let outcome = match cmd {
            BankCommand::AddClient(client) => Outcome::ClientAdded(self.add_client(client)?),
            BankCommand::RaisePrivilege { client_id, upgrade } => {
                self.raise_privilege(client_id, &upgrade)?;
                Outcome::Done
            }
            BankCommand::OpenAccount { client_id, spec } => {
                let account = spec.open(self.now());
                let account_id = self.add_account(client_id, account)?;
                Outcome::AccountOpened(AccountDescriptor::new(client_id, account_id))
            }
            BankCommand::Deposit { target, amount } => {
                Outcome::Deposited(self.deposit(target, amount)?)
            }
            BankCommand::Withdraw { target, amount } => {
                Outcome::Withdrawn(self.withdraw(target, amount)?)
            }
            BankCommand::Transfer { from, to, amount } => {
                Outcome::Transferred(self.transfer(from, to, amount)?)
            }
            BankCommand::Accrue => {
                self.accrue_all()?;
                Outcome::Done
            }
            BankCommand::Commit => {
                self.commit_all()?;
                Outcome::Done
            }
            BankCommand::Advance { ticks } => {
                self.clock_mut().advance(ticks);
                debug!(now = self.now(), "clock advanced");
                Outcome::Done
            }
            BankCommand::Project { target, duration } => {
                Outcome::Projected(self.project_balance(target, duration)?)
            }
            BankCommand::Cancel { tx_id } => Outcome::Cancelled(self.cancel_transaction(tx_id)?),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::{
        Decimal,
        prelude::{FromPrimitive, Zero},
    };

    use crate::{bank::BankError, client::PrivilegeLevel, command::CommandError};

    use super::*;

    fn amount(value: u32) -> Option<Decimal> {
        Some(Decimal::from_u32(value).unwrap())
    }

    #[test]
    fn process_some_commands() {
        let mut bank = Bank::default();
        let outcome = bank
            .process_command(CommandKind::AddClient, CommandArgs::default())
            .unwrap();
        assert_eq!(outcome, Outcome::ClientAdded(1));

        let outcome = bank
            .process_command(
                CommandKind::OpenDeposit,
                CommandArgs {
                    client: Some(1),
                    amount: amount(1_000),
                    ticks: Some(30),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(outcome, Outcome::AccountOpened(AccountDescriptor::new(1, 1)));

        let withdraw = CommandArgs {
            client: Some(1),
            account: Some(1),
            amount: amount(500),
            ..Default::default()
        };
        let outcome = bank
            .process_command(CommandKind::Withdraw, withdraw.clone())
            .unwrap();
        assert_eq!(outcome, Outcome::Withdrawn(Decimal::zero()));

        bank.process_command(
            CommandKind::Advance,
            CommandArgs {
                ticks: Some(30),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(bank.now(), 30);
        let outcome = bank.process_command(CommandKind::Withdraw, withdraw).unwrap();
        assert_eq!(outcome, Outcome::Withdrawn(Decimal::from_u32(500).unwrap()));

        let outcome = bank
            .process_command(
                CommandKind::Cancel,
                CommandArgs {
                    tx: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled(false));
    }

    #[test]
    fn errors_are_wrapped() {
        let mut bank = Bank::default();
        let err = bank
            .process_command(CommandKind::Deposit, CommandArgs::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessError::CommandErr(CommandError::MissingField {
                kind: CommandKind::Deposit,
                field: "client"
            })
        ));

        let err = bank
            .process_command(
                CommandKind::AddClient,
                CommandArgs {
                    privilege: Some(PrivilegeLevel::Full),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessError::BankErr(BankError::InsufficientInformation {
                level: PrivilegeLevel::Full
            })
        ));
        assert_eq!(
            err.to_string(),
            "Not enough information for Full privilege level"
        );
    }
}
