use std::io::Write;

use anyhow::Context;
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    account::Account,
    bank::{AccountDescriptor, AccountId, Bank, ClientId},
    clock::Clock,
};

/// One output row. Amounts are normalized, so `62000.00` prints as `62000`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AccountSummary {
    pub client: ClientId,
    pub account: AccountId,
    pub kind: &'static str,
    pub balance: Decimal,
    pub pending_interest: Decimal,
    pub daily_rate: Decimal,
}

impl AccountSummary {
    pub fn new(descriptor: AccountDescriptor, account: &Account) -> Self {
        Self {
            client: descriptor.client_id,
            account: descriptor.account_id,
            kind: account.kind().name(),
            balance: account.balance().normalize(),
            pending_interest: account.pending_interest().normalize(),
            daily_rate: account.daily_rate().normalize(),
        }
    }
}

/// Writes every account of `bank` in descriptor order. Nothing, not even a
/// header, is written for a bank without accounts.
pub fn print_accounts<C, W>(output: &mut W, bank: &Bank<C>) -> anyhow::Result<()>
where
    C: Clock,
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for (descriptor, account) in bank.accounts() {
        writer
            .serialize(AccountSummary::new(descriptor, account))
            .with_context(|| format!("Failed to write account {descriptor} to CSV"))?;
    }
    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::from_utf8;

    use super::*;
    use crate::client::Client;

    #[test]
    fn prints_normalized_rows() {
        let mut bank = Bank::default();
        let id = bank.add_client(Client::new("a", "b")).unwrap();
        let account = Account::debit(Decimal::new(150_000, 2), Decimal::new(100, 4));
        bank.add_account(id, account).unwrap();
        bank.add_account(id, Account::credit(Decimal::new(1, 3), Decimal::ONE))
            .unwrap();

        let mut output = Vec::new();
        print_accounts(&mut output, &bank).unwrap();
        assert_eq!(
            from_utf8(&output).unwrap(),
            "client,account,kind,balance,pending_interest,daily_rate\n\
             1,1,debit,1500,0,0.01\n\
             1,2,credit,0,0,0.001\n"
        );
    }

    #[test]
    fn summary_from_account() {
        let account = Account::deposit(Decimal::new(6_000_000, 2), 30);
        let summary = AccountSummary::new(AccountDescriptor::new(3, 7), &account);
        assert_eq!(summary.kind, "deposit");
        assert_eq!(summary.balance.to_string(), "60000");
        assert_eq!(summary.daily_rate, Decimal::new(35, 3));
    }
}
