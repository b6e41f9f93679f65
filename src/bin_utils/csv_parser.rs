use std::io::Read;

use crate::{
    bank::{AccountId, ClientId, TransactionId},
    client::PrivilegeLevel,
    clock::Tick,
    command::{CommandArgs, CommandKind},
};
use csv::{DeserializeRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CommandRow {
    pub op: CommandKind,
    pub client: Option<ClientId>,
    pub account: Option<AccountId>,
    pub to_client: Option<ClientId>,
    pub to_account: Option<AccountId>,
    pub amount: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub ticks: Option<Tick>,
    pub tx: Option<TransactionId>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub address: Option<String>,
    pub passport: Option<String>,
    pub privilege: Option<PrivilegeLevel>,
}

impl CommandRow {
    pub fn into_parts(self) -> (CommandKind, CommandArgs) {
        (
            self.op,
            CommandArgs {
                client: self.client,
                account: self.account,
                to_client: self.to_client,
                to_account: self.to_account,
                amount: self.amount,
                rate: self.rate,
                commission: self.commission,
                ticks: self.ticks,
                tx: self.tx,
                name: self.name,
                surname: self.surname,
                address: self.address,
                passport: self.passport,
                privilege: self.privilege,
            },
        )
    }
}

/// Reads a scenario in CSV format, one command per row.
///
/// Rows that can't be read are yielded as errors together with their line, so
/// the caller decides whether to carry on.
pub struct CsvScenarioParser<R> {
    iter: DeserializeRecordsIntoIter<R, CommandRow>,
}

impl<R> CsvScenarioParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvScenarioParser<R>
where
    R: Read,
{
    type Item = (u64, Result<CommandRow, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}
