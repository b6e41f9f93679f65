use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    account::Account,
    bank::{AccountDescriptor, AccountId, ClientId, TransactionId},
    client::{Client, PrivilegeLevel},
    clock::Tick,
};

/// Longest projection accepted, a hundred years of days.
pub const MAX_PROJECTION_TICKS: Tick = 36_500;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    AddClient,
    RaisePrivilege,
    OpenDebit,
    OpenDeposit,
    OpenCredit,
    Deposit,
    Withdraw,
    Transfer,
    Accrue,
    Commit,
    Advance,
    Project,
    Cancel,
}

/// Raw command fields, each command only looks at the ones it needs.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
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

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Field `{field}` is required for {kind:?}")]
    MissingField {
        kind: CommandKind,
        field: &'static str,
    },
    #[error("Amount must not be negative for {kind:?}")]
    NegativeAmount { kind: CommandKind },
    #[error("Projection over {ticks} ticks exceeds the limit of {max}")]
    ProjectionTooLong { ticks: Tick, max: Tick },
}

/// Account to open. Deposit maturity depends on the time of opening, so the
/// account itself is only built once the bank's clock is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSpec {
    Debit { balance: Decimal, rate: Decimal },
    Deposit { balance: Decimal, term: Tick },
    Credit { rate: Decimal, commission: Decimal },
}

impl AccountSpec {
    pub fn open(&self, now: Tick) -> Account {
        match *self {
            AccountSpec::Debit { balance, rate } => Account::debit(balance, rate),
            AccountSpec::Deposit { balance, term } => {
                Account::deposit(balance, now.saturating_add(term))
            }
            AccountSpec::Credit { rate, commission } => Account::credit(rate, commission),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankCommand {
    AddClient(Client),
    RaisePrivilege {
        client_id: ClientId,
        upgrade: Client,
    },
    OpenAccount {
        client_id: ClientId,
        spec: AccountSpec,
    },
    Deposit {
        target: AccountDescriptor,
        amount: Decimal,
    },
    Withdraw {
        target: AccountDescriptor,
        amount: Decimal,
    },
    Transfer {
        from: AccountDescriptor,
        to: AccountDescriptor,
        amount: Decimal,
    },
    Accrue,
    Commit,
    Advance {
        ticks: Tick,
    },
    Project {
        target: AccountDescriptor,
        duration: Tick,
    },
    Cancel {
        tx_id: TransactionId,
    },
}

impl BankCommand {
    pub fn parse_command(kind: CommandKind, args: CommandArgs) -> Result<Self, CommandError> {
        let parser = ArgParser { kind, args };
        match kind {
            CommandKind::AddClient => Ok(Self::AddClient(
                parser.client_record(parser.args.privilege.unwrap_or_default()),
            )),
            CommandKind::RaisePrivilege => Ok(Self::RaisePrivilege {
                client_id: parser.required(parser.args.client, "client")?,
                upgrade: parser
                    .client_record(parser.required(parser.args.privilege, "privilege")?),
            }),
            CommandKind::OpenDebit => Ok(Self::OpenAccount {
                client_id: parser.required(parser.args.client, "client")?,
                spec: AccountSpec::Debit {
                    balance: parser.opening_balance()?,
                    rate: parser.required(parser.args.rate, "rate")?,
                },
            }),
            CommandKind::OpenDeposit => Ok(Self::OpenAccount {
                client_id: parser.required(parser.args.client, "client")?,
                spec: AccountSpec::Deposit {
                    balance: parser.opening_balance()?,
                    term: parser.required(parser.args.ticks, "ticks")?,
                },
            }),
            CommandKind::OpenCredit => Ok(Self::OpenAccount {
                client_id: parser.required(parser.args.client, "client")?,
                spec: AccountSpec::Credit {
                    rate: parser.required(parser.args.rate, "rate")?,
                    commission: parser.required(parser.args.commission, "commission")?,
                },
            }),
            CommandKind::Deposit => Ok(Self::Deposit {
                target: parser.source()?,
                amount: parser.amount()?,
            }),
            CommandKind::Withdraw => Ok(Self::Withdraw {
                target: parser.source()?,
                amount: parser.amount()?,
            }),
            CommandKind::Transfer => Ok(Self::Transfer {
                from: parser.source()?,
                to: parser.destination()?,
                amount: parser.amount()?,
            }),
            CommandKind::Accrue => Ok(Self::Accrue),
            CommandKind::Commit => Ok(Self::Commit),
            CommandKind::Advance => Ok(Self::Advance {
                ticks: parser.required(parser.args.ticks, "ticks")?,
            }),
            CommandKind::Project => Ok(Self::Project {
                target: parser.source()?,
                duration: parser.projection_length()?,
            }),
            CommandKind::Cancel => Ok(Self::Cancel {
                tx_id: parser.required(parser.args.tx, "tx")?,
            }),
        }
    }
}

struct ArgParser {
    kind: CommandKind,
    args: CommandArgs,
}

impl ArgParser {
    fn required<T>(&self, value: Option<T>, field: &'static str) -> Result<T, CommandError> {
        value.ok_or(CommandError::MissingField {
            kind: self.kind,
            field,
        })
    }

    fn amount(&self) -> Result<Decimal, CommandError> {
        let amount = self.required(self.args.amount, "amount")?;
        if amount < Decimal::ZERO {
            return Err(CommandError::NegativeAmount { kind: self.kind });
        }
        Ok(amount)
    }

    /// Opening balance defaults to zero.
    fn opening_balance(&self) -> Result<Decimal, CommandError> {
        match self.args.amount {
            Some(_) => self.amount(),
            None => Ok(Decimal::ZERO),
        }
    }

    fn projection_length(&self) -> Result<Tick, CommandError> {
        let ticks = self.required(self.args.ticks, "ticks")?;
        if ticks > MAX_PROJECTION_TICKS {
            return Err(CommandError::ProjectionTooLong {
                ticks,
                max: MAX_PROJECTION_TICKS,
            });
        }
        Ok(ticks)
    }

    fn source(&self) -> Result<AccountDescriptor, CommandError> {
        Ok(AccountDescriptor::new(
            self.required(self.args.client, "client")?,
            self.required(self.args.account, "account")?,
        ))
    }

    fn destination(&self) -> Result<AccountDescriptor, CommandError> {
        Ok(AccountDescriptor::new(
            self.required(self.args.to_client, "to_client")?,
            self.required(self.args.to_account, "to_account")?,
        ))
    }

    fn client_record(&self, privilege_level: PrivilegeLevel) -> Client {
        Client {
            name: self.args.name.clone().unwrap_or_default(),
            surname: self.args.surname.clone().unwrap_or_default(),
            address: self.args.address.clone(),
            passport: self.args.passport.clone(),
            privilege_level,
        }
    }
}
