use std::{collections::BTreeMap, fmt};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    account::{Account, AccountError},
    client::{Client, PrivilegeLevel},
    clock::{Clock, MONTH_LENGTH, ManualClock, Tick},
};

pub mod transaction;

use transaction::{Transaction, TransactionHistory};

pub type ClientId = u64;
pub type AccountId = u64;
pub type TransactionId = u64;

/// The only way to name an account from outside the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountDescriptor {
    pub client_id: ClientId,
    pub account_id: AccountId,
}

impl AccountDescriptor {
    pub fn new(client_id: ClientId, account_id: AccountId) -> Self {
        Self {
            client_id,
            account_id,
        }
    }
}

impl fmt::Display for AccountDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.client_id, self.account_id)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankError {
    #[error("Client {client_id} does not exist")]
    ClientNotFound { client_id: ClientId },
    #[error("Account {descriptor} does not exist")]
    AccountNotFound { descriptor: AccountDescriptor },
    #[error("Not enough information for {level:?} privilege level")]
    InsufficientInformation { level: PrivilegeLevel },
    #[error("Withdrawal of {amount} exceeds the {limit} limit for {level:?} privilege level")]
    LimitExceeded {
        amount: Decimal,
        limit: Decimal,
        level: PrivilegeLevel,
    },
    #[error("Balance of account {descriptor} is out of range")]
    Overflow { descriptor: AccountDescriptor },
}

/// Largest single withdrawal per privilege level, `None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalLimits {
    pub initial: Option<Decimal>,
    pub intermediate: Option<Decimal>,
    pub full: Option<Decimal>,
}

impl Default for WithdrawalLimits {
    fn default() -> Self {
        Self {
            initial: Some(Decimal::from(1_000)),
            intermediate: Some(Decimal::from(10_000)),
            full: None,
        }
    }
}

impl WithdrawalLimits {
    pub fn for_level(&self, level: PrivilegeLevel) -> Option<Decimal> {
        match level {
            PrivilegeLevel::Initial => self.initial,
            PrivilegeLevel::Intermediate => self.intermediate,
            PrivilegeLevel::Full => self.full,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankConfig {
    pub limits: WithdrawalLimits,
    /// Ticks between commits when projecting balances. Zero disables commits.
    pub month_length: Tick,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            limits: WithdrawalLimits::default(),
            month_length: MONTH_LENGTH,
        }
    }
}

/// Owns every client, account and transfer record.
///
/// Accounts are never handed out mutably; all balance changes go through the
/// operations below so that balances and history stay consistent.
#[derive(Debug)]
pub struct Bank<C = ManualClock> {
    clock: C,
    config: BankConfig,
    clients: BTreeMap<ClientId, Client>,
    accounts: BTreeMap<ClientId, BTreeMap<AccountId, Account>>,
    history: TransactionHistory,
    next_client_id: ClientId,
    next_account_id: AccountId,
}

impl Default for Bank<ManualClock> {
    fn default() -> Self {
        Self::new(ManualClock::default())
    }
}

impl<C: Clock> Bank<C> {
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, BankConfig::default())
    }

    pub fn with_config(clock: C, config: BankConfig) -> Self {
        Self {
            clock,
            config,
            clients: BTreeMap::new(),
            accounts: BTreeMap::new(),
            history: TransactionHistory::default(),
            next_client_id: 1,
            next_account_id: 1,
        }
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn add_client(&mut self, client: Client) -> Result<ClientId, BankError> {
        if !client.meets_requirements() {
            warn!(level = ?client.privilege_level, "client rejected");
            return Err(BankError::InsufficientInformation {
                level: client.privilege_level,
            });
        }
        let client_id = self.next_client_id;
        self.next_client_id += 1;
        info!(client_id, level = ?client.privilege_level, "client added");
        self.clients.insert(client_id, client);
        Ok(client_id)
    }

    pub fn add_account(
        &mut self,
        client_id: ClientId,
        account: Account,
    ) -> Result<AccountId, BankError> {
        self.client(client_id)?;
        let account_id = self.next_account_id;
        self.next_account_id += 1;
        info!(
            client_id,
            account_id,
            kind = account.kind().name(),
            balance = %account.balance(),
            "account opened"
        );
        self.accounts
            .entry(client_id)
            .or_default()
            .insert(account_id, account);
        Ok(account_id)
    }

    /// Moves the client to a higher privilege level, taking the fields that
    /// level needs from `upgrade`. Lower or equal levels are ignored.
    pub fn raise_privilege(
        &mut self,
        client_id: ClientId,
        upgrade: &Client,
    ) -> Result<(), BankError> {
        let client = self.client(client_id)?;
        let Some(merged) = client.upgraded(upgrade) else {
            debug!(client_id, level = ?upgrade.privilege_level, "privilege not raised");
            return Ok(());
        };
        if !merged.meets_requirements() {
            warn!(client_id, level = ?merged.privilege_level, "privilege upgrade rejected");
            return Err(BankError::InsufficientInformation {
                level: merged.privilege_level,
            });
        }
        info!(client_id, level = ?merged.privilege_level, "privilege raised");
        self.clients.insert(client_id, merged);
        Ok(())
    }

    /// Returns the amount actually taken from the account.
    pub fn withdraw(
        &mut self,
        target: AccountDescriptor,
        sum: Decimal,
    ) -> Result<Decimal, BankError> {
        self.account(target)?;
        self.check_limit(target.client_id, sum)?;
        let now = self.clock.now();
        let applied = self
            .account_mut(target)?
            .change_balance(-sum, now)
            .map_err(overflowed(target))?;
        debug!(account = %target, requested = %sum, applied = %applied.abs(), "withdraw");
        Ok(applied.abs())
    }

    pub fn deposit(
        &mut self,
        target: AccountDescriptor,
        sum: Decimal,
    ) -> Result<Decimal, BankError> {
        let now = self.clock.now();
        let applied = self
            .account_mut(target)?
            .change_balance(sum, now)
            .map_err(overflowed(target))?;
        debug!(account = %target, requested = %sum, %applied, "deposit");
        Ok(applied)
    }

    /// Returns `Ok(None)` when `from` can't cover `sum`; nothing changes then.
    ///
    /// Both descriptors and the withdrawal limit are checked before any
    /// balance is touched. If `to` can't hold the sum, `from` is restored.
    pub fn transfer(
        &mut self,
        from: AccountDescriptor,
        to: AccountDescriptor,
        sum: Decimal,
    ) -> Result<Option<TransactionId>, BankError> {
        let now = self.clock.now();
        if !self.account(from)?.can_withdraw(sum, now) {
            debug!(%from, %to, %sum, "transfer refused, insufficient funds");
            return Ok(None);
        }
        self.check_limit(from.client_id, sum)?;
        self.account(to)?;

        let snapshot = self.account(from)?.clone();
        self.withdraw(from, sum)?;
        if let Err(err) = self.deposit(to, sum) {
            *self.account_mut(from)? = snapshot;
            warn!(%from, %to, %sum, "transfer rolled back");
            return Err(err);
        }
        let tx_id = self.history.append(from, to, sum);
        let suspicious = self.is_suspicious(from.client_id)?;
        info!(tx_id, %from, %to, %sum, suspicious, "transfer");
        Ok(Some(tx_id))
    }

    /// Accrues interest on every account. An account whose interest would
    /// overflow is skipped and reported, the rest are still processed.
    pub fn accrue_all(&mut self) -> Result<(), BankError> {
        let (count, result) = self.for_each_account(Account::accrue_interest);
        debug!(accounts = count, now = self.clock.now(), "interest accrued");
        result
    }

    /// Same as [`Bank::accrue_all`], for committing pending interest.
    pub fn commit_all(&mut self) -> Result<(), BankError> {
        let (count, result) = self.for_each_account(Account::commit_interest);
        debug!(accounts = count, now = self.clock.now(), "interest committed");
        result
    }

    /// Balance the account would have after `duration` ticks of daily accrual
    /// with a commit at every month boundary. The live account is not touched.
    pub fn project_balance(
        &self,
        target: AccountDescriptor,
        duration: Tick,
    ) -> Result<Decimal, BankError> {
        let mut projected = self.account(target)?.clone();
        let start = self.clock.now();
        for tick in start..start.saturating_add(duration) {
            projected.accrue_interest().map_err(overflowed(target))?;
            if tick.checked_rem(self.config.month_length) == Some(0) {
                projected.commit_interest().map_err(overflowed(target))?;
            }
        }
        debug!(
            account = %target,
            duration,
            projected = %projected.balance(),
            "balance projected"
        );
        Ok(projected.balance())
    }

    /// Reverses a transfer by writing balances directly, ignoring account
    /// rules and any interest since. Unknown or already cancelled ids are a
    /// no-op and return `false`.
    pub fn cancel_transaction(&mut self, tx_id: TransactionId) -> Result<bool, BankError> {
        let Some(tx) = self.history.find(tx_id).cloned() else {
            debug!(tx_id, "cancel of unknown transaction ignored");
            return Ok(false);
        };
        if self.history.is_cancelled(tx_id) {
            debug!(tx_id, "transaction already cancelled");
            return Ok(false);
        }
        let from_before = self.account(tx.from)?.balance();
        self.account(tx.to)?;

        let from_after = from_before
            .checked_add(tx.amount)
            .ok_or(BankError::Overflow { descriptor: tx.from })?;
        self.account_mut(tx.from)?.force_set_balance(from_after);
        // read after the first write, `from` and `to` may be the same account
        let Some(to_after) = self.account(tx.to)?.balance().checked_sub(tx.amount) else {
            self.account_mut(tx.from)?.force_set_balance(from_before);
            return Err(BankError::Overflow { descriptor: tx.to });
        };
        self.account_mut(tx.to)?.force_set_balance(to_after);
        self.history.mark_cancelled(tx_id);
        info!(
            tx_id,
            from = %tx.from,
            to = %tx.to,
            amount = %tx.amount,
            "transaction cancelled"
        );
        Ok(true)
    }

    /// Anyone below full privilege is considered suspicious.
    pub fn is_suspicious(&self, client_id: ClientId) -> Result<bool, BankError> {
        Ok(self.client(client_id)?.privilege_level != PrivilegeLevel::Full)
    }

    pub fn client(&self, client_id: ClientId) -> Result<&Client, BankError> {
        self.clients
            .get(&client_id)
            .ok_or(BankError::ClientNotFound { client_id })
    }

    pub fn account(&self, descriptor: AccountDescriptor) -> Result<&Account, BankError> {
        self.client(descriptor.client_id)?;
        self.accounts
            .get(&descriptor.client_id)
            .and_then(|accounts| accounts.get(&descriptor.account_id))
            .ok_or(BankError::AccountNotFound { descriptor })
    }

    /// All accounts ordered by descriptor.
    pub fn accounts(&self) -> impl Iterator<Item = (AccountDescriptor, &Account)> {
        self.accounts.iter().flat_map(|(client_id, accounts)| {
            accounts.iter().map(move |(account_id, acc)| {
                (AccountDescriptor::new(*client_id, *account_id), acc)
            })
        })
    }

    pub fn history(&self) -> &[Transaction] {
        self.history.records()
    }

    pub fn is_cancelled(&self, tx_id: TransactionId) -> bool {
        self.history.is_cancelled(tx_id)
    }

    fn account_mut(&mut self, descriptor: AccountDescriptor) -> Result<&mut Account, BankError> {
        self.client(descriptor.client_id)?;
        self.accounts
            .get_mut(&descriptor.client_id)
            .and_then(|accounts| accounts.get_mut(&descriptor.account_id))
            .ok_or(BankError::AccountNotFound { descriptor })
    }

    /// Runs `action` on every account, returning how many were visited and
    /// the first failure.
    fn for_each_account(
        &mut self,
        mut action: impl FnMut(&mut Account) -> Result<(), AccountError>,
    ) -> (usize, Result<(), BankError>) {
        let mut count = 0usize;
        let mut first_err = None;
        for (client_id, accounts) in &mut self.accounts {
            for (account_id, account) in accounts {
                count += 1;
                if action(account).is_err() {
                    let descriptor = AccountDescriptor::new(*client_id, *account_id);
                    warn!(account = %descriptor, "interest overflowed, account left unchanged");
                    first_err.get_or_insert(BankError::Overflow { descriptor });
                }
            }
        }
        (count, first_err.map_or(Ok(()), Err))
    }

    fn check_limit(&self, client_id: ClientId, sum: Decimal) -> Result<(), BankError> {
        let level = self.client(client_id)?.privilege_level;
        match self.config.limits.for_level(level) {
            Some(limit) if sum > limit => {
                warn!(client_id, amount = %sum, %limit, ?level, "withdrawal limit exceeded");
                Err(BankError::LimitExceeded {
                    amount: sum,
                    limit,
                    level,
                })
            }
            _ => Ok(()),
        }
    }
}

fn overflowed(descriptor: AccountDescriptor) -> impl FnOnce(AccountError) -> BankError {
    move |_| BankError::Overflow { descriptor }
}
