use rust_decimal::Decimal;
use thiserror::Error;

use crate::clock::Tick;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Balance arithmetic overflowed")]
    Overflow,
}

/// Deposit rate picked from the opening balance. Not re-evaluated later.
pub fn deposit_rate_for(opening_balance: Decimal) -> Decimal {
    if opening_balance < Decimal::from(50_000) {
        Decimal::new(3, 2)
    } else if opening_balance < Decimal::from(100_000) {
        Decimal::new(35, 3)
    } else {
        Decimal::new(4, 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// Balance never goes below zero.
    Debit,
    /// Withdrawals are blocked until `maturity`.
    Deposit { maturity: Tick },
    /// Overdraft allowed, `commission` charged while the balance is negative.
    Credit { commission: Decimal },
}

impl AccountKind {
    pub fn name(&self) -> &'static str {
        match self {
            AccountKind::Debit => "debit",
            AccountKind::Deposit { .. } => "deposit",
            AccountKind::Credit { .. } => "credit",
        }
    }
}

/// An interest-bearing account.
///
/// Interest is collected in two phases: [`Account::accrue_interest`] adds
/// to `pending_interest`, [`Account::commit_interest`] moves it into the
/// balance and resets it to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    balance: Decimal,
    daily_rate: Decimal,
    pending_interest: Decimal,
    kind: AccountKind,
}

impl Account {
    pub fn debit(balance: Decimal, daily_rate: Decimal) -> Self {
        Self {
            balance,
            daily_rate,
            pending_interest: Decimal::ZERO,
            kind: AccountKind::Debit,
        }
    }

    pub fn deposit(opening_balance: Decimal, maturity: Tick) -> Self {
        Self {
            balance: opening_balance,
            daily_rate: deposit_rate_for(opening_balance),
            pending_interest: Decimal::ZERO,
            kind: AccountKind::Deposit { maturity },
        }
    }

    /// Credit accounts always open empty.
    pub fn credit(daily_rate: Decimal, commission: Decimal) -> Self {
        Self {
            balance: Decimal::ZERO,
            daily_rate,
            pending_interest: Decimal::ZERO,
            kind: AccountKind::Credit { commission },
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn daily_rate(&self) -> Decimal {
        self.daily_rate
    }

    pub fn pending_interest(&self) -> Decimal {
        self.pending_interest
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    /// Applies `delta` according to the account rules and returns the change
    /// that actually happened. On overflow the account is left untouched.
    pub fn change_balance(&mut self, delta: Decimal, now: Tick) -> Result<Decimal, AccountError> {
        match self.kind {
            AccountKind::Debit => self.apply_floored(delta),
            AccountKind::Deposit { maturity } => {
                if delta < Decimal::ZERO && now < maturity {
                    self.apply_floored(Decimal::ZERO)
                } else {
                    self.apply_floored(delta)
                }
            }
            AccountKind::Credit { .. } => {
                self.balance = checked_add(self.charge_commission()?, delta)?;
                Ok(delta)
            }
        }
    }

    fn apply_floored(&mut self, delta: Decimal) -> Result<Decimal, AccountError> {
        let floored = checked_add(self.balance, delta)?.max(Decimal::ZERO);
        let applied = floored
            .checked_sub(self.balance)
            .ok_or(AccountError::Overflow)?;
        self.balance = floored;
        Ok(applied)
    }

    /// Balance after the overdraft commission, if one is due.
    fn charge_commission(&self) -> Result<Decimal, AccountError> {
        match self.kind {
            AccountKind::Credit { commission } if self.balance < Decimal::ZERO => {
                self.balance
                    .checked_sub(commission)
                    .ok_or(AccountError::Overflow)
            }
            _ => Ok(self.balance),
        }
    }

    pub fn can_withdraw(&self, sum: Decimal, now: Tick) -> bool {
        match self.kind {
            AccountKind::Debit => self.balance >= sum,
            AccountKind::Deposit { maturity } => now >= maturity && self.balance >= sum,
            AccountKind::Credit { .. } => true,
        }
    }

    pub fn accrue_interest(&mut self) -> Result<(), AccountError> {
        let accrues = match self.kind {
            AccountKind::Debit | AccountKind::Deposit { .. } => self.balance >= Decimal::ZERO,
            AccountKind::Credit { .. } => true,
        };
        if accrues {
            let interest = self
                .daily_rate
                .checked_mul(self.balance)
                .ok_or(AccountError::Overflow)?;
            self.pending_interest = checked_add(self.pending_interest, interest)?;
        }
        Ok(())
    }

    pub fn commit_interest(&mut self) -> Result<(), AccountError> {
        self.balance = checked_add(self.charge_commission()?, self.pending_interest)?;
        self.pending_interest = Decimal::ZERO;
        Ok(())
    }

    /// Overwrites the balance, bypassing every account rule.
    pub fn force_set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}

fn checked_add(lhs: Decimal, rhs: Decimal) -> Result<Decimal, AccountError> {
    lhs.checked_add(rhs).ok_or(AccountError::Overflow)
}
