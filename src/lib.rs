/// Account variants and their balance, withdrawal and interest rules.
pub mod account;

/// Client records and privilege levels.
pub mod client;

/// Simulated time source. The bank reads it, the caller advances it.
pub mod clock;

/// The bank itself: owns clients, accounts and the transfer history,
/// enforces privilege limits and runs interest accrual.
pub mod bank;

/// Typed bank commands, built from loosely typed fields.
pub mod command;

/// Command processor interface, implemented by [`bank::Bank`].
///
/// Parses a command and executes it, reporting what happened as a
/// [`processor::Outcome`].
pub mod processor;

/// Scenario replay from CSV, used by the binary and integration tests.
pub mod bin_utils;
