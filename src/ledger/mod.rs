//! Account registry and transaction ledger

pub mod account;
pub mod transaction;

pub use account::{default_chart_of_accounts, AccountRegistry};
pub use transaction::TransactionLedger;
