//! Stars donations: the transaction ledger and the menu-driven flow on top.

pub mod donation;
pub mod ledger;

pub use donation::{DonationAction, DonationConfig, DonationFlow, DonationKind};
pub use ledger::{Transaction, TransactionLedger, TransactionStatus};
