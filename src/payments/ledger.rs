//! In-memory ledger of Stars donation transactions.
//!
//! Every invoice gets a ledger entry keyed by its payload before the
//! invoice is sent; a successful payment settles the entry by payload.
//! Entries live for the process lifetime unless refunded.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use teloxide::types::UserId;
use uuid::Uuid;

use crate::core::error::{AppError, AppResult};

/// Lifecycle of one donation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Invoice sent, payment not confirmed yet.
    Pending,
    /// Payment confirmed by Telegram.
    Settled,
}

/// One donation, from invoice to settlement.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Ledger key, also the invoice payload. Unique per invoice.
    pub id: String,
    pub user: UserId,
    /// Amount in Stars.
    pub amount: u32,
    pub title: String,
    pub status: TransactionStatus,
    /// Telegram charge id, set at settlement. Required for refunds.
    pub charge_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Concurrent transaction store. Lock-free per-entry access via `DashMap`,
/// safe to share across handler tasks.
#[derive(Clone, Default)]
pub struct TransactionLedger {
    transactions: Arc<DashMap<String, Transaction>>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a pending transaction and returns it. The generated id doubles
    /// as the invoice payload, so settlement can correlate by payload alone.
    pub fn open(&self, user: UserId, amount: u32, title: &str) -> Transaction {
        let transaction = Transaction {
            id: format!("donation:{}", Uuid::new_v4()),
            user,
            amount,
            title: title.to_string(),
            status: TransactionStatus::Pending,
            charge_id: None,
            created_at: Utc::now(),
        };
        self.transactions
            .insert(transaction.id.clone(), transaction.clone());
        transaction
    }

    /// Settles the transaction matching the payment payload, attaching the
    /// Telegram charge id. Unknown payloads are an error, never a panic;
    /// a payment can arrive for a payload the process no longer knows
    /// (for example after a restart).
    pub fn settle(&self, payload: &str, charge_id: &str) -> AppResult<Transaction> {
        let mut entry = self
            .transactions
            .get_mut(payload)
            .ok_or_else(|| AppError::TransactionNotFound(payload.to_string()))?;
        entry.status = TransactionStatus::Settled;
        entry.charge_id = Some(charge_id.to_string());
        Ok(entry.clone())
    }

    pub fn lookup(&self, id: &str) -> Option<Transaction> {
        self.transactions.get(id).map(|t| t.clone())
    }

    /// Removes the transaction from the ledger, returning it so the caller
    /// can issue the refund through the payment provider. Bookkeeping only,
    /// no money moves here.
    pub fn refund(&self, id: &str) -> AppResult<Transaction> {
        self.transactions
            .remove(id)
            .map(|(_, t)| t)
            .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = UserId(42);

    #[test]
    fn test_open_creates_pending_with_payload_id() {
        let ledger = TransactionLedger::new();
        let tx = ledger.open(USER, 100, "Донат 100 ⭐");

        assert!(tx.id.starts_with("donation:"));
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(tx.charge_id.is_none());
        assert_eq!(ledger.lookup(&tx.id).unwrap().amount, 100);
    }

    #[test]
    fn test_settle_by_payload() {
        let ledger = TransactionLedger::new();
        let tx = ledger.open(USER, 50, "Донат 50 ⭐");

        let settled = ledger.settle(&tx.id, "charge_abc").unwrap();
        assert_eq!(settled.status, TransactionStatus::Settled);
        assert_eq!(settled.charge_id.as_deref(), Some("charge_abc"));
        assert_eq!(ledger.lookup(&tx.id).unwrap().status, TransactionStatus::Settled);
    }

    #[test]
    fn test_settle_unknown_payload_is_an_error() {
        let ledger = TransactionLedger::new();
        let result = ledger.settle("donation:missing", "charge");
        assert!(matches!(result, Err(AppError::TransactionNotFound(_))));
    }

    #[test]
    fn test_refund_removes_entry() {
        let ledger = TransactionLedger::new();
        let tx = ledger.open(USER, 10, "Донат 10 ⭐");
        ledger.settle(&tx.id, "charge_x").unwrap();

        let taken = ledger.refund(&tx.id).unwrap();
        assert_eq!(taken.charge_id.as_deref(), Some("charge_x"));
        assert!(ledger.lookup(&tx.id).is_none());
        assert!(matches!(
            ledger.refund(&tx.id),
            Err(AppError::TransactionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_opens_get_unique_ids() {
        let ledger = TransactionLedger::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.open(UserId(i), 10, "Донат").id
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(ids.len(), 32);
    }
}
