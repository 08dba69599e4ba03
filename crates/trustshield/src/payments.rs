//! Incoming payments, kept with the payment credential hashed.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::identity::sha256_hex;
use crate::utils::time::now_rfc3339;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransactionRecord {
    pub timestamp: String,
    pub customer: String,
    pub amount_cents: u64,
    pub payment_credential_hash: String,
    pub status: String,
}

/// Newest-first ledger holding at most `capacity` records.
#[derive(Debug)]
pub struct PaymentLedger {
    records: Mutex<VecDeque<TransactionRecord>>,
    capacity: usize,
}

impl PaymentLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Hashes `payment_method` and stores the record; the plain value is
    /// dropped here.
    pub fn record(&self, customer: &str, amount_cents: u64, payment_method: &str) -> TransactionRecord {
        let record = TransactionRecord {
            timestamp: now_rfc3339(),
            customer: customer.to_string(),
            amount_cents,
            payment_credential_hash: sha256_hex(payment_method),
            status: "Completed".to_string(),
        };
        let mut records = self.records.lock();
        records.push_front(record.clone());
        records.truncate(self.capacity);
        record
    }

    pub fn list(&self) -> Vec<TransactionRecord> {
        self.records.lock().iter().cloned().collect()
    }
}
