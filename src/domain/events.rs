use super::identity::Identity;
use super::payment::ValidatedIntent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Emitted once a payment has been transferred, for off-line listeners.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct PaymentDone {
    pub payer: Identity,
    pub amount: u64,
    pub payment_id: u64,
    /// Unix seconds.
    pub timestamp: i64,
}

impl PaymentDone {
    pub fn new(intent: &ValidatedIntent, payment_id: u64, at: DateTime<Utc>) -> Self {
        Self {
            payer: intent.authority,
            amount: intent.amount,
            payment_id,
            timestamp: at.timestamp(),
        }
    }
}
