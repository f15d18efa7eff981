use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::inventory::Transaction;

/// Current stock per item plus the append-only transaction history.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Ledger {
    #[serde(default)]
    pub on_hand: BTreeMap<String, f64>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn on_hand_for(&self, item_id: &str) -> f64 {
        self.on_hand.get(item_id).copied().unwrap_or(0.0)
    }
}
