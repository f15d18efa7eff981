use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

use crate::config::{load_config, load_items, load_ledger, save_ledger, Item, Ledger};
use crate::error::{Result, ShelterError};
use crate::inventory::{Transaction, TransactionKind};
use crate::trend::DayPolicy;

/// Outcome of a recorded movement, for the confirmation message
#[derive(Debug)]
pub struct RecordedTransaction {
    pub transaction: Transaction,
    pub item: Item,
    pub on_hand: f64,
}

fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() {
        return Err(ShelterError::InvalidQuantity {
            qty: quantity.to_string(),
            reason: "must be a number".to_string(),
        });
    }
    if quantity <= 0.0 {
        return Err(ShelterError::InvalidQuantity {
            qty: quantity.to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Record a stock movement against an item and update its on-hand quantity
pub fn record_transaction(
    data_dir: &Path,
    item_id: &str,
    kind: TransactionKind,
    quantity: f64,
    date: Option<NaiveDate>,
    note: Option<String>,
) -> Result<RecordedTransaction> {
    validate_quantity(quantity)?;

    let config = load_config(data_dir)?;
    let items = load_items(data_dir)?;
    let mut ledger = load_ledger(data_dir)?;

    let item = items
        .get(item_id)
        .ok_or_else(|| ShelterError::ItemNotFound(item_id.to_string()))?
        .clone();
    if !item.active {
        return Err(ShelterError::InactiveItem(item_id.to_string()));
    }

    let current = ledger.on_hand_for(item_id);
    let on_hand = match kind {
        TransactionKind::Unknown => return Err(ShelterError::UnsupportedKind(kind.to_string())),
        kind if kind.is_inbound() => current + quantity,
        _ => {
            if quantity > current {
                return Err(ShelterError::InsufficientStock {
                    item: item_id.to_string(),
                    on_hand: current,
                    requested: quantity,
                });
            }
            current - quantity
        }
    };

    // Back-dated entries land mid-day so any offset keeps them on the same day
    let created_at = match date {
        Some(d) => format!("{}T12:00:00", d.format("%Y-%m-%d")),
        None => {
            let policy = DayPolicy::parse(&config.reports.timezone)?;
            policy.now_timestamp()
        }
    };

    let transaction = Transaction {
        kind,
        quantity,
        created_at,
        item_id: Some(item_id.to_string()),
        note,
    };

    ledger.on_hand.insert(item_id.to_string(), on_hand);
    ledger.transactions.push(transaction.clone());
    save_ledger(data_dir, &ledger)?;

    tracing::info!(
        item = item_id,
        kind = %kind,
        quantity,
        on_hand,
        "recorded transaction"
    );

    Ok(RecordedTransaction {
        transaction,
        item,
        on_hand,
    })
}

/// Current on-hand quantity for one item, or summed across all active items
pub fn current_on_hand(
    ledger: &Ledger,
    items: &HashMap<String, Item>,
    item_id: Option<&str>,
) -> f64 {
    match item_id {
        Some(id) => ledger.on_hand_for(id),
        None => items
            .iter()
            .filter(|(_, item)| item.active)
            .map(|(id, _)| ledger.on_hand_for(id))
            .sum(),
    }
}

/// Ledger rows belonging to the same scope `current_on_hand` counts: one item,
/// or every active item. Rows for inactive or untagged items are dropped.
pub fn scoped_transactions(
    transactions: Vec<Transaction>,
    items: &HashMap<String, Item>,
    item_id: Option<&str>,
) -> Vec<Transaction> {
    transactions
        .into_iter()
        .filter(|tx| match (item_id, tx.item_id.as_deref()) {
            (Some(wanted), Some(id)) => id == wanted,
            (None, Some(id)) => items.get(id).is_some_and(|item| item.active),
            (_, None) => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(active: bool) -> Item {
        Item {
            name: "Blankets".to_string(),
            unit: "each".to_string(),
            category: None,
            active,
        }
    }

    #[test]
    fn test_current_on_hand_sums_active_items_only() {
        let mut items = HashMap::new();
        items.insert("blankets".to_string(), item(true));
        items.insert("beans".to_string(), item(true));
        items.insert("retired".to_string(), item(false));

        let mut ledger = Ledger::default();
        ledger.on_hand.insert("blankets".to_string(), 10.0);
        ledger.on_hand.insert("beans".to_string(), 5.0);
        ledger.on_hand.insert("retired".to_string(), 100.0);

        assert_eq!(current_on_hand(&ledger, &items, None), 15.0);
        assert_eq!(current_on_hand(&ledger, &items, Some("beans")), 5.0);
        assert_eq!(current_on_hand(&ledger, &items, Some("missing")), 0.0);
    }

    fn movement(item_id: Option<&str>, quantity: f64) -> Transaction {
        Transaction {
            kind: TransactionKind::In,
            quantity,
            created_at: "2024-01-02".to_string(),
            item_id: item_id.map(str::to_string),
            note: None,
        }
    }

    #[test]
    fn test_scoped_transactions_match_on_hand_scope() {
        let mut items = HashMap::new();
        items.insert("blankets".to_string(), item(true));
        items.insert("retired".to_string(), item(false));
        let rows = vec![
            movement(Some("blankets"), 5.0),
            movement(Some("retired"), 100.0),
            movement(Some("deleted"), 7.0),
            movement(None, 3.0),
        ];

        let all = scoped_transactions(rows.clone(), &items, None);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].quantity, 5.0);

        let retired = scoped_transactions(rows, &items, Some("retired"));
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].quantity, 100.0);
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1.5).is_ok());
        assert!(matches!(
            validate_quantity(0.0),
            Err(ShelterError::InvalidQuantity { .. })
        ));
        assert!(validate_quantity(f64::NAN).is_err());
    }
}
