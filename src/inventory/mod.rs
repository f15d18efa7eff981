mod record;
mod transaction;

pub use record::{current_on_hand, record_transaction, scoped_transactions, RecordedTransaction};
pub use transaction::{Transaction, TransactionKind};
