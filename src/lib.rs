pub mod config;
pub mod error;
pub mod inventory;
pub mod trend;

pub use config::{Config, Item, Ledger};
pub use error::{Result, ShelterError};
pub use inventory::{current_on_hand, record_transaction, Transaction, TransactionKind};
pub use trend::{build_trend, DayPolicy, ReportRange, TrendReport, TrendRequest};
