use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelterError {
    #[error("Data directory not found at {0}. Run 'shelter init' to create it.")]
    DataDirNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse transactions file {path}: {source}")]
    TransactionsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Item '{0}' not found in items.toml")]
    ItemNotFound(String),

    #[error("Item '{0}' is inactive")]
    InactiveItem(String),

    #[error("Invalid quantity '{qty}': {reason}")]
    InvalidQuantity { qty: String, reason: String },

    #[error("Cannot record a transaction of type {0}")]
    UnsupportedKind(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid time zone '{0}'. Use 'local', 'utc' or an offset like '+05:30'.")]
    InvalidTimezone(String),

    #[error("Not enough stock of '{item}': {on_hand} on hand, {requested} requested")]
    InsufficientStock {
        item: String,
        on_hand: f64,
        requested: f64,
    },

    #[error("Data directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Failed to serialize {what}: {reason}")]
    Serialize { what: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShelterError>;
