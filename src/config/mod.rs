mod item;
mod ledger;
mod settings;

pub use item::Item;
pub use ledger::Ledger;
pub use settings::{Config, Organization, ReportSettings};

use crate::error::{Result, ShelterError};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the data directory path (platform config dir, or ~/.shelter/)
pub fn data_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "shelter") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        ShelterError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".shelter"))
}

/// Fail early when the data directory has not been initialized
pub fn ensure_data_dir(data_dir: &Path) -> Result<()> {
    if !data_dir.exists() {
        return Err(ShelterError::DataDirNotFound(data_dir.to_path_buf()));
    }
    Ok(())
}

fn read_toml<T: serde::de::DeserializeOwned>(path: PathBuf) -> Result<T> {
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ShelterError::ConfigParse { path, source: e })
}

/// Load the main config.toml
pub fn load_config(data_dir: &Path) -> Result<Config> {
    let path = data_dir.join("config.toml");
    if !path.exists() {
        return Err(ShelterError::ConfigFileNotFound(path));
    }
    read_toml(path)
}

/// Load items.toml as a HashMap keyed by item id
pub fn load_items(data_dir: &Path) -> Result<HashMap<String, Item>> {
    let path = data_dir.join("items.toml");
    if !path.exists() {
        return Err(ShelterError::ConfigFileNotFound(path));
    }
    read_toml(path)
}

/// Load ledger.toml (empty ledger if missing)
pub fn load_ledger(data_dir: &Path) -> Result<Ledger> {
    let path = data_dir.join("ledger.toml");
    if !path.exists() {
        return Ok(Ledger::default());
    }
    let ledger: Ledger = read_toml(path)?;
    tracing::debug!(
        transactions = ledger.transactions.len(),
        items = ledger.on_hand.len(),
        "loaded ledger"
    );
    Ok(ledger)
}

/// Save ledger.toml
pub fn save_ledger(data_dir: &Path, ledger: &Ledger) -> Result<()> {
    let path = data_dir.join("ledger.toml");
    let content = toml::to_string_pretty(ledger).map_err(|e| ShelterError::Serialize {
        what: "ledger".to_string(),
        reason: e.to_string(),
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[organization]
name = "Your Shelter Name"
# contact = "ops@yourshelter.org"   # optional

[reports]
default_range = "week"   # day, week, month or year
timezone = "local"       # local, utc, or a fixed offset like "-05:00"
"#;

/// Template content for items.toml
pub const ITEMS_TEMPLATE: &str = r#"# Define inventory items here. The table name (e.g., [blankets])
# is used as the item identifier in the record and trend commands.
#
# Example:
#   shelter record --item blankets --kind in --quantity 20

[blankets]
name = "Wool Blankets"
unit = "each"
category = "bedding"

[canned-beans]
name = "Canned Beans"
unit = "can"
category = "food"

[hygiene-kits]
name = "Hygiene Kits"
unit = "kit"
# active = false   # inactive items are hidden from totals
"#;
