use serde::{Deserialize, Serialize};

use crate::trend::ReportRange;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub organization: Organization,
    #[serde(default)]
    pub reports: ReportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReportSettings {
    #[serde(default = "default_range")]
    pub default_range: ReportRange,
    /// "local", "utc" or a fixed offset such as "+05:30"
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_range: default_range(),
            timezone: default_timezone(),
        }
    }
}

fn default_range() -> ReportRange {
    ReportRange::Week
}

fn default_timezone() -> String {
    "local".to_string()
}
