use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ReportRange;

/// One day of the reconstructed series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub day: NaiveDate,
    pub on_hand: f64,
    pub net_change: f64,
    #[serde(rename = "in")]
    pub total_in: f64,
    #[serde(rename = "out")]
    pub total_out: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub current_on_hand: f64,
    pub total_in: f64,
    pub total_out: f64,
    pub net_change: f64,
}

/// Complete result of a trend computation
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub range: ReportRange,
    pub item_id: Option<String>,
    pub series: Vec<TrendPoint>,
    pub summary: TrendSummary,
}

impl TrendReport {
    /// Days whose reconstructed on-hand went below zero, which means the
    /// ledger and the current count disagree
    pub fn negative_days(&self) -> Vec<NaiveDate> {
        self.series
            .iter()
            .filter(|p| p.on_hand < 0.0)
            .map(|p| p.day)
            .collect()
    }
}
