//! On-hand trend reconstruction.
//!
//! The only trustworthy absolute number is today's on-hand count, so the series
//! is anchored on the last day and walked backwards, undoing each day's net
//! change from the transaction ledger.

mod calendar;
mod reconstruct;
mod report;

pub use calendar::{build_day_keys, DayPolicy, ReportRange};
pub use reconstruct::{
    aggregate_by_day, build_trend, reconstruct_on_hand, summarize, DayBucket, DayTotals,
    TrendRequest,
};
pub use report::{TrendPoint, TrendReport, TrendSummary};
