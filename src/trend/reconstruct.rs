use chrono::NaiveDate;
use std::collections::HashMap;

use super::{build_day_keys, DayPolicy, ReportRange, TrendPoint, TrendReport, TrendSummary};
use crate::inventory::{Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DayTotals {
    pub total_in: f64,
    pub total_out: f64,
}

impl DayTotals {
    pub fn net(&self) -> f64 {
        self.total_in - self.total_out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub totals: DayTotals,
}

/// Parameters of one report run
#[derive(Debug, Clone)]
pub struct TrendRequest {
    pub range: ReportRange,
    /// Restrict to one item; None combines every item
    pub item_id: Option<String>,
    pub today: NaiveDate,
    pub policy: DayPolicy,
}

/// Sum IN/ADJUST and OUT quantities per day.
///
/// Every key in `day_keys` gets a bucket, in the same order. Rows with an
/// unparseable timestamp or a day outside `day_keys` are skipped.
pub fn aggregate_by_day<'a, I>(
    transactions: I,
    day_keys: &[NaiveDate],
    policy: &DayPolicy,
) -> Vec<DayBucket>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let index: HashMap<NaiveDate, usize> = day_keys
        .iter()
        .enumerate()
        .map(|(slot, day)| (*day, slot))
        .collect();
    let mut buckets: Vec<DayBucket> = day_keys
        .iter()
        .map(|&day| DayBucket {
            day,
            totals: DayTotals::default(),
        })
        .collect();

    let mut undated = 0usize;
    let mut out_of_range = 0usize;
    let mut unrecognized = 0usize;

    for tx in transactions {
        let Some(day) = policy.day_of(&tx.created_at) else {
            undated += 1;
            continue;
        };
        let Some(&slot) = index.get(&day) else {
            out_of_range += 1;
            continue;
        };

        let quantity = if tx.quantity.is_finite() { tx.quantity } else { 0.0 };
        let totals = &mut buckets[slot].totals;
        match tx.kind {
            TransactionKind::Unknown => unrecognized += 1,
            kind if kind.is_inbound() => totals.total_in += quantity,
            _ => totals.total_out += quantity,
        }
    }

    if undated + out_of_range + unrecognized > 0 {
        tracing::debug!(
            undated,
            out_of_range,
            unrecognized,
            "skipped transactions while bucketing"
        );
    }

    buckets
}

/// Walk backwards from `current_on_hand` on the last day, undoing each later
/// day's net change. Negative results are kept as-is.
pub fn reconstruct_on_hand(buckets: &[DayBucket], current_on_hand: f64) -> Vec<TrendPoint> {
    let n = buckets.len();
    if n == 0 {
        return Vec::new();
    }

    let mut on_hand = vec![0.0; n];
    on_hand[n - 1] = current_on_hand;
    for i in (0..n - 1).rev() {
        on_hand[i] = on_hand[i + 1] - buckets[i + 1].totals.net();
    }

    buckets
        .iter()
        .zip(on_hand)
        .map(|(bucket, on_hand)| TrendPoint {
            day: bucket.day,
            on_hand,
            net_change: bucket.totals.net(),
            total_in: bucket.totals.total_in,
            total_out: bucket.totals.total_out,
        })
        .collect()
}

pub fn summarize(series: &[TrendPoint], current_on_hand: f64) -> TrendSummary {
    let total_in: f64 = series.iter().map(|p| p.total_in).sum();
    let total_out: f64 = series.iter().map(|p| p.total_out).sum();

    TrendSummary {
        current_on_hand: series.last().map_or(current_on_hand, |p| p.on_hand),
        total_in,
        total_out,
        net_change: total_in - total_out,
    }
}

/// Run the whole pipeline: day keys, item filter, bucketing, reconstruction, rollup
pub fn build_trend(
    request: &TrendRequest,
    transactions: &[Transaction],
    current_on_hand: f64,
) -> TrendReport {
    let day_keys = build_day_keys(request.range.days(), request.today);

    let scoped = transactions.iter().filter(|tx| match &request.item_id {
        Some(item) => tx.item_id.as_deref() == Some(item.as_str()),
        None => true,
    });
    let buckets = aggregate_by_day(scoped, &day_keys, &request.policy);
    let series = reconstruct_on_hand(&buckets, current_on_hand);
    let summary = summarize(&series, current_on_hand);

    let report = TrendReport {
        range: request.range,
        item_id: request.item_id.clone(),
        series,
        summary,
    };

    let negative = report.negative_days();
    if let Some(first) = negative.first() {
        tracing::warn!(
            days = negative.len(),
            first = %first,
            "reconstructed on-hand goes negative; ledger and current count disagree"
        );
    }

    report
}
