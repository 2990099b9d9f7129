//! Regional time series with per-region indicators.
//!
//! Rows are projected, stable-sorted by `(maille_nom, date)`, then each region
//! is scanned once in chronological order:
//!
//! | column                    | rule                                              |
//! |---------------------------|---------------------------------------------------|
//! | `delta_deces`             | `deces - previous deces`, null on the first day   |
//! | `delta_cas_confirmes`     | same on `cas_confirmes`                           |
//! | `fatality_rate`           | `deces / cas_confirmes`, null when `cas == 0`     |
//! | `days_after_5_deaths`     | 1, 2, ... on rows with `deces > 5`                |
//! | `days_after_50_confirmed` | 1, 2, ... on rows with `cas_confirmes > 50`       |
//!
//! A null counter propagates: it nulls its own delta and the next row's,
//! its fatality rate, and the row never qualifies for a rank.

use super::grouper::group_ranges;
use crate::models::{
    RawRecord, RawTable, RegionalSeriesRow, GRANULARITY_REGION, SOURCE_REGIONAL,
};

/// Deaths above which a region's outbreak clock starts.
pub const DEATHS_THRESHOLD: u64 = 5;

/// Confirmed cases above which a region's outbreak clock starts.
pub const CONFIRMED_THRESHOLD: u64 = 50;

/// Region-level row published by a regional health agency.
///
/// Rows without a region name belong to no region and are left out.
pub fn is_regional(record: &RawRecord) -> bool {
    record.granularite == GRANULARITY_REGION
        && record.source_type == SOURCE_REGIONAL
        && record.maille_nom.is_some()
}

/// Build the regional table from the raw dataset.
pub fn regional_series(raw: &RawTable) -> Vec<RegionalSeriesRow> {
    let mut rows: Vec<RegionalSeriesRow> = raw
        .records
        .iter()
        .filter(|r| is_regional(r))
        .map(RegionalSeriesRow::project)
        .collect();

    // sort_by is stable: same-day duplicates keep input order.
    rows.sort_by(|a, b| a.maille_nom.cmp(&b.maille_nom).then(a.date.cmp(&b.date)));

    for range in group_ranges(&rows, |r| r.maille_nom.as_str()) {
        let region = &mut rows[range];
        apply_deltas(region);
        assign_rank(region, |r| r.deces, DEATHS_THRESHOLD, |r, rank| {
            r.days_after_5_deaths = Some(rank)
        });
        assign_rank(region, |r| r.cas_confirmes, CONFIRMED_THRESHOLD, |r, rank| {
            r.days_after_50_confirmed = Some(rank)
        });
    }

    for row in &mut rows {
        row.fatality_rate = fatality_rate(row.deces, row.cas_confirmes);
    }

    rows
}

/// Day-over-day differences within one region.
fn apply_deltas(region: &mut [RegionalSeriesRow]) {
    let mut previous: Option<(Option<u64>, Option<u64>)> = None;

    for row in region.iter_mut() {
        if let Some((prev_deces, prev_cas)) = previous {
            row.delta_deces = diff(row.deces, prev_deces);
            row.delta_cas_confirmes = diff(row.cas_confirmes, prev_cas);
        }
        previous = Some((row.deces, row.cas_confirmes));
    }
}

fn diff(current: Option<u64>, previous: Option<u64>) -> Option<i64> {
    Some(current? as i64 - previous? as i64)
}

/// Ratio of deaths to confirmed cases; undefined when there are no cases.
pub fn fatality_rate(deces: Option<u64>, cas_confirmes: Option<u64>) -> Option<f64> {
    match (deces, cas_confirmes) {
        (Some(d), Some(c)) if c > 0 => Some(d as f64 / c as f64),
        _ => None,
    }
}

/// Number qualifying rows 1, 2, ... in chronological order.
fn assign_rank<V, S>(region: &mut [RegionalSeriesRow], value: V, threshold: u64, mut set: S)
where
    V: Fn(&RegionalSeriesRow) -> Option<u64>,
    S: FnMut(&mut RegionalSeriesRow, u32),
{
    let mut rank = 0;
    for row in region.iter_mut() {
        if value(row).is_some_and(|v| v > threshold) {
            rank += 1;
            set(row, rank);
        }
    }
}
