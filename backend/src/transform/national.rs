//! National time series: official country-level figures in long form.

use crate::models::{
    Metric, NationalSeriesRow, RawRecord, RawTable, GRANULARITY_COUNTRY, SOURCE_NATIONAL,
};

/// Country-level row published by Santé publique France.
pub fn is_national(record: &RawRecord) -> bool {
    record.granularite == GRANULARITY_COUNTRY && record.source_type == SOURCE_NATIONAL
}

/// Unpivot the national rows into `(date, type, nombre)` triples.
///
/// Output is metric-major: every `cas_confirmes` row in input order, then
/// every `deces` row, then every `reanimation` row. Missing values become 0.
pub fn national_series(raw: &RawTable) -> Vec<NationalSeriesRow> {
    let national: Vec<&RawRecord> = raw.records.iter().filter(|r| is_national(r)).collect();

    let mut rows = Vec::with_capacity(national.len() * Metric::ALL.len());
    for metric in Metric::ALL {
        rows.extend(national.iter().map(|record| NationalSeriesRow {
            date: record.date,
            metric,
            nombre: metric.value(record).unwrap_or(0),
        }));
    }
    rows
}
