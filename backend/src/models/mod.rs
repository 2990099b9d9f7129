//! Domain models for the covidviz pipeline.
//!
//! - [`RawRecord`] / [`RawTable`] - one row / the whole parsed source CSV
//! - [`NationalSeriesRow`] - long-form national time series
//! - [`RegionalSeriesRow`] - per-region time series with computed indicators
//! - [`Metric`] - the three counters unpivoted in the national table

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Source columns and filter values
// =============================================================================

/// Columns the source CSV must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "granularite",
    "source_type",
    "maille_nom",
    "cas_confirmes",
    "deces",
    "reanimation",
];

/// `granularite` value of country-level rows.
pub const GRANULARITY_COUNTRY: &str = "pays";

/// `granularite` value of region-level rows.
pub const GRANULARITY_REGION: &str = "region";

/// `source_type` of the official national figures.
pub const SOURCE_NATIONAL: &str = "sante-publique-france";

/// `source_type` of the regional health agencies.
pub const SOURCE_REGIONAL: &str = "agences-regionales-sante";

// =============================================================================
// Raw data
// =============================================================================

/// One row of the source CSV. Blank counter cells are `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub granularite: String,
    pub source_type: String,
    pub maille_nom: Option<String>,
    pub cas_confirmes: Option<u64>,
    pub deces: Option<u64>,
    pub reanimation: Option<u64>,
}

/// A data row that was dropped while parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the CSV body (header is line 1).
    pub line: u64,
    pub reason: String,
}

/// The parsed source CSV together with parse metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
    /// Detected text encoding
    pub encoding: String,
    /// Detected field delimiter
    pub delimiter: char,
    /// Column headers, in file order
    pub headers: Vec<String>,
    /// Rows whose cells could not be read
    pub skipped: Vec<SkippedRow>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// National series
// =============================================================================

/// Counter unpivoted into the national table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CasConfirmes,
    Deces,
    Reanimation,
}

impl Metric {
    /// Unpivot order.
    pub const ALL: [Metric; 3] = [Metric::CasConfirmes, Metric::Deces, Metric::Reanimation];

    /// Source column name.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::CasConfirmes => "cas_confirmes",
            Metric::Deces => "deces",
            Metric::Reanimation => "reanimation",
        }
    }

    /// Read this metric from a raw record.
    pub fn value(&self, record: &RawRecord) -> Option<u64> {
        match self {
            Metric::CasConfirmes => record.cas_confirmes,
            Metric::Deces => record.deces,
            Metric::Reanimation => record.reanimation,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// One `(date, type, nombre)` triple of the national series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NationalSeriesRow {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub metric: Metric,
    pub nombre: u64,
}

// =============================================================================
// Regional series
// =============================================================================

/// One day of one region, with day-over-day deltas and outbreak-relative ranks.
///
/// `None` means "undefined" and serializes as JSON `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionalSeriesRow {
    pub date: NaiveDate,
    pub maille_nom: String,
    pub cas_confirmes: Option<u64>,
    pub deces: Option<u64>,
    pub delta_deces: Option<i64>,
    pub delta_cas_confirmes: Option<i64>,
    pub fatality_rate: Option<f64>,
    pub days_after_5_deaths: Option<u32>,
    pub days_after_50_confirmed: Option<u32>,
}

impl RegionalSeriesRow {
    /// Projection of a raw regional record, indicators not yet computed.
    pub fn project(record: &RawRecord) -> Self {
        Self {
            date: record.date,
            maille_nom: record.maille_nom.clone().unwrap_or_default(),
            cas_confirmes: record.cas_confirmes,
            deces: record.deces,
            delta_deces: None,
            delta_cas_confirmes: None,
            fatality_rate: None,
            days_after_5_deaths: None,
            days_after_50_confirmed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RawRecord {
        RawRecord {
            date: NaiveDate::from_ymd_opt(2020, 3, 20).unwrap(),
            granularite: "region".into(),
            source_type: "agences-regionales-sante".into(),
            maille_nom: Some("Grand Est".into()),
            cas_confirmes: Some(120),
            deces: Some(7),
            reanimation: None,
        }
    }

    #[test]
    fn test_metric_columns_match_required_columns() {
        for metric in Metric::ALL {
            assert!(REQUIRED_COLUMNS.contains(&metric.column()));
        }
    }

    #[test]
    fn test_metric_value() {
        let r = record();
        assert_eq!(Metric::CasConfirmes.value(&r), Some(120));
        assert_eq!(Metric::Deces.value(&r), Some(7));
        assert_eq!(Metric::Reanimation.value(&r), None);
    }

    #[test]
    fn test_national_row_serializes_type_field() {
        let row = NationalSeriesRow {
            date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            metric: Metric::CasConfirmes,
            nombre: 130,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "cas_confirmes");
        assert_eq!(json["date"], "2020-03-01");
        assert_eq!(json["nombre"], 130);
    }

    #[test]
    fn test_regional_projection_leaves_indicators_undefined() {
        let row = RegionalSeriesRow::project(&record());
        assert_eq!(row.maille_nom, "Grand Est");
        assert_eq!(row.deces, Some(7));
        assert!(row.delta_deces.is_none());
        assert!(row.fatality_rate.is_none());

        let json = serde_json::to_value(&row).unwrap();
        assert!(json["days_after_5_deaths"].is_null());
    }
}
