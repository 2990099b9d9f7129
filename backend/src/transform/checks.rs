//! Post-transform invariant checks.
//!
//! The transformation cannot fail on a parsed table, so any violation found
//! here is a bug; it is reported as a [`TransformError`] instead of shipping
//! inconsistent tables to the dashboard.

use super::grouper::group_ranges;
use super::regional::{CONFIRMED_THRESHOLD, DEATHS_THRESHOLD};
use crate::error::{TransformError, TransformResult};
use crate::models::{NationalSeriesRow, RegionalSeriesRow};

/// National table holds exactly three rows per national input row.
pub fn check_national(rows: &[NationalSeriesRow], national_inputs: usize) -> TransformResult<()> {
    let expected = national_inputs * 3;
    if rows.len() != expected {
        return Err(TransformError::RowCount {
            table: "national",
            expected,
            actual: rows.len(),
        });
    }
    Ok(())
}

/// Regional table: row count, delta nullness and rank contiguity per region.
pub fn check_regional(rows: &[RegionalSeriesRow], regional_inputs: usize) -> TransformResult<()> {
    if rows.len() != regional_inputs {
        return Err(TransformError::RowCount {
            table: "regional",
            expected: regional_inputs,
            actual: rows.len(),
        });
    }

    for range in group_ranges(rows, |r| r.maille_nom.as_str()) {
        let region = &rows[range];
        check_delta_heads(region)?;
        check_rank(region, "days_after_5_deaths", |r| r.days_after_5_deaths, |r| {
            r.deces.is_some_and(|d| d > DEATHS_THRESHOLD)
        })?;
        check_rank(region, "days_after_50_confirmed", |r| r.days_after_50_confirmed, |r| {
            r.cas_confirmes.is_some_and(|c| c > CONFIRMED_THRESHOLD)
        })?;
    }

    Ok(())
}

fn check_delta_heads(region: &[RegionalSeriesRow]) -> TransformResult<()> {
    let Some(head) = region.first() else {
        return Ok(());
    };

    let mismatch = |column| TransformError::DeltaNullness {
        column,
        region: head.maille_nom.clone(),
        date: head.date,
    };
    if head.delta_deces.is_some() {
        return Err(mismatch("delta_deces"));
    }
    if head.delta_cas_confirmes.is_some() {
        return Err(mismatch("delta_cas_confirmes"));
    }
    Ok(())
}

fn check_rank<R, Q>(
    region: &[RegionalSeriesRow],
    column: &'static str,
    rank: R,
    qualifies: Q,
) -> TransformResult<()>
where
    R: Fn(&RegionalSeriesRow) -> Option<u32>,
    Q: Fn(&RegionalSeriesRow) -> bool,
{
    let mut expected = 0;
    for row in region {
        let consistent = match (qualifies(row), rank(row)) {
            (true, Some(r)) => {
                expected += 1;
                r == expected
            }
            (false, None) => true,
            _ => false,
        };
        if !consistent {
            return Err(TransformError::RankGap {
                column,
                region: row.maille_nom.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, deces: u64, rank: Option<u32>) -> RegionalSeriesRow {
        RegionalSeriesRow {
            date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            maille_nom: "Grand Est".into(),
            cas_confirmes: Some(10),
            deces: Some(deces),
            delta_deces: None,
            delta_cas_confirmes: None,
            fatality_rate: None,
            days_after_5_deaths: rank,
            days_after_50_confirmed: None,
        }
    }

    #[test]
    fn test_consistent_region_passes() {
        let mut rows = vec![row(1, 2, None), row(2, 6, Some(1)), row(3, 9, Some(2))];
        rows[1].delta_deces = Some(4);
        rows[2].delta_deces = Some(3);
        assert!(check_regional(&rows, 3).is_ok());
    }

    #[test]
    fn test_rank_gap_detected() {
        let rows = vec![row(1, 6, Some(1)), row(2, 9, Some(3))];
        let err = check_regional(&rows, 2).unwrap_err();
        assert!(matches!(err, TransformError::RankGap { column: "days_after_5_deaths", .. }));
    }

    #[test]
    fn test_rank_on_non_qualifying_row_detected() {
        let rows = vec![row(1, 5, Some(1))];
        assert!(check_regional(&rows, 1).is_err());
    }

    #[test]
    fn test_delta_on_first_row_detected() {
        let mut rows = vec![row(1, 2, None)];
        rows[0].delta_deces = Some(2);
        let err = check_regional(&rows, 1).unwrap_err();
        assert!(matches!(err, TransformError::DeltaNullness { column: "delta_deces", .. }));
    }

    #[test]
    fn test_row_count_mismatch() {
        let err = check_national(&[], 2).unwrap_err();
        assert!(matches!(err, TransformError::RowCount { expected: 6, actual: 0, .. }));
    }
}
