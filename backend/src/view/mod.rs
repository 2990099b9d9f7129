//! Dashboard views over the derived tables.
//!
//! Nothing here mutates the derived tables; every function returns a new,
//! transient view.

pub mod annotations;
pub mod charts;

pub use annotations::annotations;
pub use charts::{charts, Chart, ChartMode, Mark, Scale};

use std::collections::HashSet;

use crate::models::RegionalSeriesRow;

/// Distinct region names, in order of first appearance.
pub fn distinct_regions(rows: &[RegionalSeriesRow]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut regions = Vec::new();
    for row in rows {
        if seen.insert(row.maille_nom.as_str()) {
            regions.push(row.maille_nom.clone());
        }
    }
    regions
}

/// Rows of the selected regions, newest first within each region.
///
/// `None` selects every region, which is the dashboard's default.
pub fn filter_regions(
    rows: &[RegionalSeriesRow],
    selected: Option<&[String]>,
) -> Vec<RegionalSeriesRow> {
    let wanted: Option<HashSet<&str>> =
        selected.map(|names| names.iter().map(String::as_str).collect());

    let mut view: Vec<RegionalSeriesRow> = rows
        .iter()
        .filter(|r| {
            wanted
                .as_ref()
                .map_or(true, |w| w.contains(r.maille_nom.as_str()))
        })
        .cloned()
        .collect();

    view.sort_by(|a, b| a.maille_nom.cmp(&b.maille_nom).then(b.date.cmp(&a.date)));
    view
}

/// Split a comma-separated region list, dropping blanks.
pub fn parse_region_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(region: &str, day: u32) -> RegionalSeriesRow {
        RegionalSeriesRow {
            date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            maille_nom: region.into(),
            cas_confirmes: Some(10),
            deces: Some(1),
            delta_deces: None,
            delta_cas_confirmes: None,
            fatality_rate: Some(0.1),
            days_after_5_deaths: None,
            days_after_50_confirmed: None,
        }
    }

    fn table() -> Vec<RegionalSeriesRow> {
        vec![
            row("Bretagne", 1),
            row("Bretagne", 2),
            row("Grand Est", 1),
            row("Grand Est", 2),
            row("Occitanie", 1),
        ]
    }

    #[test]
    fn test_distinct_regions() {
        assert_eq!(distinct_regions(&table()), vec!["Bretagne", "Grand Est", "Occitanie"]);
    }

    #[test]
    fn test_filter_selects_and_orders_newest_first() {
        let selected = vec!["Grand Est".to_string(), "Bretagne".to_string()];
        let view = filter_regions(&table(), Some(selected.as_slice()));

        let keys: Vec<(&str, u32)> = view
            .iter()
            .map(|r| (r.maille_nom.as_str(), chrono::Datelike::day(&r.date)))
            .collect();
        assert_eq!(
            keys,
            vec![("Bretagne", 2), ("Bretagne", 1), ("Grand Est", 2), ("Grand Est", 1)]
        );
    }

    #[test]
    fn test_filter_by_all_regions_is_identity_up_to_order() {
        let rows = table();
        let all = distinct_regions(&rows);

        let mut view = filter_regions(&rows, Some(all.as_slice()));
        let mut expected = rows.clone();
        let key = |r: &RegionalSeriesRow| (r.maille_nom.clone(), r.date);
        view.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(view, expected);

        assert_eq!(filter_regions(&rows, None).len(), rows.len());
    }

    #[test]
    fn test_filter_does_not_touch_input() {
        let rows = table();
        let selected = vec!["Occitanie".to_string()];
        let _ = filter_regions(&rows, Some(selected.as_slice()));
        assert_eq!(rows, table());
    }

    #[test]
    fn test_empty_selection_selects_nothing() {
        let none: Vec<String> = Vec::new();
        assert!(filter_regions(&table(), Some(none.as_slice())).is_empty());
    }

    #[test]
    fn test_parse_region_list() {
        assert_eq!(
            parse_region_list("Grand Est, Île-de-France,,"),
            vec!["Grand Est", "Île-de-France"]
        );
    }
}
