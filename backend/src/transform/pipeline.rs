//! High-level pipeline API: fetch, parse, transform.
//!
//! # Example
//!
//! ```rust,ignore
//! use covidviz::{load_dashboard, DataLoader, DEFAULT_DATA_URL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = DataLoader::new();
//!     let data = load_dashboard(&loader, DEFAULT_DATA_URL).await?;
//!     println!("{} regions, {} national rows", data.regions.len(), data.national.len());
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Serialize;

use super::checks::{check_national, check_regional};
use super::national::{is_national, national_series};
use super::regional::{is_regional, regional_series};
use crate::api::logs::{log_error, log_info, log_success, Stage};
use crate::error::{PipelineResult, TransformResult};
use crate::loader::{load_file, CsvSource, DataLoader};
use crate::models::{NationalSeriesRow, RawTable, RegionalSeriesRow};
use crate::view::distinct_regions;

/// Both derived tables plus the region list that feeds the region filter.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub regional: Vec<RegionalSeriesRow>,
    pub national: Vec<NationalSeriesRow>,
    pub regions: Vec<String>,
    pub source: SourceInfo,
}

/// Where the data came from and how it parsed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub origin: String,
    pub encoding: String,
    pub delimiter: char,
    pub row_count: usize,
    pub skipped_rows: usize,
    pub columns: Vec<String>,
}

/// Derive the regional and national tables from a raw table.
///
/// Pure: the input is never modified and every call recomputes both tables.
pub fn transform(
    raw: &RawTable,
) -> TransformResult<(Vec<RegionalSeriesRow>, Vec<NationalSeriesRow>)> {
    let national = national_series(raw);
    check_national(&national, raw.records.iter().filter(|r| is_national(r)).count())?;

    let regional = regional_series(raw);
    check_regional(&regional, raw.records.iter().filter(|r| is_regional(r)).count())?;

    Ok((regional, national))
}

/// Fetch `url` through the loader's cache and build fresh dashboard tables.
pub async fn load_dashboard<S: CsvSource>(
    loader: &DataLoader<S>,
    url: &str,
) -> PipelineResult<DashboardData> {
    let raw = loader.fetch(url).await?;
    build_dashboard(&raw, url)
}

/// Same as [`load_dashboard`] for a local CSV file.
pub async fn load_dashboard_file(path: &Path) -> PipelineResult<DashboardData> {
    let raw = load_file(path).await?;
    build_dashboard(&raw, &path.display().to_string())
}

/// Transform an already-parsed table.
pub fn build_dashboard(raw: &RawTable, origin: &str) -> PipelineResult<DashboardData> {
    log_info(Stage::Transform, format!("Transforming {} rows...", raw.len()));

    let (regional, national) = transform(raw).map_err(|e| {
        log_error(Stage::Transform, e.to_string());
        e
    })?;
    let regions = distinct_regions(&regional);

    log_success(
        Stage::Transform,
        format!(
            "{} national rows, {} regional rows across {} regions",
            national.len(),
            regional.len(),
            regions.len()
        ),
    );

    Ok(DashboardData {
        regional,
        national,
        regions,
        source: SourceInfo {
            origin: origin.to_string(),
            encoding: raw.encoding.clone(),
            delimiter: raw.delimiter,
            row_count: raw.len(),
            skipped_rows: raw.skipped.len(),
            columns: raw.headers.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes_auto;

    const BODY: &str = "\
date,granularite,maille_code,maille_nom,cas_confirmes,deces,reanimation,source_type
2020-03-01,pays,FRA,France,130,2,9,sante-publique-france
2020-03-02,pays,FRA,France,191,3,,sante-publique-france
2020-03-01,region,REG-44,Grand Est,40,0,,agences-regionales-sante
2020-03-02,region,REG-44,Grand Est,60,2,,agences-regionales-sante
2020-03-03,region,REG-44,Grand Est,90,6,,agences-regionales-sante
2020-03-04,region,REG-44,Grand Est,150,9,,agences-regionales-sante
2020-03-02,region,REG-53,Bretagne,0,0,,agences-regionales-sante
2020-03-01,region,REG-53,Bretagne,0,0,,agences-regionales-sante
2020-03-01,departement,DEP-67,Bas-Rhin,20,0,,agences-regionales-sante
";

    fn raw() -> RawTable {
        parse_bytes_auto(BODY.as_bytes()).unwrap()
    }

    #[test]
    fn test_transform_end_to_end() {
        let (regional, national) = transform(&raw()).unwrap();

        assert_eq!(national.len(), 6);
        assert_eq!(regional.len(), 6);

        // Bretagne sorts before Grand Est
        assert_eq!(regional[0].maille_nom, "Bretagne");
        assert_eq!(regional[0].fatality_rate, None);
        assert_eq!(regional[2].maille_nom, "Grand Est");
        assert_eq!(regional[2].delta_deces, None);
        assert_eq!(regional[4].days_after_5_deaths, Some(1));
    }

    #[test]
    fn test_transform_is_pure() {
        let raw = raw();
        let first = transform(&raw).unwrap();
        let second = transform(&raw).unwrap();
        assert_eq!(first, second);
        assert_eq!(raw.len(), 9);
    }

    #[test]
    fn test_build_dashboard_lists_regions() {
        let data = build_dashboard(&raw(), "memory").unwrap();

        assert_eq!(data.regions, vec!["Bretagne", "Grand Est"]);
        assert_eq!(data.source.row_count, 9);
        assert_eq!(data.source.origin, "memory");
    }

    #[test]
    fn test_empty_table_transforms_to_empty_tables() {
        let (regional, national) = transform(&RawTable::default()).unwrap();
        assert!(regional.is_empty());
        assert!(national.is_empty());
    }
}
