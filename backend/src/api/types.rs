//! REST API types for the dashboard frontend.
//!
//! Query parameters mirror the dashboard sidebar: visualisation mode,
//! region multi-select, raw-table toggle, analysis toggle and log scale.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::RegionalSeriesRow;
use crate::transform::pipeline::{DashboardData, SourceInfo};
use crate::view::annotations::Annotation;
use crate::view::{annotations, charts, filter_regions, parse_region_list, Chart, ChartMode, Scale};

/// `GET /api/dashboard` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub mode: ChartMode,
    #[serde(default)]
    pub scale: Scale,
    /// Comma-separated region names; absent selects all
    pub regions: Option<String>,
    /// Include the filtered regional rows
    #[serde(default)]
    pub table: bool,
    /// Include narrative annotations
    #[serde(default)]
    pub analysis: bool,
}

/// `GET /api/regional` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionQuery {
    pub regions: Option<String>,
}

impl RegionQuery {
    pub fn selection(&self) -> Option<Vec<String>> {
        self.regions.as_deref().map(parse_region_list)
    }
}

/// Everything the dashboard page needs for one render
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Unique identifier of this render
    pub load_id: String,
    pub status: String,
    pub mode: ChartMode,
    pub scale: Scale,
    /// All regions, for populating the filter
    pub regions: Vec<String>,
    /// Regions actually shown
    pub selected: Vec<String>,
    pub charts: Vec<Chart>,
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<RegionalSeriesRow>>,
    pub source: SourceInfo,
}

impl DashboardResponse {
    pub fn build(data: &DashboardData, query: &DashboardQuery) -> Self {
        let selected = query
            .regions
            .as_deref()
            .map(parse_region_list)
            .unwrap_or_else(|| data.regions.clone());

        let view = filter_regions(&data.regional, Some(selected.as_slice()));
        let charts = charts(query.mode, query.scale, &view, &data.national);

        DashboardResponse {
            load_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            mode: query.mode,
            scale: query.scale,
            regions: data.regions.clone(),
            selected,
            charts,
            annotations: if query.analysis {
                annotations(query.mode).to_vec()
            } else {
                Vec::new()
            },
            table: query.table.then_some(view),
            source: data.source.clone(),
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "loadId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "charts": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes_auto;
    use crate::transform::pipeline::build_dashboard;

    const BODY: &str = "\
date,granularite,maille_nom,cas_confirmes,deces,reanimation,source_type
2020-03-10,pays,France,1784,33,86,sante-publique-france
2020-03-10,region,Grand Est,400,6,,agences-regionales-sante
2020-03-11,region,Grand Est,500,9,,agences-regionales-sante
2020-03-10,region,Bretagne,60,1,,agences-regionales-sante
";

    fn data() -> DashboardData {
        build_dashboard(&parse_bytes_auto(BODY.as_bytes()).unwrap(), "memory").unwrap()
    }

    #[test]
    fn test_default_query_selects_all_regions() {
        let response = DashboardResponse::build(&data(), &DashboardQuery::default());

        assert_eq!(response.mode, ChartMode::Graph);
        assert_eq!(response.selected, vec!["Bretagne", "Grand Est"]);
        assert_eq!(response.charts.len(), 2);
        assert!(response.annotations.is_empty());
        assert!(response.table.is_none());
    }

    #[test]
    fn test_region_selection_and_table() {
        let query = DashboardQuery {
            mode: ChartMode::Histo,
            regions: Some("Grand Est".into()),
            table: true,
            analysis: true,
            ..DashboardQuery::default()
        };
        let response = DashboardResponse::build(&data(), &query);

        let table = response.table.unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|r| r.maille_nom == "Grand Est"));
        assert_eq!(response.annotations.len(), 2);
        assert_eq!(response.regions.len(), 2);
    }

    #[test]
    fn test_response_json_shape() {
        let response = DashboardResponse::build(&data(), &DashboardQuery::default());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "ready");
        assert_eq!(json["mode"], "graph");
        assert_eq!(json["scale"], "linear");
        assert!(json.get("table").is_none());
        assert_eq!(json["source"]["rowCount"], 4);
    }

    #[test]
    fn test_error_response() {
        let json = error_response("Network error: boom");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Network error: boom");
    }

    #[test]
    fn test_region_query_selection() {
        assert_eq!(RegionQuery::default().selection(), None);
        let query = RegionQuery { regions: Some("Corse,Bretagne".into()) };
        assert_eq!(query.selection(), Some(vec!["Corse".to_string(), "Bretagne".to_string()]));
    }
}
