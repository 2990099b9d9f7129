//! Chart datasets for the three dashboard modes.
//!
//! Each [`Chart`] carries the encoding (which column goes on which channel)
//! and the rows to plot, already filtered and aggregated. Drawing is left to
//! the frontend's charting library.
//!
//! | mode      | charts                                                        |
//! |-----------|---------------------------------------------------------------|
//! | `graph`   | deaths vs days after 5 deaths, cases vs days after 50 cases   |
//! | `heatmap` | daily deaths, daily new cases (≥ 0), cumulative bubbles       |
//! | `histo`   | national evolution since 03-01, mean fatality since 03-10     |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{NationalSeriesRow, RegionalSeriesRow};
use crate::transform::grouper::group_by_key;

/// First day shown on the national evolution chart.
const NATIONAL_FROM: NaiveDate = ymd(2020, 3, 1);

/// First day included in the fatality rate average.
const FATALITY_FROM: NaiveDate = ymd(2020, 3, 10);

/// Log scale domain on the outbreak-day charts.
const LOG_DOMAIN: [f64; 2] = [10.0, 5000.0];

/// Bins used for the bubble size channel.
const SIZE_BINS: u8 = 5;

/// Dashboard visualisation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    #[default]
    Graph,
    Heatmap,
    Histo,
}

/// Y axis scale of the `graph` mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

/// Scale as handed to the chart library
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScaleSpec {
    #[serde(rename = "type")]
    pub kind: Scale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    pub clamp: bool,
}

impl From<Scale> for ScaleSpec {
    fn from(kind: Scale) -> Self {
        match kind {
            Scale::Linear => ScaleSpec { kind, domain: None, clamp: false },
            Scale::Log => ScaleSpec { kind, domain: Some(LOG_DOMAIN), clamp: true },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// Line with point markers
    Line,
    Rect,
    Circle,
    Bar,
}

/// One chart: encoding plus rows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub id: &'static str,
    pub title: &'static str,
    pub mark: Mark,
    pub x: &'static str,
    pub y: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bins: Option<u8>,
    pub y_scale: ScaleSpec,
    pub tooltip: Vec<&'static str>,
    pub data: Vec<Value>,
}

impl Chart {
    fn new(id: &'static str, title: &'static str, mark: Mark, x: &'static str, y: &'static str) -> Self {
        Self {
            id,
            title,
            mark,
            x,
            y,
            color: None,
            size: None,
            size_bins: None,
            y_scale: Scale::Linear.into(),
            tooltip: Vec::new(),
            data: Vec::new(),
        }
    }

    fn color(mut self, column: &'static str) -> Self {
        self.color = Some(column);
        self
    }

    fn tooltip(mut self, columns: &[&'static str]) -> Self {
        self.tooltip = columns.to_vec();
        self
    }

    fn data(mut self, data: Vec<Value>) -> Self {
        self.data = data;
        self
    }
}

/// Charts for `mode`, built from an already region-filtered regional view.
///
/// `scale` only applies to the `graph` mode.
pub fn charts(
    mode: ChartMode,
    scale: Scale,
    regional: &[RegionalSeriesRow],
    national: &[NationalSeriesRow],
) -> Vec<Chart> {
    match mode {
        ChartMode::Graph => graph(regional, scale),
        ChartMode::Heatmap => heatmap(regional),
        ChartMode::Histo => histo(regional, national),
    }
}

fn graph(rows: &[RegionalSeriesRow], scale: Scale) -> Vec<Chart> {
    let deaths = rows
        .iter()
        .filter_map(|r| {
            let day = r.days_after_5_deaths?;
            Some(json!({ "days_after_5_deaths": day, "deces": r.deces, "maille_nom": r.maille_nom }))
        })
        .collect();

    let confirmed = rows
        .iter()
        .filter_map(|r| {
            let day = r.days_after_50_confirmed?;
            Some(json!({
                "days_after_50_confirmed": day,
                "cas_confirmes": r.cas_confirmes,
                "maille_nom": r.maille_nom,
            }))
        })
        .collect();

    let mut deaths_chart = Chart::new(
        "deaths_by_outbreak_day",
        "Décès par jour depuis le 5e décès",
        Mark::Line,
        "days_after_5_deaths",
        "deces",
    )
    .color("maille_nom")
    .tooltip(&["days_after_5_deaths", "deces", "maille_nom"])
    .data(deaths);
    deaths_chart.y_scale = scale.into();

    let mut confirmed_chart = Chart::new(
        "confirmed_by_outbreak_day",
        "Cas confirmés par jour depuis le 50e cas",
        Mark::Line,
        "days_after_50_confirmed",
        "cas_confirmes",
    )
    .color("maille_nom")
    .tooltip(&["days_after_50_confirmed", "cas_confirmes", "maille_nom"])
    .data(confirmed);
    confirmed_chart.y_scale = scale.into();

    vec![deaths_chart, confirmed_chart]
}

fn heatmap(rows: &[RegionalSeriesRow]) -> Vec<Chart> {
    let daily_deaths = rows
        .iter()
        .filter_map(|r| {
            let delta = r.delta_deces?;
            Some(json!({ "date": r.date, "maille_nom": r.maille_nom, "delta_deces": delta }))
        })
        .collect();

    let daily_confirmed = rows
        .iter()
        .filter_map(|r| {
            let delta = r.delta_cas_confirmes.filter(|d| *d >= 0)?;
            Some(json!({ "date": r.date, "maille_nom": r.maille_nom, "delta_cas_confirmes": delta }))
        })
        .collect();

    let bubbles = rows
        .iter()
        .map(|r| {
            json!({
                "date": r.date,
                "maille_nom": r.maille_nom,
                "deces": r.deces,
                "cas_confirmes": r.cas_confirmes,
            })
        })
        .collect();

    let mut bubble_chart = Chart::new(
        "cumulative_bubbles",
        "Décès et cas confirmés cumulés",
        Mark::Circle,
        "date",
        "maille_nom",
    )
    .color("deces")
    .data(bubbles);
    bubble_chart.size = Some("cas_confirmes");
    bubble_chart.size_bins = Some(SIZE_BINS);

    vec![
        Chart::new("daily_deaths_heatmap", "Nouveaux décès par jour", Mark::Rect, "date", "maille_nom")
            .color("delta_deces")
            .tooltip(&["date", "maille_nom", "delta_deces"])
            .data(daily_deaths),
        Chart::new(
            "daily_confirmed_heatmap",
            "Nouveaux cas confirmés par jour",
            Mark::Rect,
            "date",
            "maille_nom",
        )
        .color("delta_cas_confirmes")
        .tooltip(&["date", "maille_nom", "delta_cas_confirmes"])
        .data(daily_confirmed),
        bubble_chart,
    ]
}

fn histo(regional: &[RegionalSeriesRow], national: &[NationalSeriesRow]) -> Vec<Chart> {
    let evolution = national
        .iter()
        .filter(|r| r.date >= NATIONAL_FROM)
        .map(|r| json!({ "date": r.date, "type": r.metric, "nombre": r.nombre }))
        .collect();

    vec![
        Chart::new("national_evolution", "Évolution en France", Mark::Bar, "date", "nombre")
            .color("type")
            .tooltip(&["date", "type", "nombre"])
            .data(evolution),
        Chart::new(
            "fatality_rate_by_region",
            "Taux de mortalité moyen par région",
            Mark::Bar,
            "mean_fatality_rate",
            "maille_nom",
        )
        .tooltip(&["maille_nom", "mean_fatality_rate"])
        .data(
            mean_fatality_by_region(regional)
                .into_iter()
                .map(|(region, mean)| json!({ "maille_nom": region, "mean_fatality_rate": mean }))
                .collect(),
        ),
    ]
}

/// Mean fatality rate per region over rows dated on or after March 10th,
/// highest first. Undefined rates are ignored; a region with none is omitted.
pub fn mean_fatality_by_region(rows: &[RegionalSeriesRow]) -> Vec<(String, f64)> {
    let recent: Vec<&RegionalSeriesRow> =
        rows.iter().filter(|r| r.date >= FATALITY_FROM).collect();

    let mut means: Vec<(String, f64)> = group_by_key(&recent, |r| r.maille_nom.clone())
        .into_iter()
        .filter_map(|(region, group)| {
            let rates: Vec<f64> = group.iter().filter_map(|r| r.fatality_rate).collect();
            if rates.is_empty() {
                return None;
            }
            Some((region, rates.iter().sum::<f64>() / rates.len() as f64))
        })
        .collect();

    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means
}

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}
