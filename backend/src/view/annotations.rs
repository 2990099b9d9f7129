//! Narrative notes shown next to the charts when analysis is enabled.

use serde::Serialize;

use super::charts::ChartMode;

/// A note attached to one chart of a mode
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Chart the note sits above
    pub chart_id: &'static str,
    pub text: &'static str,
}

const GRAPH: &[Annotation] = &[Annotation {
    chart_id: "deaths_by_outbreak_day",
    text: "[03/22] Les régions Grand-Est, Ile-de-France et Haut-de-France sont les plus touchées \
           par l'épidémie. Par ailleurs l'affichage en échelle Log nous montre que l'ensemble des \
           régions suivent la même croissance en terme d'évolution.",
}];

const HEATMAP: &[Annotation] = &[Annotation {
    chart_id: "daily_deaths_heatmap",
    text: "[03/22] Les régions Grand-Est, Ile-de-France et Haut-de-France ont été les premières \
           touchées par l'épidémie.",
}];

const HISTO: &[Annotation] = &[
    Annotation {
        chart_id: "national_evolution",
        text: "[03/22] Évolution par jour du nombre de cas, de réanimation et de décès. \
               Chaque jour, les valeurs augmentent.",
    },
    Annotation {
        chart_id: "fatality_rate_by_region",
        text: "[03/22] Le graphique ci-dessous estime le taux de mortalité de l'épidémie Covid-19 \
               dans les différentes régions de France. Cette valeur dépend du nombre de tests et \
               par conséquent surestime le véritable taux de mortalité de l'épidémie.",
    },
];

/// Notes for every chart of `mode` that has one.
pub fn annotations(mode: ChartMode) -> &'static [Annotation] {
    match mode {
        ChartMode::Graph => GRAPH,
        ChartMode::Heatmap => HEATMAP,
        ChartMode::Histo => HISTO,
    }
}
