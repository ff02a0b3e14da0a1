use crate::core::table::MetricTable;
use log::warn;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};

/// Stacked-bar palette. One entry per visible metric column; the ordinal is
/// counted over visible non-identity columns only, so colors stay stable
/// across rebuilds of the same table.
pub const STACK_PALETTE: [&str; 14] = [
    "rgba(0,160,250,1)",
    "rgba(10,155,75,1)",
    "rgba(255,130,95,1)",
    "rgba(250,120,250,1)",
    "rgba(160,250,130,1)",
    "rgba(170,10,60,1)",
    "rgba(0,110,130,1)",
    "rgba(234,214,68,1)",
    "rgba(130,20,160,1)",
    "rgba(20,210,220,1)",
    "rgba(0,90,200,1)",
    "rgba(250,230,130,1)",
    "rgba(0,0,0,1)",
    "rgba(125,125,125,1)",
];

/// Base-composition palette: A, C, G, T, other.
pub const BASE_PALETTE: [&str; 5] = [
    "rgba(0,114,178,1)",
    "rgba(204,121,167,1)",
    "rgba(0,158,115,1)",
    "rgba(213,94,0,1)",
    "rgba(0,0,0,1)",
];

#[derive(Clone, Debug, Serialize)]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    #[serde(rename = "backgroundColor")]
    pub background_color: Vec<&'static str>,
    #[serde(rename = "borderColor", skip_serializing_if = "Vec::is_empty")]
    pub border_color: Vec<&'static str>,
    #[serde(rename = "borderWidth", skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A chart configuration in the schema the embedded chart runtime expects.
#[derive(Clone, Debug, Serialize)]
pub struct ChartPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: Value,
}

/// One dataset per visible metric column, values row-by-row in table order.
pub fn stacked_series(table: &MetricTable) -> Vec<Dataset> {
    let visible: Vec<_> = table.visible_value_columns().collect();
    if visible.len() > STACK_PALETTE.len() {
        warn!(
            "{} chart series exceed the {}-color palette; colors will repeat",
            visible.len(),
            STACK_PALETTE.len()
        );
    }
    visible
        .iter()
        .enumerate()
        .map(|(ordinal, col)| {
            let color = STACK_PALETTE[ordinal % STACK_PALETTE.len()];
            let data: Vec<f64> = table.rows.iter().map(|r| r.number(&col.field)).collect();
            let n = data.len();
            Dataset {
                label: Some(col.label.clone()),
                data,
                background_color: vec![color; n],
                border_color: vec![color; n],
                border_width: Some(2),
            }
        })
        .collect()
}

/// Stacked bar chart over a metric table. In percent mode the value axis is
/// capped at 100.
pub fn stacked_chart(table: &MetricTable, percent: bool) -> ChartPayload {
    let labels = table.rows.iter().map(|r| r.name().to_string()).collect();
    let mut options = json!({
        "responsive": true,
        "plugins": {
            "legend": {"position": "bottom"}
        },
        "scales": {
            "x": {"stacked": true},
            "y": {"stacked": true, "beginAtZero": true}
        }
    });
    if percent {
        options["scales"]["y"]["max"] = json!(100);
    }
    ChartPayload {
        kind: "bar",
        data: ChartData {
            labels,
            datasets: stacked_series(table),
        },
        options,
    }
}

/// Gap-fills a sparse (bin, count) list into a dense series over 1..=max_bin.
/// Duplicate bins are last-write-wins; both duplicates and out-of-range bins
/// are data-integrity findings and get logged.
pub fn histogram(sparse: &[(u32, f64)], max_bin: u32) -> Vec<f64> {
    let mut dense = vec![0.0f64; max_bin as usize];
    let mut seen = vec![false; max_bin as usize];
    for &(bin, count) in sparse {
        if bin < 1 || bin > max_bin {
            warn!("histogram bin {bin} outside 1..={max_bin}, dropped");
            continue;
        }
        let idx = (bin - 1) as usize;
        if seen[idx] {
            warn!("duplicate histogram bin {bin}, keeping the later count");
        }
        seen[idx] = true;
        dense[idx] = count;
    }
    dense
}

pub fn histogram_chart(
    sparse: &[(u32, f64)],
    max_bin: u32,
    x_label: &str,
    y_label: &str,
) -> ChartPayload {
    let data = histogram(sparse, max_bin);
    let labels = (1..=max_bin).map(|b| b.to_string()).collect();
    let n = data.len();
    ChartPayload {
        kind: "bar",
        data: ChartData {
            labels,
            datasets: vec![Dataset {
                label: None,
                data,
                background_color: vec![STACK_PALETTE[0]; n],
                border_color: Vec::new(),
                border_width: None,
            }],
        },
        options: json!({
            "responsive": true,
            "plugins": {
                "legend": {"display": false}
            },
            "scales": {
                "x": {"title": {"display": true, "text": x_label}},
                "y": {"title": {"display": true, "text": y_label}, "beginAtZero": true}
            }
        }),
    }
}

/// Direct 1:1 category chart over the fixed base-composition palette.
pub fn pie_chart(labels: Vec<String>, values: Vec<f64>) -> ChartPayload {
    let colors = (0..values.len())
        .map(|i| BASE_PALETTE[i % BASE_PALETTE.len()])
        .collect();
    ChartPayload {
        kind: "pie",
        data: ChartData {
            labels,
            datasets: vec![Dataset {
                label: None,
                data: values,
                background_color: colors,
                border_color: Vec::new(),
                border_width: None,
            }],
        },
        options: json!({
            "responsive": true,
            "plugins": {
                "legend": {"position": "bottom"}
            }
        }),
    }
}

/// Chart payloads keyed by their page target. Rebinding a target first drops
/// whatever was bound there, so repeated rebuilds never stack up instances;
/// binding to a target the page never registered is a logged no-op.
#[derive(Default)]
pub struct ChartBindings {
    order: Vec<String>,
    targets: HashSet<String>,
    charts: HashMap<String, ChartPayload>,
}

impl ChartBindings {
    pub fn new() -> ChartBindings {
        ChartBindings::default()
    }

    pub fn register_target(&mut self, id: &str) {
        if self.targets.insert(id.to_string()) {
            self.order.push(id.to_string());
        }
    }

    pub fn bind(&mut self, id: &str, chart: ChartPayload) -> bool {
        if !self.targets.contains(id) {
            warn!("chart target '{id}' does not exist, skipping rebuild");
            return false;
        }
        self.charts.insert(id.to_string(), chart);
        true
    }

    pub fn get(&self, id: &str) -> Option<&ChartPayload> {
        self.charts.get(id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Bound charts in target registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChartPayload)> {
        self.order
            .iter()
            .filter_map(|id| self.charts.get(id).map(|c| (id.as_str(), c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::MetricTable;
    use serde_json::{Map, json};

    fn table() -> MetricTable {
        // "zeroed" comes first and gets pruned, so it must not shift the
        // colors of the columns behind it.
        let mut stats = Map::new();
        stats.insert(
            "s1".to_string(),
            json!({"zeroed": "0", "assigned": "90", "unmapped": "10"}),
        );
        let columns = MetricTable::derive_columns(&stats);
        let mut table = MetricTable::build(&stats, columns);
        table.prune_zero_columns();
        table
    }

    #[test]
    fn series_skip_identity_and_hidden_columns() {
        let datasets = stacked_series(&table());
        let labels: Vec<_> = datasets.iter().filter_map(|d| d.label.as_deref()).collect();
        assert_eq!(labels, ["assigned", "unmapped"]);
    }

    #[test]
    fn colors_follow_visible_ordinal() {
        let datasets = stacked_series(&table());
        assert_eq!(datasets[0].background_color[0], STACK_PALETTE[0]);
        assert_eq!(datasets[1].background_color[0], STACK_PALETTE[1]);
    }

    #[test]
    fn colors_are_stable_across_rebuilds() {
        let t = table();
        let first: Vec<_> = stacked_series(&t)
            .into_iter()
            .map(|d| d.background_color[0])
            .collect();
        let second: Vec<_> = stacked_series(&t)
            .into_iter()
            .map(|d| d.background_color[0])
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn percent_mode_caps_value_axis() {
        let chart = stacked_chart(&table(), true);
        assert_eq!(chart.options["scales"]["y"]["max"], json!(100));
        let absolute = stacked_chart(&table(), false);
        assert!(absolute.options["scales"]["y"]["max"].is_null());
    }

    #[test]
    fn histogram_gap_fills() {
        assert_eq!(histogram(&[(1, 5.0), (3, 2.0)], 3), vec![5.0, 0.0, 2.0]);
    }

    #[test]
    fn histogram_duplicate_bin_is_last_write_wins() {
        assert_eq!(histogram(&[(2, 1.0), (2, 7.0)], 2), vec![0.0, 7.0]);
    }

    #[test]
    fn histogram_ignores_out_of_range_bins() {
        assert_eq!(histogram(&[(0, 4.0), (5, 9.0)], 3), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn pie_uses_fixed_palette() {
        let chart = pie_chart(
            vec!["A".into(), "C".into(), "G".into(), "T".into(), "None/Other".into()],
            vec![25.0, 25.0, 25.0, 20.0, 5.0],
        );
        assert_eq!(chart.data.datasets[0].background_color.len(), 5);
        assert_eq!(chart.data.datasets[0].background_color[0], BASE_PALETTE[0]);
        assert_eq!(chart.data.datasets[0].background_color[4], BASE_PALETTE[4]);
    }

    #[test]
    fn rebinding_a_target_keeps_exactly_one_chart() {
        let mut bindings = ChartBindings::new();
        bindings.register_target("dist");
        assert!(bindings.bind("dist", histogram_chart(&[(1, 1.0)], 1, "x", "y")));
        assert!(bindings.bind("dist", histogram_chart(&[(1, 2.0)], 1, "x", "y")));
        assert_eq!(bindings.len(), 1);
        let chart = bindings.get("dist").unwrap();
        assert_eq!(chart.data.datasets[0].data, vec![2.0]);
    }

    #[test]
    fn binding_unknown_target_is_a_no_op() {
        let mut bindings = ChartBindings::new();
        assert!(!bindings.bind("ghost", pie_chart(vec![], vec![])));
        assert!(bindings.is_empty());
    }
}
