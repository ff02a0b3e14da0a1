use crate::core::value::number_of;
use serde::Serialize;
use serde_json::{Map, Value};

/// Fields that identify a row rather than carry a metric. They are never
/// percentage-converted and never receive a chart color.
pub const IDENTITY_FIELDS: [&str; 2] = ["name", "reads"];

pub fn is_identity_field(field: &str) -> bool {
    IDENTITY_FIELDS.contains(&field)
}

#[derive(Clone, Debug, Serialize)]
pub struct ColumnDef {
    pub field: String,
    pub label: String,
    pub visible: bool,
    pub numeric: bool,
}

impl ColumnDef {
    pub fn new(field: &str, label: &str, numeric: bool) -> ColumnDef {
        ColumnDef {
            field: field.to_string(),
            label: label.to_string(),
            visible: true,
            numeric,
        }
    }

    pub fn is_identity(&self) -> bool {
        is_identity_field(&self.field)
    }
}

pub fn identity_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("name", "Sample", false),
        ColumnDef::new("reads", "Total Reads", true),
    ]
}

/// One sample's cells, keyed by column field. Serializes as a plain JSON
/// object with insertion order preserved.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct MetricRow {
    cells: Map<String, Value>,
}

impl MetricRow {
    pub fn new(name: &str) -> MetricRow {
        let mut row = MetricRow::default();
        row.set("name", Value::String(name.to_string()));
        row
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.cells.insert(field.to_string(), value);
    }

    /// NaN and infinity have no JSON representation; such cells become null
    /// and render as empty.
    pub fn set_number(&mut self, field: &str, value: f64) {
        let cell = match serde_json::Number::from_f64(value) {
            Some(n) => Value::Number(n),
            None => Value::Null,
        };
        self.set(field, cell);
    }

    pub fn name(&self) -> &str {
        match self.cells.get("name") {
            Some(Value::String(s)) => s.as_str(),
            _ => "",
        }
    }

    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.cells.get(field)
    }

    /// The cell as a raw string, only when it actually is a string. Numeric
    /// cells (such as the derived `reads`) return None here on purpose: the
    /// literal-"0" pruning test must not match them.
    pub fn raw_str(&self, field: &str) -> Option<&str> {
        match self.cells.get(field) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn number(&self, field: &str) -> f64 {
        match self.cells.get(field) {
            Some(v) => number_of(v),
            None => f64::NAN,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.cells.iter()
    }
}

#[derive(Clone, Debug)]
pub struct MetricTable {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<MetricRow>,
}

impl MetricTable {
    /// Builds the absolute view from a per-sample stats map. Rows are ordered
    /// by sample name; `reads` is summed over every non-identity category the
    /// sample actually carries, before any pruning or percentage conversion.
    /// A malformed cell poisons that row's total with NaN.
    pub fn build(stats: &Map<String, Value>, columns: Vec<ColumnDef>) -> MetricTable {
        let mut samples: Vec<&String> = stats.keys().collect();
        samples.sort();

        let mut rows = Vec::with_capacity(samples.len());
        for sample in samples {
            let categories = stats.get(sample.as_str()).and_then(Value::as_object);
            let mut row = MetricRow::new(sample);

            let mut reads = 0.0f64;
            if let Some(categories) = categories {
                for (field, value) in categories {
                    if !is_identity_field(field) {
                        reads += number_of(value);
                    }
                }
            }
            row.set_number("reads", reads);

            for col in &columns {
                if col.is_identity() {
                    continue;
                }
                if let Some(value) = categories.and_then(|c| c.get(&col.field)) {
                    row.set(&col.field, value.clone());
                }
            }
            rows.push(row);
        }

        MetricTable { columns, rows }
    }

    /// Column schema derived from the data itself: identity columns first,
    /// then every category in first-seen order across the sorted samples.
    pub fn derive_columns(stats: &Map<String, Value>) -> Vec<ColumnDef> {
        let mut samples: Vec<&String> = stats.keys().collect();
        samples.sort();

        let mut columns = identity_columns();
        for sample in samples {
            if let Some(categories) = stats.get(sample.as_str()).and_then(Value::as_object) {
                for field in categories.keys() {
                    if is_identity_field(field)
                        || columns.iter().any(|c| &c.field == field)
                    {
                        continue;
                    }
                    columns.push(ColumnDef::new(field, &field.replace('_', " "), true));
                }
            }
        }
        columns
    }

    /// Hides every column whose raw value is the literal string "0" in all
    /// rows. String comparison only: "0.0" is not zero and a numeric 0 cell
    /// is not zero either. The pass only ever hides, so it is idempotent.
    pub fn prune_zero_columns(&mut self) {
        for col in &mut self.columns {
            if col.is_identity() {
                continue;
            }
            let all_zero = self
                .rows
                .iter()
                .all(|row| row.raw_str(&col.field) == Some("0"));
            if all_zero {
                col.visible = false;
            }
        }
    }

    /// Percentage view. Identity columns pass through unchanged; every other
    /// cell becomes raw/reads*100 fixed to two decimals. Column visibility is
    /// the absolute table's decision and is reused as-is. Rows whose `reads`
    /// is zero or NaN get null cells and still render.
    pub fn to_relative(&self) -> MetricTable {
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let reads = row.number("reads");
            let mut out = MetricRow::default();
            for (field, value) in row.cells() {
                if is_identity_field(field) {
                    out.set(field, value.clone());
                } else {
                    let pct = number_of(value) / reads * 100.0;
                    if pct.is_finite() {
                        out.set(field, Value::String(format!("{pct:.2}")));
                    } else {
                        out.set(field, Value::Null);
                    }
                }
            }
            rows.push(out);
        }
        MetricTable {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.visible)
    }

    /// Visible metric columns, i.e. the ones that take part in charting.
    pub fn visible_value_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns
            .iter()
            .filter(|c| c.visible && !c.is_identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats(entries: &[(&str, Value)]) -> Map<String, Value> {
        let mut map = Map::new();
        for (name, cats) in entries {
            map.insert(name.to_string(), cats.clone());
        }
        map
    }

    fn sample_table() -> MetricTable {
        let data = stats(&[
            (
                "s2",
                json!({"assigned": "800", "unmapped": "200", "ambiguous": "0"}),
            ),
            (
                "s1",
                json!({"assigned": "300", "unmapped": "100", "ambiguous": "0"}),
            ),
        ]);
        let columns = MetricTable::derive_columns(&data);
        MetricTable::build(&data, columns)
    }

    #[test]
    fn rows_sorted_by_sample_name() {
        let table = sample_table();
        let names: Vec<&str> = table.rows.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["s1", "s2"]);
    }

    #[test]
    fn reads_is_sum_of_all_categories() {
        let table = sample_table();
        assert_eq!(table.rows[0].number("reads"), 400.0);
        assert_eq!(table.rows[1].number("reads"), 1000.0);
    }

    #[test]
    fn malformed_cell_poisons_row_total() {
        let data = stats(&[("s1", json!({"assigned": "ten", "unmapped": "5"}))]);
        let columns = MetricTable::derive_columns(&data);
        let table = MetricTable::build(&data, columns);
        assert!(table.rows[0].number("reads").is_nan());
        // NaN has no JSON form, so the cell is null.
        assert_eq!(table.rows[0].raw("reads"), Some(&Value::Null));
    }

    #[test]
    fn prune_hides_literal_zero_columns_only() {
        let mut table = sample_table();
        table.prune_zero_columns();
        let visible: Vec<&str> = table
            .visible_columns()
            .map(|c| c.field.as_str())
            .collect();
        assert_eq!(visible, ["name", "reads", "assigned", "unmapped"]);
    }

    #[test]
    fn prune_does_not_treat_zero_point_zero_as_zero() {
        let data = stats(&[("s1", json!({"a": "0.0", "b": "0"}))]);
        let columns = MetricTable::derive_columns(&data);
        let mut table = MetricTable::build(&data, columns);
        table.prune_zero_columns();
        let a = table.columns.iter().find(|c| c.field == "a").unwrap();
        let b = table.columns.iter().find(|c| c.field == "b").unwrap();
        assert!(a.visible);
        assert!(!b.visible);
    }

    #[test]
    fn prune_missing_cell_is_not_zero() {
        let data = stats(&[
            ("s1", json!({"a": "0"})),
            ("s2", json!({"a": "0", "b": "0"})),
        ]);
        let columns = MetricTable::derive_columns(&data);
        let mut table = MetricTable::build(&data, columns);
        table.prune_zero_columns();
        // "b" is absent from s1, so it stays visible; "a" is all-"0".
        let a = table.columns.iter().find(|c| c.field == "a").unwrap();
        let b = table.columns.iter().find(|c| c.field == "b").unwrap();
        assert!(!a.visible);
        assert!(b.visible);
    }

    #[test]
    fn prune_is_idempotent() {
        let mut table = sample_table();
        table.prune_zero_columns();
        let first: Vec<bool> = table.columns.iter().map(|c| c.visible).collect();
        table.prune_zero_columns();
        let second: Vec<bool> = table.columns.iter().map(|c| c.visible).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn relative_values_sum_to_roughly_hundred() {
        let mut table = sample_table();
        table.prune_zero_columns();
        let relative = table.to_relative();
        for row in &relative.rows {
            let sum: f64 = relative
                .visible_value_columns()
                .map(|c| row.number(&c.field))
                .sum();
            assert!((sum - 100.0).abs() < 0.5, "sum was {sum}");
        }
    }

    #[test]
    fn relative_passes_identity_columns_through() {
        let table = sample_table();
        let relative = table.to_relative();
        assert_eq!(relative.rows[0].name(), "s1");
        assert_eq!(relative.rows[0].number("reads"), 400.0);
    }

    #[test]
    fn relative_with_zero_reads_renders_null_cells() {
        let data = stats(&[("s1", json!({"a": "0", "b": "0"}))]);
        let columns = MetricTable::derive_columns(&data);
        let table = MetricTable::build(&data, columns);
        let relative = table.to_relative();
        assert_eq!(relative.rows[0].raw("a"), Some(&Value::Null));
        assert_eq!(relative.rows[0].raw("b"), Some(&Value::Null));
    }

    #[test]
    fn visibility_is_shared_between_views() {
        let mut table = sample_table();
        table.prune_zero_columns();
        let relative = table.to_relative();
        let abs: Vec<bool> = table.columns.iter().map(|c| c.visible).collect();
        let rel: Vec<bool> = relative.columns.iter().map(|c| c.visible).collect();
        assert_eq!(abs, rel);
    }
}
