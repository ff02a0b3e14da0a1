use crate::core::value::ratio;
use serde::Serialize;
use serde_json::{Map, Value};

/// How a raw setting value is presented in the key/value table.
#[derive(Clone, Copy, Debug)]
pub enum SettingFormat {
    /// Value verbatim; the row is dropped when the key is missing.
    Plain,
    /// Value wrapped in quotes; dropped when missing.
    Quoted,
    /// "true" becomes "True", anything else "False".
    Bool,
    /// Quoted when non-empty, "-" otherwise.
    QuotedOrDash,
    /// Derived from the paired-end flag, not from the settings map.
    Strategy,
    /// Dropped when missing or set to the "/" placeholder.
    OmitIfSlash,
}

#[derive(Clone, Copy, Debug)]
pub struct SettingSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub format: SettingFormat,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeyValueRow {
    pub key: String,
    pub value: String,
}

fn value_str(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Builds the per-tool settings table from a label/format spec list. Rows
/// whose value is absent are omitted entirely rather than rendered empty.
pub fn settings_table(
    specs: &[SettingSpec],
    settings: &Map<String, Value>,
    paired_end: bool,
) -> Vec<KeyValueRow> {
    let mut rows = Vec::new();
    for spec in specs {
        let raw = value_str(settings, spec.key);
        let value = match spec.format {
            SettingFormat::Plain => raw,
            SettingFormat::Quoted => raw.map(|v| format!("\"{v}\"")),
            SettingFormat::Bool => Some(
                if raw.as_deref() == Some("true") {
                    "True"
                } else {
                    "False"
                }
                .to_string(),
            ),
            SettingFormat::QuotedOrDash => Some(match raw {
                Some(v) if !v.is_empty() => format!("\"{v}\""),
                _ => "-".to_string(),
            }),
            SettingFormat::Strategy => Some(
                if paired_end {
                    "Paired-End"
                } else {
                    "Single-End"
                }
                .to_string(),
            ),
            SettingFormat::OmitIfSlash => raw.filter(|v| v != "/"),
        };
        if let Some(value) = value {
            rows.push(KeyValueRow {
                key: spec.label.to_string(),
                value,
            });
        }
    }
    rows
}

#[derive(Clone, Copy, Debug)]
pub struct SummarySpec {
    pub key: &'static str,
    pub label: &'static str,
    /// When set, the value is shown as "count (pct%)" against this base key.
    pub ratio_of: Option<&'static str>,
}

/// Summary rows in the "12,345 (93.2%)" style. Rows whose key is missing are
/// skipped so optional metrics simply disappear from the table.
pub fn summary_table(specs: &[SummarySpec], data: &Map<String, Value>) -> Vec<KeyValueRow> {
    let mut rows = Vec::new();
    for spec in specs {
        let Some(value) = value_str(data, spec.key) else {
            continue;
        };
        let display = match spec.ratio_of.and_then(|base| value_str(data, base)) {
            Some(base) => format!("{value} ({}%)", ratio(&value, &base, 1)),
            None => value,
        };
        rows.push(KeyValueRow {
            key: spec.label.to_string(),
            value: display,
        });
    }
    rows
}

/// Generic key/value rows for maps without a spec list, e.g. comparison
/// summary statistics. Keys are prettified, nested values skipped.
pub fn generic_rows(data: &Map<String, Value>) -> Vec<KeyValueRow> {
    let mut rows = Vec::new();
    for (key, value) in data {
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        rows.push(KeyValueRow {
            key: prettify_key(key),
            value,
        });
    }
    rows
}

/// "lowest_lfc_name" -> "Lowest Lfc Name".
pub fn prettify_key(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(entries: &[(&str, Value)]) -> Map<String, Value> {
        let mut m = Map::new();
        for (k, v) in entries {
            m.insert(k.to_string(), v.clone());
        }
        m
    }

    #[test]
    fn settings_formats() {
        let specs = [
            SettingSpec {
                key: "version",
                label: "Version",
                format: SettingFormat::Plain,
            },
            SettingSpec {
                key: "strategy",
                label: "Sequencing Strategy",
                format: SettingFormat::Strategy,
            },
            SettingSpec {
                key: "preset",
                label: "Preset",
                format: SettingFormat::Quoted,
            },
            SettingSpec {
                key: "shared_memory",
                label: "Shared Memory",
                format: SettingFormat::Bool,
            },
            SettingSpec {
                key: "additional",
                label: "Additional Parameters",
                format: SettingFormat::QuotedOrDash,
            },
        ];
        let settings = map(&[
            ("version", json!("2.5.1")),
            ("preset", json!("very-sensitive")),
            ("shared_memory", json!("true")),
            ("additional", json!("")),
        ]);
        let rows = settings_table(&specs, &settings, true);
        let values: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(
            values,
            ["2.5.1", "Paired-End", "\"very-sensitive\"", "True", "-"]
        );
    }

    #[test]
    fn missing_plain_setting_drops_the_row() {
        let specs = [SettingSpec {
            key: "version",
            label: "Version",
            format: SettingFormat::Plain,
        }];
        assert!(settings_table(&specs, &Map::new(), false).is_empty());
    }

    #[test]
    fn slash_placeholder_drops_the_row() {
        let specs = [SettingSpec {
            key: "mismatches",
            label: "Allowed Mismatches",
            format: SettingFormat::OmitIfSlash,
        }];
        let present = map(&[("mismatches", json!("3"))]);
        let slash = map(&[("mismatches", json!("/"))]);
        assert_eq!(settings_table(&specs, &present, false).len(), 1);
        assert!(settings_table(&specs, &slash, false).is_empty());
    }

    #[test]
    fn summary_composes_ratio() {
        let specs = [
            SummarySpec {
                key: "total",
                label: "Total Reads Processed",
                ratio_of: None,
            },
            SummarySpec {
                key: "with_adapters",
                label: "Reads With Adapters",
                ratio_of: Some("total"),
            },
            SummarySpec {
                key: "length_filtered",
                label: "Reads Filtered By Length",
                ratio_of: Some("total"),
            },
        ];
        let data = map(&[
            ("total", json!("2,000")),
            ("with_adapters", json!("500")),
        ]);
        let rows = summary_table(&specs, &data);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, "2,000");
        assert_eq!(rows[1].value, "500 (25.0%)");
    }

    #[test]
    fn prettify_splits_underscores() {
        assert_eq!(prettify_key("lowest_lfc_name"), "Lowest Lfc Name");
        assert_eq!(prettify_key("comparison"), "Comparison");
    }
}
