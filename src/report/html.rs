use crate::core::chart::{self, ChartBindings};
use crate::core::navigation::NavigationTree;
use crate::core::payload::{Comparison, ModuleBlob, StatsPayload};
use crate::core::schema::{self, ToolSchema};
use crate::core::selector::PagedSelector;
use crate::core::settings::{self, KeyValueRow};
use crate::core::table::MetricTable;
use crate::core::value::number_of;
use crate::report::navbar;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cell text for the HTML table. Null cells (NaN upstream) render empty,
/// whole numbers lose their trailing ".0".
fn fmt_cell(value: &Value) -> String {
    match value {
        Value::String(s) => escape(s),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 9e15 => format!("{}", f as i64),
            Some(f) => format!("{f}"),
            None => String::new(),
        },
        _ => String::new(),
    }
}

pub fn page_head(out: &mut String, title: &str) -> Result<()> {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(out, "<title>{}</title>", escape(title))?;
    writeln!(
        out,
        "<script src=\"https://cdn.jsdelivr.net/npm/chart.js@4\"></script>"
    )?;
    writeln!(out, "<style>")?;
    writeln!(
        out,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:0;background:#eee;color:#222;}}"
    )?;
    writeln!(
        out,
        ".navbar{{display:flex;gap:4px;background:#fff;border-bottom:1px solid #ddd;padding:6px 16px;position:sticky;top:0;}}"
    )?;
    writeln!(
        out,
        ".nav-item{{position:relative;padding:6px 10px;}} .nav-item>a{{color:#003366;text-decoration:none;cursor:pointer;}}"
    )?;
    writeln!(
        out,
        ".dropdown-menu{{display:none;position:absolute;left:0;top:100%;background:#fff;border:1px solid #ddd;min-width:220px;z-index:10;}}"
    )?;
    writeln!(
        out,
        ".dropdown:hover .dropdown-menu{{display:block;}} .dropdown-menu a{{display:block;padding:6px 12px;color:#003366;text-decoration:none;}}"
    )?;
    writeln!(out, ".dropdown-menu a:hover{{background:#f0f4f8;}}")?;
    writeln!(
        out,
        ".main{{max-width:1100px;margin:16px auto;background:#fff;border:1px solid #ddd;border-radius:4px;padding:16px 20px;}}"
    )?;
    writeln!(out, "h1{{margin:0 0 8px 0;font-size:22px;}}")?;
    writeln!(out, "h2{{margin:20px 0 6px 0;font-size:18px;}}")?;
    writeln!(
        out,
        ".table{{border-collapse:collapse;width:100%;font-size:12px;margin:8px 0;}}"
    )?;
    writeln!(
        out,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 6px;text-align:right;}}"
    )?;
    writeln!(
        out,
        ".table th:first-child,.table td:first-child{{text-align:left;}}"
    )?;
    writeln!(
        out,
        ".kv-table{{border-collapse:collapse;font-size:12px;margin:8px 0;min-width:420px;}}"
    )?;
    writeln!(
        out,
        ".kv-table th{{background:#3b6ea5;color:#fff;text-align:left;padding:4px 6px;border:1px solid #2f5a86;}}"
    )?;
    writeln!(
        out,
        ".kv-table td{{border:1px solid #ddd;padding:4px 6px;text-align:left;}}"
    )?;
    writeln!(out, ".plot{{max-width:900px;margin:8px 0;}}")?;
    writeln!(out, ".hidden{{display:none;}}")?;
    writeln!(
        out,
        ".tabs{{display:flex;gap:4px;margin:8px 0;}} .tabs button{{padding:4px 10px;border:1px solid #ccc;background:#f6f6f6;cursor:pointer;}}"
    )?;
    writeln!(out, ".tabs button.active{{background:#3b6ea5;color:#fff;}}")?;
    writeln!(out, "details{{margin:6px 0 18px 0;}}")?;
    writeln!(out, "</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    Ok(())
}

pub fn page_foot(out: &mut String) -> Result<()> {
    writeln!(out, "</body></html>")?;
    Ok(())
}

pub fn write_file(path: &Path, html: &str) -> Result<()> {
    let mut w = BufWriter::new(
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    w.write_all(html.as_bytes())?;
    Ok(())
}

pub fn kv_table(out: &mut String, rows: &[KeyValueRow]) -> Result<()> {
    writeln!(out, "<table class=\"kv-table\">")?;
    writeln!(out, "<tr><th>Key</th><th>Value</th></tr>")?;
    for row in rows {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(&row.key),
            escape(&row.value)
        )?;
    }
    writeln!(out, "</table>")?;
    Ok(())
}

fn metric_table(out: &mut String, table: &MetricTable, css_id: &str) -> Result<()> {
    writeln!(out, "<table class=\"table\" id=\"{css_id}\">")?;
    write!(out, "<tr>")?;
    for col in table.visible_columns() {
        write!(out, "<th>{}</th>", escape(&col.label))?;
    }
    writeln!(out, "</tr>")?;
    for row in &table.rows {
        write!(out, "<tr>")?;
        for col in table.visible_columns() {
            let cell = row.raw(&col.field).map(fmt_cell).unwrap_or_default();
            write!(out, "<td>{cell}</td>")?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")?;
    Ok(())
}

/// Embeds the bound chart payloads plus the hookup that instantiates them.
/// Rebuilding a target destroys the previous instance first, so toggling
/// views never leaks chart objects.
fn chart_script(out: &mut String, bindings: &ChartBindings) -> Result<()> {
    if bindings.is_empty() {
        return Ok(());
    }
    writeln!(out, "<script>")?;
    writeln!(out, "const CHARTS = {{")?;
    for (id, payload) in bindings.iter() {
        let json = serde_json::to_string(payload)
            .with_context(|| format!("failed to serialize chart '{id}'"))?;
        writeln!(out, "\"{id}\": {json},")?;
    }
    writeln!(out, "}};")?;
    writeln!(out, "const INSTANCES = {{}};")?;
    writeln!(
        out,
        "function buildChart(id){{const el=document.getElementById(id);if(!el)return;if(INSTANCES[id]!==undefined)INSTANCES[id].destroy();INSTANCES[id]=new Chart(el,CHARTS[id]);}}"
    )?;
    writeln!(out, "Object.keys(CHARTS).forEach(buildChart);")?;
    writeln!(
        out,
        "document.querySelectorAll('[data-toggle]').forEach(box=>{{box.addEventListener('change',()=>{{document.getElementById(box.dataset.show).classList.toggle('hidden',!box.checked);document.getElementById(box.dataset.hide).classList.toggle('hidden',box.checked);}});}});"
    )?;
    writeln!(
        out,
        "document.querySelectorAll('.tabs button').forEach(btn=>{{btn.addEventListener('click',()=>{{const tabs=btn.closest('.tabs');tabs.querySelectorAll('button').forEach(b=>b.classList.remove('active'));btn.classList.add('active');document.querySelectorAll(tabs.dataset.panels+' > div').forEach((panel,i)=>{{panel.classList.toggle('hidden',String(i)!==btn.dataset.index);}});}});}});"
    )?;
    writeln!(out, "</script>")?;
    Ok(())
}

/// Writes one tool module's page: metric tables in absolute and percentage
/// form, per-tool settings, and the chart payloads for the embedded runtime.
pub fn write_module(path: &Path, name: &str, blob: &ModuleBlob, nav: &NavigationTree) -> Result<()> {
    let schema = schema::lookup(name);
    let title = schema::display_title(name);

    let mut html = String::with_capacity(64 * 1024);
    page_head(&mut html, &title)?;
    navbar::write(&mut html, nav, "", "../index.html")?;
    writeln!(html, "<main class=\"main\" id=\"{name}\">")?;
    writeln!(html, "<h1>{}</h1>", escape(&title))?;

    match &blob.stats {
        StatsPayload::PerSample(stats) if is_flat(stats) => {
            per_sample_section(&mut html, name, schema, stats)?;
        }
        StatsPayload::PerSample(stats) => {
            strand_section(&mut html, name, schema, stats, blob.paired_end)?;
        }
        StatsPayload::Comparisons(comparisons) => {
            comparison_section(&mut html, name, comparisons)?;
        }
    }

    settings_section(&mut html, schema, blob)?;
    writeln!(html, "</main>")?;
    page_foot(&mut html)?;
    write_file(path, &html)
}

fn settings_section(out: &mut String, schema: Option<&ToolSchema>, blob: &ModuleBlob) -> Result<()> {
    let rows = match schema {
        Some(tool) if !tool.settings.is_empty() => {
            settings::settings_table(tool.settings, &blob.settings, blob.paired_end)
        }
        _ => settings::generic_rows(&blob.settings),
    };
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(out, "<h2 id=\"settings\">Settings</h2>")?;
    kv_table(out, &rows)
}

fn per_sample_section(
    out: &mut String,
    name: &str,
    schema: Option<&ToolSchema>,
    stats: &Map<String, Value>,
) -> Result<()> {
    if stats.is_empty() {
        return Ok(());
    }
    let columns = schema::columns_for(schema, stats);
    let mut table = MetricTable::build(stats, columns);
    table.prune_zero_columns();
    let relative = table.to_relative();

    let mut bindings = ChartBindings::new();
    let abs_id = format!("{name}_stacked");
    let pct_id = format!("{name}_stacked_pct");
    bindings.register_target(&abs_id);
    bindings.register_target(&pct_id);
    bindings.bind(&abs_id, chart::stacked_chart(&table, false));
    bindings.bind(&pct_id, chart::stacked_chart(&relative, true));

    writeln!(out, "<h2 id=\"statistics\">Statistics</h2>")?;
    writeln!(
        out,
        "<label><input type=\"checkbox\" data-toggle data-show=\"{name}_pct_view\" data-hide=\"{name}_abs_view\"/> Show percentages</label>"
    )?;
    writeln!(out, "<div id=\"{name}_abs_view\">")?;
    metric_table(out, &table, &format!("{name}_table"))?;
    writeln!(out, "<div class=\"plot\"><canvas id=\"{abs_id}\"></canvas></div>")?;
    writeln!(out, "</div>")?;
    writeln!(out, "<div id=\"{name}_pct_view\" class=\"hidden\">")?;
    metric_table(out, &relative, &format!("{name}_table_pct"))?;
    writeln!(out, "<div class=\"plot\"><canvas id=\"{pct_id}\"></canvas></div>")?;
    writeln!(out, "</div>")?;

    // Per-sample summaries in the "count (pct%)" style, for tools that
    // report totals per sample instead of plain category counts.
    if let Some(tool) = schema {
        if !tool.summary.is_empty() {
            let mut wrote_header = false;
            for row in &table.rows {
                let Some(sample) = stats.get(row.name()).and_then(Value::as_object) else {
                    continue;
                };
                let rows = settings::summary_table(tool.summary, sample);
                if rows.is_empty() {
                    continue;
                }
                if !wrote_header {
                    writeln!(out, "<h2 id=\"summary\">Summary</h2>")?;
                    wrote_header = true;
                }
                writeln!(out, "<details><summary>{}</summary>", escape(row.name()))?;
                kv_table(out, &rows)?;
                writeln!(out, "</details>")?;
            }
        }
    }

    chart_script(out, &bindings)
}

/// Category maps are "flat" when every cell is a scalar. Trimming tools
/// instead nest per-strand submaps under each sample; those get the strand
/// layout below instead of a metrics table.
fn is_flat(stats: &Map<String, Value>) -> bool {
    stats.values().all(|sample| {
        sample
            .as_object()
            .map(|cats| cats.values().all(|v| !v.is_object() && !v.is_array()))
            .unwrap_or(false)
    })
}

struct StrandCharts {
    pie_target: Option<String>,
    pie_values: Vec<f64>,
    removed_target: Option<String>,
    removed: Vec<(u32, f64)>,
}

const BASE_KEYS: [&str; 5] = ["A", "C", "G", "T", "none/other"];
const BASE_LABELS: [&str; 5] = ["A", "C", "G", "T", "None/Other"];

fn strand_charts(name: &str, index: usize, strand: &str, data: &Map<String, Value>) -> StrandCharts {
    let pie_values: Vec<f64> = data
        .get("bases_preceding_adapter")
        .and_then(Value::as_object)
        .map(|bases| {
            BASE_KEYS
                .iter()
                .map(|key| bases.get(*key).map(number_of).unwrap_or(f64::NAN))
                .collect()
        })
        .unwrap_or_default();
    let removed: Vec<(u32, f64)> = data
        .get("removed_sequences")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(Value::as_object)
                .filter_map(|row| {
                    let length = row.get("length").map(number_of)?;
                    let count = row.get("count").map(number_of)?;
                    if length.is_finite() {
                        Some((length as u32, count))
                    } else {
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    StrandCharts {
        pie_target: (!pie_values.is_empty())
            .then(|| format!("{name}_bases_{index}_{strand}")),
        pie_values,
        removed_target: (!removed.is_empty())
            .then(|| format!("{name}_removed_{index}_{strand}")),
        removed,
    }
}

/// Per-sample layout for trimming tools: strand-keyed submaps with summary
/// statistics, a base-composition pie and a removed-sequence histogram. The
/// selector walks the samples and rebuilds each one's charts, the same path
/// the sample menu takes interactively.
fn strand_section(
    out: &mut String,
    name: &str,
    schema: Option<&ToolSchema>,
    stats: &Map<String, Value>,
    paired_end: bool,
) -> Result<()> {
    if stats.is_empty() {
        return Ok(());
    }
    let mut samples: Vec<&String> = stats.keys().collect();
    samples.sort();
    let strands: &[&'static str] = if paired_end {
        &["Forward", "Reverse"]
    } else {
        &["Forward"]
    };

    let mut per_sample: Vec<Vec<StrandCharts>> = Vec::with_capacity(samples.len());
    for (i, sample) in samples.iter().enumerate() {
        let mut charts = Vec::new();
        if let Some(categories) = stats.get(sample.as_str()).and_then(Value::as_object) {
            for strand in strands {
                if let Some(data) = categories.get(*strand).and_then(Value::as_object) {
                    charts.push(strand_charts(name, i, strand, data));
                }
            }
        }
        per_sample.push(charts);
    }

    let bindings = Rc::new(RefCell::new(ChartBindings::new()));
    for charts in &per_sample {
        for chart in charts {
            if let Some(target) = &chart.pie_target {
                bindings.borrow_mut().register_target(target);
            }
            if let Some(target) = &chart.removed_target {
                bindings.borrow_mut().register_target(target);
            }
        }
    }

    let mut selector = PagedSelector::new();
    selector.set_keys(samples.iter().map(|s| s.to_string()).collect());
    let charts_ref = Rc::clone(&bindings);
    selector.on_change(move |i| {
        for strand in &per_sample[i] {
            if let Some(target) = &strand.pie_target {
                charts_ref.borrow_mut().bind(
                    target,
                    chart::pie_chart(
                        BASE_LABELS.iter().map(|l| l.to_string()).collect(),
                        strand.pie_values.clone(),
                    ),
                );
            }
            if let Some(target) = &strand.removed_target {
                let max_bin = strand.removed.iter().map(|p| p.0).max().unwrap_or(0);
                charts_ref.borrow_mut().bind(
                    target,
                    chart::histogram_chart(&strand.removed, max_bin, "Length", "Count"),
                );
            }
        }
    });
    selector.prime();
    for i in 1..selector.keys().len() {
        selector.set_active(i);
    }

    writeln!(out, "<h2 id=\"samples\">Samples</h2>")?;
    writeln!(out, "<div class=\"tabs\" data-panels=\"#{name}_panels\">")?;
    for (i, sample) in samples.iter().enumerate() {
        let class = if i == 0 { " class=\"active\"" } else { "" };
        writeln!(out, "<button{class} data-index=\"{i}\">{}</button>", escape(sample))?;
    }
    writeln!(out, "</div>")?;
    writeln!(out, "<div id=\"{name}_panels\">")?;
    for (i, sample) in samples.iter().enumerate() {
        let class = if i == 0 { "" } else { " class=\"hidden\"" };
        writeln!(out, "<div{class}>")?;
        let categories = stats.get(sample.as_str()).and_then(Value::as_object);

        if let Some(parameters) = categories
            .and_then(|c| c.get("Runtime Parameters"))
            .and_then(Value::as_object)
        {
            let rows = settings::generic_rows(parameters);
            if !rows.is_empty() {
                writeln!(out, "<h3>Runtime Parameters</h3>")?;
                kv_table(out, &rows)?;
            }
        }

        for strand in strands {
            let Some(data) = categories
                .and_then(|c| c.get(*strand))
                .and_then(Value::as_object)
            else {
                continue;
            };
            if paired_end {
                writeln!(out, "<h3>{strand} Reads</h3>")?;
            }
            if let Some(tool) = schema {
                let rows = settings::summary_table(tool.summary, data);
                if !rows.is_empty() {
                    kv_table(out, &rows)?;
                }
            }
            if data.contains_key("bases_preceding_adapter") {
                writeln!(
                    out,
                    "<div class=\"plot\"><canvas id=\"{name}_bases_{i}_{strand}\"></canvas></div>"
                )?;
            }
            if data.contains_key("removed_sequences") {
                writeln!(
                    out,
                    "<div class=\"plot\"><canvas id=\"{name}_removed_{i}_{strand}\"></canvas></div>"
                )?;
            }
        }
        writeln!(out, "</div>")?;
    }
    writeln!(out, "</div>")?;

    chart_script(out, &bindings.borrow())
}

fn comparison_section(out: &mut String, name: &str, comparisons: &[Comparison]) -> Result<()> {
    if comparisons.is_empty() {
        return Ok(());
    }

    // Tabs are ordered by comparison name; panels follow the same order so
    // tab index N always addresses panel N.
    let mut ordered: Vec<&Comparison> = comparisons.iter().collect();
    ordered.sort_by(|a, b| a.comparison.cmp(&b.comparison));

    let bindings = Rc::new(RefCell::new(ChartBindings::new()));
    for i in 0..ordered.len() {
        bindings
            .borrow_mut()
            .register_target(&format!("{name}_distribution_{i}"));
    }

    // The selector drives one chart rebuild per activated comparison, the
    // same path an interactive tab switch takes.
    let sparse: Vec<Vec<(u32, f64)>> = ordered
        .iter()
        .map(|c| c.distribution.iter().map(|b| (b.bin, b.count)).collect())
        .collect();
    let mut selector = PagedSelector::new();
    selector.set_keys(ordered.iter().map(|c| c.comparison.clone()).collect());
    let charts = Rc::clone(&bindings);
    let prefix = name.to_string();
    selector.on_change(move |i| {
        let pairs = &sparse[i];
        let max_bin = pairs.iter().map(|p| p.0).max().unwrap_or(0);
        charts.borrow_mut().bind(
            &format!("{prefix}_distribution_{i}"),
            chart::histogram_chart(pairs, max_bin, "Log2 Fold Change", "Features"),
        );
    });
    selector.prime();
    for i in 1..selector.keys().len() {
        selector.set_active(i);
    }

    writeln!(out, "<h2 id=\"comparisons\">Comparisons</h2>")?;
    writeln!(out, "<div class=\"tabs\" data-panels=\"#{name}_panels\">")?;
    for (i, comparison) in ordered.iter().enumerate() {
        let class = if i == 0 { " class=\"active\"" } else { "" };
        writeln!(
            out,
            "<button{class} data-index=\"{i}\">{}</button>",
            escape(&comparison.comparison)
        )?;
    }
    writeln!(out, "</div>")?;
    writeln!(out, "<div id=\"{name}_panels\">")?;
    for (i, comparison) in ordered.iter().enumerate() {
        let class = if i == 0 { "" } else { " class=\"hidden\"" };
        writeln!(out, "<div{class}>")?;
        let rows = settings::generic_rows(&comparison.summary);
        if !rows.is_empty() {
            kv_table(out, &rows)?;
        }
        if !comparison.distribution.is_empty() {
            writeln!(
                out,
                "<div class=\"plot\"><canvas id=\"{name}_distribution_{i}\"></canvas></div>"
            )?;
        }
        writeln!(out, "</div>")?;
    }
    writeln!(out, "</div>")?;

    chart_script(out, &bindings.borrow())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape("a<b&\"c\">"), "a&lt;b&amp;&quot;c&quot;&gt;");
    }

    #[test]
    fn fmt_cell_renders_null_as_empty() {
        assert_eq!(fmt_cell(&Value::Null), "");
        assert_eq!(fmt_cell(&serde_json::json!(1200.0)), "1200");
        assert_eq!(fmt_cell(&serde_json::json!(12.5)), "12.5");
        assert_eq!(fmt_cell(&Value::String("7,000".into())), "7,000");
    }
}
