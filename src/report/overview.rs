use crate::core::model::PipelineStep;
use crate::core::navigation::NavigationTree;
use crate::core::payload::{RunSummary, VersionsEntry};
use crate::core::schema;
use crate::core::settings::{KeyValueRow, prettify_key};
use crate::report::html::{escape, page_foot, page_head, write_file};
use crate::report::{html, navbar};
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

fn fmt_runtime(seconds: f64) -> String {
    if seconds > 3600.0 {
        format!("{:.1} h", seconds / 3600.0)
    } else {
        format!("{:.1} min", seconds / 60.0)
    }
}

/// Writes the overview page: run summary, sample groups, and the tools used
/// in each pipeline step.
pub fn write(
    path: &Path,
    summary: &RunSummary,
    versions: &[VersionsEntry],
    nav: &NavigationTree,
) -> Result<()> {
    let mut out = String::with_capacity(32 * 1024);
    page_head(&mut out, "Pipeline Report")?;
    navbar::write(&mut out, nav, "modules/", "index.html")?;
    writeln!(out, "<main class=\"main\">")?;
    writeln!(out, "<h1>Pipeline Report</h1>")?;

    writeln!(out, "<h2 id=\"summary\">Summary</h2>")?;
    let mut rows = Vec::new();
    if let Some(version) = &summary.pipeline_version {
        rows.push(KeyValueRow {
            key: "Pipeline Version".to_string(),
            value: version.clone(),
        });
    }
    if let Some(user) = &summary.user {
        rows.push(KeyValueRow {
            key: "User".to_string(),
            value: user.clone(),
        });
    }
    if let Some(date) = &summary.date {
        rows.push(KeyValueRow {
            key: "Execution Date".to_string(),
            value: date.clone(),
        });
    }
    if let Some(runtime) = summary.runtime {
        rows.push(KeyValueRow {
            key: "Runtime".to_string(),
            value: fmt_runtime(runtime),
        });
    }
    if rows.is_empty() {
        writeln!(out, "<p>No run summary was provided.</p>")?;
    } else {
        html::kv_table(&mut out, &rows)?;
    }

    if let Some((header, body)) = summary.groups.split_first() {
        writeln!(out, "<h2 id=\"groups\">Groups</h2>")?;
        writeln!(out, "<table class=\"table\">")?;
        write!(out, "<tr>")?;
        for cell in header {
            write!(out, "<th>{}</th>", escape(&prettify_key(cell)))?;
        }
        writeln!(out, "</tr>")?;
        for row in body {
            write!(out, "<tr>")?;
            for cell in row {
                write!(out, "<td>{}</td>", escape(cell))?;
            }
            writeln!(out, "</tr>")?;
        }
        writeln!(out, "</table>")?;
    }

    writeln!(out, "<h2 id=\"tools-used\">Tools Used</h2>")?;
    for step in PipelineStep::ALL {
        let in_step: Vec<&VersionsEntry> = versions
            .iter()
            .filter(|v| PipelineStep::parse(&v.step) == Some(step))
            .collect();
        if in_step.is_empty() {
            continue;
        }
        writeln!(out, "<h3>{}</h3>", step.display_name())?;
        for module in in_step {
            writeln!(
                out,
                "<details><summary>{}</summary>",
                escape(&schema::display_title(&module.name))
            )?;
            if module.primary_dependencies.is_empty() {
                writeln!(out, "<p>No recorded tool versions.</p>")?;
            } else {
                writeln!(out, "<table class=\"kv-table\">")?;
                writeln!(out, "<tr><th>Tool</th><th>Version</th></tr>")?;
                for dep in &module.primary_dependencies {
                    writeln!(
                        out,
                        "<tr><td>{}</td><td>{}</td></tr>",
                        escape(&dep.tool),
                        escape(&dep.version)
                    )?;
                }
                writeln!(out, "</table>")?;
            }
            if !module.secondary_dependencies.is_empty() {
                writeln!(
                    out,
                    "<details><summary>All dependencies ({})</summary>",
                    module.secondary_dependencies.len()
                )?;
                writeln!(out, "<table class=\"kv-table\">")?;
                writeln!(out, "<tr><th>Tool</th><th>Version</th></tr>")?;
                for dep in &module.secondary_dependencies {
                    writeln!(
                        out,
                        "<tr><td>{}</td><td>{}</td></tr>",
                        escape(&dep.tool),
                        escape(&dep.version)
                    )?;
                }
                writeln!(out, "</table>")?;
                writeln!(out, "</details>")?;
            }
            writeln!(out, "</details>")?;
        }
    }

    writeln!(out, "</main>")?;
    page_foot(&mut out)?;
    write_file(path, &out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_formats_hours_and_minutes() {
        assert_eq!(fmt_runtime(7200.0), "2.0 h");
        assert_eq!(fmt_runtime(90.0), "1.5 min");
    }
}
