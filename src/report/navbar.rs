use crate::core::model::PipelineStep;
use crate::core::navigation::NavigationTree;
use crate::report::html::escape;
use anyhow::Result;
use std::fmt::Write as FmtWrite;

/// Writes the shared navigation bar: an Overview link plus one dropdown per
/// pipeline step that actually has pages. `modules_path` is the prefix from
/// the current page to the module pages, `main_html` the path to the
/// overview page.
pub fn write(out: &mut String, nav: &NavigationTree, modules_path: &str, main_html: &str) -> Result<()> {
    writeln!(out, "<nav class=\"navbar\">")?;
    writeln!(
        out,
        "<div class=\"nav-item dropdown\"><a href=\"{}\">Overview</a><div class=\"dropdown-menu\">",
        main_html
    )?;
    writeln!(
        out,
        "<a href=\"{}#summary\">Pipeline Summary</a><a href=\"{}#groups\">Groups</a><a href=\"{}#tools-used\">Tools Used</a>",
        main_html, main_html, main_html
    )?;
    writeln!(out, "</div></div>")?;

    for step in PipelineStep::ALL {
        if !nav.has_page(step) {
            continue;
        }
        writeln!(
            out,
            "<div class=\"nav-item dropdown\"><a>{}</a><div class=\"dropdown-menu\">",
            step.display_name()
        )?;
        for entry in nav.entries(step) {
            if entry.new_tab {
                writeln!(
                    out,
                    "<a href=\"{}{}\" target=\"_blank\" rel=\"noopener noreferrer\">{} &#8599;</a>",
                    modules_path,
                    entry.page,
                    escape(&entry.title)
                )?;
            } else {
                writeln!(
                    out,
                    "<a href=\"{}{}\">{}</a>",
                    modules_path,
                    entry.page,
                    escape(&entry.title)
                )?;
            }
        }
        writeln!(out, "</div></div>")?;
    }
    writeln!(out, "</nav>")?;
    Ok(())
}
