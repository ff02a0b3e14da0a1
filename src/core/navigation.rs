use crate::core::model::PipelineStep;

/// A module as registered by the pipeline: where it ran, what to call it,
/// and whether a report page was generated for it.
#[derive(Clone, Debug)]
pub struct ModuleEntry {
    pub name: String,
    pub title: String,
    pub step: PipelineStep,
    pub page: Option<String>,
    pub new_tab: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavEntry {
    pub title: String,
    pub page: String,
    pub new_tab: bool,
}

#[derive(Clone, Debug, Default)]
pub struct StepMenu {
    pub entries: Vec<NavEntry>,
    pub has_page: bool,
}

/// Dropdown menus for the fixed pipeline steps. Modules without a page are
/// filtered out; the rest sort case-insensitively by title with ties kept in
/// registry order. `has_page` tells the renderer whether to show a step's
/// menu at all.
#[derive(Clone, Debug)]
pub struct NavigationTree {
    steps: [StepMenu; 4],
}

impl NavigationTree {
    pub fn build(registry: &[ModuleEntry]) -> NavigationTree {
        let mut steps: [StepMenu; 4] = std::array::from_fn(|_| StepMenu::default());
        for step in PipelineStep::ALL {
            let menu = &mut steps[step.index()];
            for module in registry.iter().filter(|m| m.step == step) {
                if let Some(page) = &module.page {
                    menu.has_page = true;
                    menu.entries.push(NavEntry {
                        title: module.title.clone(),
                        page: page.clone(),
                        new_tab: module.new_tab,
                    });
                }
            }
            // sort_by is stable, so equal titles keep registry order.
            menu.entries
                .sort_by(|a, b| a.title.to_uppercase().cmp(&b.title.to_uppercase()));
        }
        NavigationTree { steps }
    }

    pub fn entries(&self, step: PipelineStep) -> &[NavEntry] {
        &self.steps[step.index()].entries
    }

    pub fn has_page(&self, step: PipelineStep) -> bool {
        self.steps[step.index()].has_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str, step: PipelineStep, page: bool) -> ModuleEntry {
        ModuleEntry {
            name: name.to_string(),
            title: name.to_string(),
            step,
            page: page.then(|| format!("{name}.html")),
            new_tab: false,
        }
    }

    #[test]
    fn sorts_case_insensitively() {
        let registry = vec![
            module("bWA", PipelineStep::Mapping, true),
            module("Bowtie", PipelineStep::Mapping, true),
            module("alpha", PipelineStep::Mapping, true),
        ];
        let tree = NavigationTree::build(&registry);
        let titles: Vec<&str> = tree
            .entries(PipelineStep::Mapping)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, ["alpha", "Bowtie", "bWA"]);
    }

    #[test]
    fn ties_keep_registry_order() {
        let mut first = module("star", PipelineStep::Mapping, true);
        first.page = Some("star-1.html".to_string());
        let mut second = module("STAR", PipelineStep::Mapping, true);
        second.page = Some("star-2.html".to_string());
        let tree = NavigationTree::build(&[first, second]);
        let pages: Vec<&str> = tree
            .entries(PipelineStep::Mapping)
            .iter()
            .map(|e| e.page.as_str())
            .collect();
        assert_eq!(pages, ["star-1.html", "star-2.html"]);
    }

    #[test]
    fn modules_without_pages_are_dropped() {
        let registry = vec![
            module("fastqc", PipelineStep::Premapping, true),
            module("multiqc", PipelineStep::Premapping, false),
        ];
        let tree = NavigationTree::build(&registry);
        assert_eq!(tree.entries(PipelineStep::Premapping).len(), 1);
    }

    #[test]
    fn has_page_reflects_each_step_independently() {
        let registry = vec![
            module("fastqc", PipelineStep::Premapping, true),
            module("bowtie2", PipelineStep::Mapping, false),
        ];
        let tree = NavigationTree::build(&registry);
        assert!(tree.has_page(PipelineStep::Premapping));
        assert!(!tree.has_page(PipelineStep::Mapping));
        assert!(!tree.has_page(PipelineStep::Preprocessing));
    }
}
