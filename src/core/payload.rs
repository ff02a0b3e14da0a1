use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// One tool's metrics blob, the value under the module key in
/// `<module>.json`. `stats` carries either per-sample category maps or a
/// list of named comparisons.
#[derive(Debug, Default, Deserialize)]
pub struct ModuleBlob {
    #[serde(default)]
    pub stats: StatsPayload,
    #[serde(default)]
    pub paired_end: bool,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StatsPayload {
    Comparisons(Vec<Comparison>),
    PerSample(Map<String, Value>),
}

impl Default for StatsPayload {
    fn default() -> StatsPayload {
        StatsPayload::PerSample(Map::new())
    }
}

/// A named contrast with free-form summary statistics and a sparse
/// distribution used for its histogram chart.
#[derive(Debug, Deserialize)]
pub struct Comparison {
    pub comparison: String,
    #[serde(default)]
    pub distribution: Vec<BinCount>,
    #[serde(flatten)]
    pub summary: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct BinCount {
    pub bin: u32,
    pub count: f64,
}

pub fn load_module(path: &Path, name: &str) -> Result<ModuleBlob> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut root: Map<String, Value> = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    let blob = root
        .remove(name)
        .with_context(|| format!("{} has no top-level '{}' key", path.display(), name))?;
    serde_json::from_value(blob)
        .with_context(|| format!("unexpected blob shape in {}", path.display()))
}

/// Entry in the pipeline's `versions.json` module registry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionsEntry {
    pub name: String,
    pub step: String,
    #[serde(default)]
    pub primary_dependencies: Vec<Dependency>,
    #[serde(default)]
    pub secondary_dependencies: Vec<Dependency>,
}

#[derive(Debug, Deserialize)]
pub struct Dependency {
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub version: String,
}

pub fn load_versions(path: &Path) -> Result<Vec<VersionsEntry>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid module registry in {}", path.display()))
}

/// Pipeline run summary shown on the overview page. Every field is optional;
/// the page degrades instead of failing when the file is thin.
#[derive(Debug, Default, Deserialize)]
pub struct RunSummary {
    #[serde(default)]
    pub pipeline_version: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub runtime: Option<f64>,
    /// First row is the header.
    #[serde(default)]
    pub groups: Vec<Vec<String>>,
}

pub fn load_summary(path: &Path) -> Result<RunSummary> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid run summary in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_sample_blob_parses() {
        let json = r#"{
            "stats": {"s1": {"Assigned": "100", "Unassigned_Unmapped": "5"}},
            "paired_end": true,
            "settings": {"bowtie2_version": "2.5.1"}
        }"#;
        let blob: ModuleBlob = serde_json::from_str(json).unwrap();
        assert!(blob.paired_end);
        match blob.stats {
            StatsPayload::PerSample(map) => assert_eq!(map.len(), 1),
            StatsPayload::Comparisons(_) => panic!("expected per-sample stats"),
        }
    }

    #[test]
    fn comparison_blob_parses_with_flattened_summary() {
        let json = r#"{
            "stats": [{
                "comparison": "wt_vs_mut",
                "lowest_lfc": "-3.2",
                "highest_lfc": "4.1",
                "distribution": [{"bin": 1, "count": 5}, {"bin": 3, "count": 2}]
            }]
        }"#;
        let blob: ModuleBlob = serde_json::from_str(json).unwrap();
        match blob.stats {
            StatsPayload::Comparisons(comparisons) => {
                assert_eq!(comparisons[0].comparison, "wt_vs_mut");
                assert_eq!(comparisons[0].distribution.len(), 2);
                assert!(comparisons[0].summary.contains_key("lowest_lfc"));
            }
            StatsPayload::PerSample(_) => panic!("expected comparisons"),
        }
    }

    #[test]
    fn missing_fields_default() {
        let blob: ModuleBlob = serde_json::from_str("{}").unwrap();
        assert!(!blob.paired_end);
        assert!(matches!(blob.stats, StatsPayload::PerSample(_)));
    }
}
