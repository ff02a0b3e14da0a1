use crate::core::model::PipelineStep;
use crate::core::settings::{SettingFormat, SettingSpec, SummarySpec};
use crate::core::table::{ColumnDef, identity_columns};

/// Static description of a known pipeline tool: where it runs, how its page
/// is titled, and the column/settings/summary shapes of its metrics blob.
/// One table here replaces a hand-written view-model per tool.
pub struct ToolSchema {
    pub name: &'static str,
    pub title: &'static str,
    pub step: PipelineStep,
    pub new_tab: bool,
    pub columns: &'static [(&'static str, &'static str)],
    pub settings: &'static [SettingSpec],
    pub summary: &'static [SummarySpec],
}

const fn setting(key: &'static str, label: &'static str, format: SettingFormat) -> SettingSpec {
    SettingSpec { key, label, format }
}

/// Read-assignment categories reported by the feature counter. Shared by the
/// count table and both differential-expression tools.
const FEATURECOUNT_COLUMNS: &[(&str, &str)] = &[
    ("Assigned", "Assigned"),
    ("Unassigned_Unmapped", "Unassigned Unmapped"),
    ("Unassigned_Read_Type", "Unassigned Read Type"),
    ("Unassigned_Singleton", "Unassigned Singleton"),
    ("Unassigned_MappingQuality", "Unassigned MappingQuality"),
    ("Unassigned_Chimera", "Unassigned Chimera"),
    ("Unassigned_FragmentLength", "Unassigned FragmentLength"),
    ("Unassigned_Duplicate", "Unassigned Duplicate"),
    ("Unassigned_MultiMapping", "Unassigned MultiMapping"),
    ("Unassigned_Secondary", "Unassigned Secondary"),
    ("Unassigned_NonSplit", "Unassigned NonSplit"),
    ("Unassigned_NoFeatures", "Unassigned NoFeatures"),
    ("Unassigned_Overlapping_Length", "Unassigned Overlapping Length"),
    ("Unassigned_Ambiguity", "Unassigned Ambiguity"),
];

const TRIM_SUMMARY: &[SummarySpec] = &[
    SummarySpec {
        key: "total_reads_processed",
        label: "Total Reads Processed",
        ratio_of: None,
    },
    SummarySpec {
        key: "reads_with_adapters",
        label: "Reads With Adapters",
        ratio_of: Some("total_reads_processed"),
    },
    SummarySpec {
        key: "reads_lost_due_to_length_cutoff",
        label: "Reads Filtered Due To Length Cutoff",
        ratio_of: Some("total_reads_processed"),
    },
    SummarySpec {
        key: "reads_passing_filters",
        label: "Reads Written (Passing Filters)",
        ratio_of: Some("total_reads_processed"),
    },
    SummarySpec {
        key: "total_basepairs_processed",
        label: "Total Basepairs Processed",
        ratio_of: None,
    },
    SummarySpec {
        key: "basepairs_quality_trimmed",
        label: "Quality-Trimmed",
        ratio_of: Some("total_basepairs_processed"),
    },
    SummarySpec {
        key: "basepairs_passing_filters",
        label: "Total Written (Filtered)",
        ratio_of: Some("total_basepairs_processed"),
    },
];

pub const TOOLS: &[ToolSchema] = &[
    ToolSchema {
        name: "trim-galore",
        title: "Trim Galore",
        step: PipelineStep::Preprocessing,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("trim_galore_version", "Trim Galore Version", SettingFormat::Plain),
            setting("cutadapt_version", "Cutadapt Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("phred_score_cutoff", "Quality Phred Score Cutoff", SettingFormat::Plain),
            setting("adapter_sequence_forward", "Adapter Sequence (Forward Reads)", SettingFormat::Plain),
            setting("adapter_sequence_reverse", "Adapter Sequence (Reverse Reads)", SettingFormat::Plain),
            setting("max_trimming_error_rate", "Maximum Trimming Error Rate", SettingFormat::Plain),
            setting("min_adapter_overlap", "Minimum Required Adapter Overlap", SettingFormat::Plain),
            setting("min_sequence_length", "Minimum Required Sequence Length", SettingFormat::Plain),
            setting("additional_parameters", "Additional Trim Galore Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: TRIM_SUMMARY,
    },
    ToolSchema {
        name: "fastp",
        title: "fastp",
        step: PipelineStep::Preprocessing,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("fastp_version", "fastp Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("additional_parameters", "Additional fastp Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: TRIM_SUMMARY,
    },
    ToolSchema {
        name: "fastqc",
        title: "FastQC",
        step: PipelineStep::Premapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("fastqc_version", "FastQC Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "multiqc",
        title: "MultiQC",
        step: PipelineStep::Premapping,
        new_tab: true,
        columns: &[],
        settings: &[setting("multiqc_version", "MultiQC Version", SettingFormat::Plain)],
        summary: &[],
    },
    ToolSchema {
        name: "bowtie",
        title: "Bowtie",
        step: PipelineStep::Mapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("bowtie_version", "Bowtie Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("use_shared_memory", "Used Shared-Memory Mode (--mm)", SettingFormat::Bool),
            setting("allowed_overall_mismatches", "Allowed Overall Mismatches (-v)", SettingFormat::OmitIfSlash),
            setting("additional_parameters", "Additional Bowtie Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "bowtie2",
        title: "Bowtie2",
        step: PipelineStep::Mapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("bowtie2_version", "Bowtie2 Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("used_mapping_preset", "Used Bowtie2 Preset", SettingFormat::Quoted),
            setting("use_shared_memory", "Used Shared-Memory Mode (--mm)", SettingFormat::Bool),
            setting("additional_parameters", "Additional Bowtie2 Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "bwa-backtrack",
        title: "BWA-backtrack",
        step: PipelineStep::Mapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("bwa_version", "BWA Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("additional_parameters", "Additional BWA Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "bwa-mem",
        title: "BWA-MEM",
        step: PipelineStep::Mapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("bwa_version", "BWA Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("additional_parameters", "Additional BWA Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "bwa-mem2",
        title: "BWA-MEM2",
        step: PipelineStep::Mapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("bwa_mem2_version", "BWA-MEM2 Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("additional_parameters", "Additional BWA-MEM2 Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "bwa-sw",
        title: "BWA-SW",
        step: PipelineStep::Mapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("bwa_version", "BWA Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("additional_parameters", "Additional BWA Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "minimap2",
        title: "Minimap2",
        step: PipelineStep::Mapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("minimap2_version", "Minimap2 Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("used_preset", "Used Minimap2 Preset", SettingFormat::Quoted),
            setting("additional_parameters", "Additional Minimap2 Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "segemehl",
        title: "segemehl",
        step: PipelineStep::Mapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("segemehl_version", "segemehl Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("accuracy", "Minimum Alignment Accuracy", SettingFormat::Plain),
            setting("additional_parameters", "Additional segemehl Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "star",
        title: "STAR",
        step: PipelineStep::Mapping,
        new_tab: false,
        columns: &[],
        settings: &[
            setting("star_version", "STAR Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("reference_genome", "Reference Genome", SettingFormat::Plain),
            setting("genome_annotation", "Genome Annotation", SettingFormat::Plain),
            setting("annotation_parent_keyword", "Annotation Parent Keyword (--sjdbGTFtagExonParentGene)", SettingFormat::Plain),
            setting("annotation_id_keyword", "Annotation ID Keyword (--sjdbGTFtagExonParentTranscript)", SettingFormat::Plain),
            setting("annotation_feature_type", "Annotation Feature Type (--sjdbGTFfeatureExon)", SettingFormat::Plain),
            setting("additional_parameters", "Additional STAR Parameters", SettingFormat::QuotedOrDash),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "count-table",
        title: "Count Table",
        step: PipelineStep::Analyses,
        new_tab: false,
        columns: FEATURECOUNT_COLUMNS,
        settings: &[
            setting("featurecounts_version", "featureCounts Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("main_feature", "Counted Main Feature", SettingFormat::Plain),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "deseq2",
        title: "DGE Analysis (DESeq2)",
        step: PipelineStep::Analyses,
        new_tab: false,
        columns: FEATURECOUNT_COLUMNS,
        settings: &[
            setting("deseq2_version", "DESeq2 Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("main_feature", "Counted Main Feature", SettingFormat::Plain),
        ],
        summary: &[],
    },
    ToolSchema {
        name: "edger",
        title: "DGE Analysis (edgeR)",
        step: PipelineStep::Analyses,
        new_tab: false,
        columns: FEATURECOUNT_COLUMNS,
        settings: &[
            setting("edger_version", "edgeR Version", SettingFormat::Plain),
            setting("strategy", "Sequencing Strategy", SettingFormat::Strategy),
            setting("main_feature", "Counted Main Feature", SettingFormat::Plain),
        ],
        summary: &[],
    },
];

pub fn lookup(name: &str) -> Option<&'static ToolSchema> {
    TOOLS.iter().find(|t| t.name == name)
}

/// Page title for a module: the registered one, or a title-cased fallback
/// for modules this build does not know.
pub fn display_title(name: &str) -> String {
    match lookup(name) {
        Some(schema) => schema.title.to_string(),
        None => crate::core::settings::prettify_key(&name.replace('-', "_")),
    }
}

/// Column definitions for a module's metrics table, falling back to columns
/// derived from the data when the tool has no registered schema.
pub fn columns_for(
    schema: Option<&ToolSchema>,
    stats: &serde_json::Map<String, serde_json::Value>,
) -> Vec<ColumnDef> {
    match schema {
        Some(tool) if !tool.columns.is_empty() => {
            let mut columns = identity_columns();
            columns.extend(
                tool.columns
                    .iter()
                    .map(|(field, label)| ColumnDef::new(field, label, true)),
            );
            columns
        }
        _ => crate::core::table::MetricTable::derive_columns(stats),
    }
}
