use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PipelineStep {
    Preprocessing,
    Premapping,
    Mapping,
    Analyses,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 4] = [
        PipelineStep::Preprocessing,
        PipelineStep::Premapping,
        PipelineStep::Mapping,
        PipelineStep::Analyses,
    ];

    pub fn parse(s: &str) -> Option<PipelineStep> {
        match s {
            "preprocessing" => Some(PipelineStep::Preprocessing),
            "premapping" => Some(PipelineStep::Premapping),
            "mapping" => Some(PipelineStep::Mapping),
            // Older pipeline configs write the singular form.
            "analyses" | "analysis" => Some(PipelineStep::Analyses),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStep::Preprocessing => "preprocessing",
            PipelineStep::Premapping => "premapping",
            PipelineStep::Mapping => "mapping",
            PipelineStep::Analyses => "analyses",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PipelineStep::Preprocessing => "Preprocessing",
            PipelineStep::Premapping => "Premapping",
            PipelineStep::Mapping => "Mapping",
            PipelineStep::Analyses => "Analyses",
        }
    }

    pub fn index(self) -> usize {
        match self {
            PipelineStep::Preprocessing => 0,
            PipelineStep::Premapping => 1,
            PipelineStep::Mapping => 2,
            PipelineStep::Analyses => 3,
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_both_analysis_spellings() {
        assert_eq!(PipelineStep::parse("analysis"), Some(PipelineStep::Analyses));
        assert_eq!(PipelineStep::parse("analyses"), Some(PipelineStep::Analyses));
        assert_eq!(PipelineStep::parse("postprocessing"), None);
    }
}
