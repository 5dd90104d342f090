pub mod columns;
pub mod diagnosis;
pub mod options;
pub mod report;
pub mod source;

pub use diagnosis::DiagnosisGroup;
pub use options::{EvaluateOptions, PipelineOptions, UnmappedPolicy};
pub use report::{PipelineReport, Stage, StageReport, UnmappedValues};
pub use source::SourceTable;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes() {
        let mut report = PipelineReport::default();
        report.stages.push(StageReport {
            stage: Stage::MortalityExclusion,
            rows_in: 10,
            rows_out: 8,
            subjects_in: 4,
            subjects_out: 3,
            duration_ms: 2,
        });
        report.record_unmapped("religion", "PAGAN", 2);
        let json = serde_json::to_string(&report).expect("serialize report");
        assert!(json.contains("\"stage\":\"mortality_exclusion\""));
        assert!(json.contains("\"PAGAN\":2"));
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let options: PipelineOptions = toml::from_str("").expect("parse empty toml");
        assert_eq!(options, PipelineOptions::default());
        assert_eq!(options.first_visit_keys, vec!["subject_id".to_string()]);
        assert_eq!(options.unmapped_policy, UnmappedPolicy::CatchAll);
    }
}
