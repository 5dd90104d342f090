//! Diagnosis groups derived from ICD-9 code ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the twenty canonical diagnosis groups.
///
/// Seventeen groups cover the numeric ICD-9 chapters; the last three collect
/// the letter-prefixed supplemental, external-cause and morphology codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosisGroup {
    ParasiticDisease,
    Neoplasm,
    Endocrine,
    Blood,
    MentalDisorder,
    NervousSystem,
    CirculatorySystem,
    RespiratorySystem,
    DigestiveSystem,
    GenitourinarySystem,
    Pregnancy,
    Skin,
    Musculoskeletal,
    CongenitalAnomalies,
    Perinatal,
    IllDefined,
    InjuryPoison,
    SupplementalFactors,
    ExternalCauseInjPoison,
    MorphologyOfNeoplasms,
}

impl DiagnosisGroup {
    pub const ALL: [DiagnosisGroup; 20] = [
        DiagnosisGroup::ParasiticDisease,
        DiagnosisGroup::Neoplasm,
        DiagnosisGroup::Endocrine,
        DiagnosisGroup::Blood,
        DiagnosisGroup::MentalDisorder,
        DiagnosisGroup::NervousSystem,
        DiagnosisGroup::CirculatorySystem,
        DiagnosisGroup::RespiratorySystem,
        DiagnosisGroup::DigestiveSystem,
        DiagnosisGroup::GenitourinarySystem,
        DiagnosisGroup::Pregnancy,
        DiagnosisGroup::Skin,
        DiagnosisGroup::Musculoskeletal,
        DiagnosisGroup::CongenitalAnomalies,
        DiagnosisGroup::Perinatal,
        DiagnosisGroup::IllDefined,
        DiagnosisGroup::InjuryPoison,
        DiagnosisGroup::SupplementalFactors,
        DiagnosisGroup::ExternalCauseInjPoison,
        DiagnosisGroup::MorphologyOfNeoplasms,
    ];

    /// Label written to the `diagnoses` column.
    pub fn label(self) -> &'static str {
        match self {
            DiagnosisGroup::ParasiticDisease => "Parasitic_Disease",
            DiagnosisGroup::Neoplasm => "Neoplasm",
            DiagnosisGroup::Endocrine => "Endocrine",
            DiagnosisGroup::Blood => "Blood",
            DiagnosisGroup::MentalDisorder => "Mental_Disorder",
            DiagnosisGroup::NervousSystem => "Nervous_System",
            DiagnosisGroup::CirculatorySystem => "Circulatory_System",
            DiagnosisGroup::RespiratorySystem => "Respiratory_System",
            DiagnosisGroup::DigestiveSystem => "Digestive_System",
            DiagnosisGroup::GenitourinarySystem => "Genitourinary_System",
            DiagnosisGroup::Pregnancy => "Pregnancy",
            DiagnosisGroup::Skin => "Skin",
            DiagnosisGroup::Musculoskeletal => "Musculoskeletal",
            DiagnosisGroup::CongenitalAnomalies => "Congenital_Anomalies",
            DiagnosisGroup::Perinatal => "Perinatal",
            DiagnosisGroup::IllDefined => "Ill-Defined",
            DiagnosisGroup::InjuryPoison => "Injury/Poison",
            DiagnosisGroup::SupplementalFactors => "Supplemental_factors",
            DiagnosisGroup::ExternalCauseInjPoison => "External_Cause_Inj_Poison",
            DiagnosisGroup::MorphologyOfNeoplasms => "Morphology_of_Neoplasms",
        }
    }

    /// Human-readable description of the ICD-9 chapter.
    pub fn description(self) -> &'static str {
        match self {
            DiagnosisGroup::ParasiticDisease => "Infectious and parasitic diseases",
            DiagnosisGroup::Neoplasm => "Neoplasms",
            DiagnosisGroup::Endocrine => {
                "Endocrine, nutritional and metabolic diseases, and immunity disorders"
            }
            DiagnosisGroup::Blood => "Diseases of the blood and blood-forming organs",
            DiagnosisGroup::MentalDisorder => "Mental disorders",
            DiagnosisGroup::NervousSystem => "Diseases of the nervous system and sense organs",
            DiagnosisGroup::CirculatorySystem => "Diseases of the circulatory system",
            DiagnosisGroup::RespiratorySystem => "Diseases of the respiratory system",
            DiagnosisGroup::DigestiveSystem => "Diseases of the digestive system",
            DiagnosisGroup::GenitourinarySystem => "Diseases of the genitourinary system",
            DiagnosisGroup::Pregnancy => "Complications of pregnancy, childbirth, and the puerperium",
            DiagnosisGroup::Skin => "Diseases of the skin and subcutaneous tissue",
            DiagnosisGroup::Musculoskeletal => {
                "Diseases of the musculoskeletal system and connective tissue"
            }
            DiagnosisGroup::CongenitalAnomalies => "Congenital anomalies",
            DiagnosisGroup::Perinatal => "Conditions originating in the perinatal period",
            DiagnosisGroup::IllDefined => "Symptoms, signs, and ill-defined conditions",
            DiagnosisGroup::InjuryPoison => "Injury and poisoning",
            DiagnosisGroup::SupplementalFactors => {
                "Factors influencing health status and contact with health services (V codes)"
            }
            DiagnosisGroup::ExternalCauseInjPoison => {
                "External causes of injury and poisoning (E codes)"
            }
            DiagnosisGroup::MorphologyOfNeoplasms => "Morphology of neoplasms (M codes)",
        }
    }
}

impl fmt::Display for DiagnosisGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DiagnosisGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagnosisGroup::ALL
            .into_iter()
            .find(|group| group.label() == s)
            .ok_or_else(|| format!("unknown diagnosis group: {s}"))
    }
}
