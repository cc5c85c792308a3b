//! Evidence records produced by a validated extraction
//!
//! Every record here is built by the schema validator in
//! `service::extraction::validation` and is never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of literal values accepted for an enumerated field
pub trait SchemaEnum: Sized + Copy + 'static {
    /// Every accepted variant, in declaration order
    const VARIANTS: &'static [Self];

    /// Literal wire value of the variant
    fn as_str(&self) -> &'static str;

    /// Case-sensitive lookup of a literal wire value
    fn parse(value: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.as_str() == value)
    }

    /// Comma-separated list of accepted literals, used in diagnostics
    fn expected() -> String {
        Self::VARIANTS
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

macro_rules! schema_enum {
    ($name:ident { $($variant:ident => $literal:literal),+ $(,)? }) => {
        impl SchemaEnum for $name {
            const VARIANTS: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $literal),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Capability category an evidence item is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceCategory {
    IntelligenceGathering,
    SocialManipulation,
    AttackToolDevelopment,
    SystemInfiltration,
    AttackOrchestration,
}

schema_enum!(EvidenceCategory {
    IntelligenceGathering => "INTELLIGENCE_GATHERING",
    SocialManipulation => "SOCIAL_MANIPULATION",
    AttackToolDevelopment => "ATTACK_TOOL_DEVELOPMENT",
    SystemInfiltration => "SYSTEM_INFILTRATION",
    AttackOrchestration => "ATTACK_ORCHESTRATION",
});

/// Model family the evaluated system belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LlmFamily {
    Claude,
    Gpt,
    Gemini,
    Other,
}

schema_enum!(LlmFamily {
    Claude => "CLAUDE",
    Gpt => "GPT",
    Gemini => "GEMINI",
    Other => "OTHER",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    Quantitative,
    Qualitative,
}

schema_enum!(MetricType {
    Quantitative => "QUANTITATIVE",
    Qualitative => "QUALITATIVE",
});

/// Three-step rating shared by source confidence and the confidence summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

schema_enum!(ConfidenceLevel {
    High => "HIGH",
    Medium => "MEDIUM",
    Low => "LOW",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Reported score: evaluations give either a number or a qualitative descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Number(f64),
    Text(String),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Number(n) => write!(f, "{}", n),
            Score::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub score: Score,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub test_conditions: String,
    pub limitations: Vec<String>,
    pub assumptions: Vec<String>,
}

/// Where in the source document the evidence was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    pub confidence: ConfidenceLevel,
}

/// One observed capability data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub category: EvidenceCategory,
    pub llm_family: LlmFamily,
    pub capability: String,
    pub metric: Metric,
    pub performance: Performance,
    pub context: Context,
    pub source_info: SourceInfo,
}

/// Category the extraction could not cover, with the reason given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageGap {
    pub category: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSummary {
    pub overall_score: ConfidenceLevel,
    pub methodology_strength: ConfidenceLevel,
    pub data_quality: ConfidenceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub total_evidence_points: i64,
    pub coverage_gaps: Vec<CoverageGap>,
    pub confidence_summary: ConfidenceSummary,
    /// ISO 8601 timestamp, kept as written by the generator
    pub extraction_timestamp: String,
}

/// Root record of one extraction call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub evidence_items: Vec<EvidenceItem>,
    pub metadata: Metadata,
}
