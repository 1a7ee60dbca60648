//! Response model of the intelligence-generation service
//!
//! Parsing is lenient: missing collections and summaries default to empty so
//! business rules can still inspect partially conformant responses. Structural
//! strictness is the schema validator's job.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Classification of a decision point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecisionKind {
    /// Priority Intelligence Requirement (externally directed)
    Pir,
    /// Friendly Force Information Requirement (internally directed)
    Ffir,
    /// No classification present
    #[default]
    Unspecified,
}

impl DecisionKind {
    /// Wire tag, `None` for unspecified
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Pir => Some("PIR"),
            Self::Ffir => Some("FFIR"),
            Self::Unspecified => None,
        }
    }

    /// Whether the decision carries a PIR or FFIR tag
    #[inline]
    #[must_use]
    pub fn is_typed(&self) -> bool {
        !matches!(self, Self::Unspecified)
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().unwrap_or("unspecified"))
    }
}

impl Serialize for DecisionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.tag() {
            Some(tag) => serializer.serialize_str(tag),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for DecisionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::trim) {
            Some(tag) if tag.eq_ignore_ascii_case("PIR") => Self::Pir,
            Some(tag) if tag.eq_ignore_ascii_case("FFIR") => Self::Ffir,
            _ => Self::Unspecified,
        })
    }
}

/// One decision point of a generated workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "title")]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "type")]
    pub kind: DecisionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl DecisionRecord {
    /// Create a decision of the given kind
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, question: impl Into<String>, kind: DecisionKind) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            description: None,
            kind,
            status: None,
        }
    }
}

/// PIR workflow summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PirSummary {
    #[serde(default)]
    pub total_decisions: u64,
    #[serde(default, rename = "totalPIRs")]
    pub total_pirs: u64,
    #[serde(default)]
    pub total_indicators: u64,
}

/// FFIR workflow summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FfirSummary {
    #[serde(default)]
    pub total_decisions: u64,
    #[serde(default, rename = "totalFFIRs")]
    pub total_ffirs: u64,
    #[serde(default)]
    pub total_company_indicators: u64,
}

/// PIR workflow block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PirWorkflow {
    #[serde(default)]
    pub summary: PirSummary,
}

/// FFIR workflow block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FfirWorkflow {
    #[serde(default)]
    pub summary: FfirSummary,
}

/// A response under test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutput {
    #[serde(default)]
    pub decisions: Vec<DecisionRecord>,
    #[serde(default)]
    pub pir_workflow: PirWorkflow,
    #[serde(default)]
    pub ffir_workflow: FfirWorkflow,
}

impl TestOutput {
    /// Number of decisions of a kind
    #[must_use]
    pub fn count_of(&self, kind: DecisionKind) -> usize {
        self.decisions.iter().filter(|d| d.kind == kind).count()
    }

    /// Number of PIR-tagged decisions
    #[inline]
    #[must_use]
    pub fn pir_count(&self) -> usize {
        self.count_of(DecisionKind::Pir)
    }

    /// Number of FFIR-tagged decisions
    #[inline]
    #[must_use]
    pub fn ffir_count(&self) -> usize {
        self.count_of(DecisionKind::Ffir)
    }

    /// Whether at least one decision is PIR or FFIR
    #[must_use]
    pub fn has_typed_decision(&self) -> bool {
        self.decisions.iter().any(|d| d.kind.is_typed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_accepts_tags_aliases_and_absence() {
        let output: TestOutput = serde_json::from_value(json!({
            "decisions": [
                {"id": "d1", "question": "Enter market?", "kind": "PIR"},
                {"id": "d2", "title": "Ready to ship?", "type": "ffir"},
                {"id": "d3", "question": "Unclassified"},
                {"id": "d4", "question": "Null kind", "kind": null}
            ]
        }))
        .unwrap();

        let kinds: Vec<_> = output.decisions.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DecisionKind::Pir,
                DecisionKind::Ffir,
                DecisionKind::Unspecified,
                DecisionKind::Unspecified
            ]
        );
        assert_eq!(output.decisions[1].question, "Ready to ship?");
    }

    #[test]
    fn missing_workflows_default_to_zero() {
        let output: TestOutput = serde_json::from_value(json!({"decisions": []})).unwrap();
        assert_eq!(output.pir_workflow.summary.total_decisions, 0);
        assert_eq!(output.ffir_workflow.summary.total_ffirs, 0);
    }

    #[test]
    fn summary_field_names_match_wire() {
        let output: TestOutput = serde_json::from_value(json!({
            "decisions": [],
            "pirWorkflow": {"summary": {"totalDecisions": 2, "totalPIRs": 4, "totalIndicators": 9}},
            "ffirWorkflow": {"summary": {"totalDecisions": 1, "totalFFIRs": 2, "totalCompanyIndicators": 3}}
        }))
        .unwrap();

        assert_eq!(output.pir_workflow.summary.total_pirs, 4);
        assert_eq!(output.pir_workflow.summary.total_indicators, 9);
        assert_eq!(output.ffir_workflow.summary.total_company_indicators, 3);

        let back = serde_json::to_value(&output).unwrap();
        assert_eq!(back["pirWorkflow"]["summary"]["totalPIRs"], 4);
        assert_eq!(back["ffirWorkflow"]["summary"]["totalFFIRs"], 2);
    }

    #[test]
    fn unspecified_serializes_as_null() {
        let record = DecisionRecord::new("d1", "q", DecisionKind::Unspecified);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["kind"].is_null());
    }

    #[test]
    fn counts_by_kind() {
        let output = TestOutput {
            decisions: vec![
                DecisionRecord::new("1", "a", DecisionKind::Pir),
                DecisionRecord::new("2", "b", DecisionKind::Pir),
                DecisionRecord::new("3", "c", DecisionKind::Ffir),
                DecisionRecord::new("4", "d", DecisionKind::Unspecified),
            ],
            ..TestOutput::default()
        };
        assert_eq!(output.pir_count(), 2);
        assert_eq!(output.ffir_count(), 1);
        assert!(output.has_typed_decision());
    }
}
