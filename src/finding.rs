//! The structured result of one analysis.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Name under which the schema is registered in the `response_format` block.
pub const SCHEMA_NAME: &str = "analysis_result";

/// Keys every model response must carry, in canonical order.
pub const REQUIRED_KEYS: [&str; 4] = [
    "summary",
    "risk_points",
    "attract_points",
    "notes_for_interviewer",
];

/// Briefing material extracted from one assessment report.
///
/// Serialises to exactly the four fields below, so it can be returned to a
/// caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFinding {
    /// Overall characterisation of the candidate (a short paragraph).
    pub summary: String,
    /// Points the panel should probe (risks).
    pub risk_points: Vec<String>,
    /// Strengths to appeal to when attracting the candidate.
    pub attract_points: Vec<String>,
    /// How to run the interview.
    pub notes_for_interviewer: Vec<String>,
}

impl StructuredFinding {
    /// JSON Schema of this record, suitable for a strict `json_schema`
    /// response format: every property required, no additional properties.
    pub fn json_schema() -> Value {
        let list = |description: &str| {
            json!({
                "type": "array",
                "items": { "type": "string" },
                "description": description,
            })
        };

        json!({
            "title": "AnalysisResult",
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "候補者の総合的な特徴の要約",
                },
                "risk_points": list("見定めポイント（リスク）のリスト"),
                "attract_points": list("アトラクトポイント（強み）のリスト"),
                "notes_for_interviewer": list("面接官向けの進め方メモのリスト"),
            },
            "required": REQUIRED_KEYS,
            "additionalProperties": false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StructuredFinding {
        StructuredFinding {
            summary: "テスト候補者の総合的な特徴".into(),
            risk_points: vec!["リスク1".into(), "リスク2".into()],
            attract_points: vec!["強み1".into()],
            notes_for_interviewer: vec![],
        }
    }

    #[test]
    fn serde_round_trip() {
        let finding = sample();
        let text = serde_json::to_string(&finding).unwrap();
        let back: StructuredFinding = serde_json::from_str(&text).unwrap();
        assert_eq!(back, finding);
    }

    #[test]
    fn serialises_exactly_four_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 4);
        for key in REQUIRED_KEYS {
            assert!(keys.contains(&key), "missing {key}");
        }
    }

    #[test]
    fn missing_field_fails_deserialisation() {
        let res: Result<StructuredFinding, _> = serde_json::from_str(
            r#"{"summary":"S","attract_points":[],"notes_for_interviewer":[]}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn schema_requires_all_keys() {
        let schema = StructuredFinding::json_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, REQUIRED_KEYS);
        assert_eq!(schema["additionalProperties"], Value::Bool(false));
        assert_eq!(schema["properties"]["risk_points"]["items"]["type"], "string");
    }
}
