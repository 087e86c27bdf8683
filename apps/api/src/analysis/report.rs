//! Typed view over the parsed model result. Coercion is deliberately
//! forgiving: the model does not always honor the response contract, and a
//! malformed field must degrade to a default rather than fail the request.

use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_SUMMARY: &str = "No summary provided.";

/// The result consumers render: score gauge value, keyword tags, summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// 0 – 100 gauge value.
    pub score: u32,
    /// Keyword tags in the order the model listed them. Empty means the
    /// consumer shows its "none found" state.
    pub missing_keywords: Vec<String>,
    pub profile_summary: String,
}

impl MatchReport {
    pub fn from_result(result: &Value) -> Self {
        Self {
            score: coerce_score(result.get("JD Match")),
            missing_keywords: result
                .get("MissingKeywords")
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default(),
            profile_summary: result
                .get("Profile Summary")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_SUMMARY)
                .to_string(),
        }
    }
}

/// `"87%"` → 87, `"N/A"` → 0, `62` → 62. Strips `%` signs and surrounding
/// whitespace; any parse failure defaults to 0.
fn coerce_score(raw: Option<&Value>) -> u32 {
    match raw {
        Some(Value::String(s)) => s.replace('%', "").trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_f64().map(|v| v.max(0.0) as u32).unwrap_or(0),
        _ => 0,
    }
}
