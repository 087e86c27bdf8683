//! The analysis pipeline: prompt → model (with fallback) → tolerant parse →
//! typed report. One run per submit action; nothing is persisted.

pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod report;

use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::LlmClient;

use self::parser::extract_json;
use self::prompts::build_analysis_prompt;
use self::report::MatchReport;

/// Outcome of one analysis run: the typed report plus provenance.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub report: MatchReport,
    pub model_used: &'static str,
    /// Verbatim model output, surfaced for client-side debugging.
    pub raw_model_output: String,
}

pub async fn analyze(
    resume_text: &str,
    jd_text: &str,
    llm: &LlmClient,
) -> Result<AnalysisOutcome, AppError> {
    let prompt = build_analysis_prompt(resume_text, jd_text);

    let completion = llm
        .generate(&prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

    debug!("Analysis completed using {}", completion.model);

    let result = extract_json(&completion.text).ok_or(AppError::UnparseableModelOutput)?;

    Ok(AnalysisOutcome {
        report: MatchReport::from_result(&result),
        model_used: completion.model,
        raw_model_output: completion.text,
    })
}

#[cfg(test)]
mod tests {
    use super::parser::extract_json;
    use super::report::MatchReport;

    /// The end-to-end contract from model output to rendered fields.
    #[test]
    fn test_sample_model_output_yields_expected_report() {
        let raw = r#"{"JD Match": "62%", "MissingKeywords": ["Go", "Kubernetes"], "Profile Summary": "Strong backend skills, lacks Go experience."}"#;

        let value = extract_json(raw).expect("sample output parses");
        let report = MatchReport::from_result(&value);

        assert_eq!(report.score, 62);
        assert_eq!(report.missing_keywords, vec!["Go", "Kubernetes"]);
        assert_eq!(
            report.profile_summary,
            "Strong backend skills, lacks Go experience."
        );
    }

    #[test]
    fn test_fenced_model_output_yields_expected_report() {
        let raw = "Here you go:\n```json\n{\"JD Match\": \"40%\", \"MissingKeywords\": [], \"Profile Summary\": \"Junior profile.\"}\n```";

        let value = extract_json(raw).expect("fenced output parses");
        let report = MatchReport::from_result(&value);

        assert_eq!(report.score, 40);
        assert!(report.missing_keywords.is_empty());
        assert_eq!(report.profile_summary, "Junior profile.");
    }
}
