use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::analysis;
use crate::errors::AppError;
use crate::extract::{extract_resume_text, MAX_RESUME_CHARS};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub score: u32,
    pub missing_keywords: Vec<String>,
    pub profile_summary: String,
    pub model_used: String,
    /// Verbatim model output, kept for client-side debug views.
    pub raw_model_output: String,
    /// Pre-trim character count when the résumé text was truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_truncated_from: Option<usize>,
}

/// POST /api/v1/analyze
/// Multipart form: `resume` (PDF file) and `job_description` (text).
/// Both inputs are validated before any model call is attempted.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut resume_bytes: Option<Bytes> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read resume upload: {e}"))
                })?;
                resume_bytes = Some(data);
            }
            Some("job_description") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read job description: {e}"))
                })?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let resume_bytes = resume_bytes.ok_or_else(|| {
        AppError::Validation("Please upload a resume (`resume` file field)".to_string())
    })?;
    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| {
            AppError::Validation("Please paste a job description (`job_description` field)".to_string())
        })?;

    let resume = extract_resume_text(&resume_bytes, MAX_RESUME_CHARS);

    let outcome = analysis::analyze(&resume.text, &job_description, &state.llm).await?;

    Ok(Json(AnalyzeResponse {
        score: outcome.report.score,
        missing_keywords: outcome.report.missing_keywords,
        profile_summary: outcome.report.profile_summary,
        model_used: outcome.model_used.to_string(),
        raw_model_output: outcome.raw_model_output,
        resume_truncated_from: resume.truncated_from,
    }))
}
