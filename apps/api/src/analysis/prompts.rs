// Prompt constants for the ATS analysis pipeline.

/// ATS evaluation prompt. Replace `{resume_text}` and `{jd_text}` before
/// sending. The three result keys are spelled exactly as the parser and
/// report expect them.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Act as a highly experienced ATS (Applicant Tracking System) with deep expertise in technology, software engineering, data science, data analysis, and big data engineering. Your task is to evaluate the following resume against the provided job description. The job market is highly competitive, so provide the best possible feedback for improving the resume.

Evaluate:
- Assign a JD Match percentage based on relevance.
- Identify missing keywords.
- Provide a concise, impactful profile summary.

Resume: {resume_text}
Job Description: {jd_text}

Return the response as a single JSON object with exactly these three keys:
{"JD Match": "%", "MissingKeywords": [], "Profile Summary": ""}
Do NOT include any text outside the JSON object.
Do NOT use markdown code fences."#;

/// Builds the analysis prompt by literal substitution. Both inputs are
/// inserted verbatim; no escaping is performed.
pub fn build_analysis_prompt(resume_text: &str, jd_text: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace("{jd_text}", jd_text)
}
