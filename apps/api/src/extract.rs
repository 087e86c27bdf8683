//! Résumé text extraction. Best effort: an unreadable PDF contributes empty
//! text rather than an error, and overly long text is trimmed to a character
//! budget so the prompt stays inside token limits.

use tracing::warn;

/// Character budget applied to extracted résumé text before prompting.
pub const MAX_RESUME_CHARS: usize = 3000;

/// Résumé text after extraction and budgeting. `truncated_from` carries the
/// pre-trim character count when the budget fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeText {
    pub text: String,
    pub truncated_from: Option<usize>,
}

/// Extracts text from uploaded PDF bytes. Pages are concatenated in page
/// order; extraction failure is never fatal.
pub fn extract_resume_text(bytes: &[u8], max_chars: usize) -> ResumeText {
    let text = match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("Resume text extraction failed, continuing with empty text: {e}");
            String::new()
        }
    };

    truncate_to_budget(text.trim(), max_chars)
}

/// Keeps exactly the first `max_chars` characters, warning with the
/// before/after counts when trimming happens.
fn truncate_to_budget(text: &str, max_chars: usize) -> ResumeText {
    let total_chars = text.chars().count();
    if total_chars <= max_chars {
        return ResumeText {
            text: text.to_string(),
            truncated_from: None,
        };
    }

    warn!("Resume text trimmed from {total_chars} to {max_chars} characters to fit token limits");
    ResumeText {
        text: text.chars().take(max_chars).collect(),
        truncated_from: Some(total_chars),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_over_budget_is_trimmed_to_exactly_max_chars() {
        let text = "a".repeat(3500);
        let result = truncate_to_budget(&text, 3000);
        assert_eq!(result.text.chars().count(), 3000);
        assert_eq!(result.text, "a".repeat(3000));
        assert_eq!(result.truncated_from, Some(3500));
    }

    #[test]
    fn test_text_at_budget_is_unchanged_with_no_signal() {
        let text = "b".repeat(3000);
        let result = truncate_to_budget(&text, 3000);
        assert_eq!(result.text, text);
        assert_eq!(result.truncated_from, None);
    }

    #[test]
    fn test_text_under_budget_is_unchanged_with_no_signal() {
        let result = truncate_to_budget("short resume", 3000);
        assert_eq!(result.text, "short resume");
        assert_eq!(result.truncated_from, None);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        // Multibyte characters must not be split.
        let text = "é".repeat(10);
        let result = truncate_to_budget(&text, 4);
        assert_eq!(result.text, "é".repeat(4));
        assert_eq!(result.truncated_from, Some(10));
    }

    #[test]
    fn test_unreadable_pdf_yields_empty_text() {
        let result = extract_resume_text(b"this is not a pdf", MAX_RESUME_CHARS);
        assert_eq!(result.text, "");
        assert_eq!(result.truncated_from, None);
    }
}
