/// Minimum number of whitespace-separated words in a report body.
pub const MIN_REPORT_WORDS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportRejection {
    #[error("Please provide a report title.")]
    MissingTitle,
    #[error("Report content must contain at least 7 words.")]
    TooFewWords { found: usize },
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Checks a report before it is sent; the draft carries trimmed fields.
pub fn validate_report(title: &str, content: &str) -> Result<ReportDraft, ReportRejection> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ReportRejection::MissingTitle);
    }
    let content = content.trim();
    let found = word_count(content);
    if found < MIN_REPORT_WORDS {
        return Err(ReportRejection::TooFewWords { found });
    }
    Ok(ReportDraft {
        title: title.to_string(),
        content: content.to_string(),
    })
}
