use crate::error::ScoringError;

/// Minimum trimmed length of text extracted from uploaded documents.
pub const MIN_DOCUMENT_CHARS: usize = 100;
/// Minimum trimmed length of text supplied directly in a request body.
pub const MIN_DIRECT_CHARS: usize = 50;

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Documents,
    Direct,
}

impl TextSource {
    pub fn min_chars(self) -> usize {
        match self {
            TextSource::Documents => MIN_DOCUMENT_CHARS,
            TextSource::Direct => MIN_DIRECT_CHARS,
        }
    }
}

/// Pitch text that has passed the length threshold for its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchText(String);

impl PitchText {
    pub fn new(text: impl Into<String>, source: TextSource) -> Result<Self, ScoringError> {
        let text = text.into();
        let len = text.trim().chars().count();
        let min = source.min_chars();
        if len < min {
            return Err(ScoringError::InsufficientText { len, min });
        }
        Ok(Self(text))
    }

    pub fn from_documents(text: impl Into<String>) -> Result<Self, ScoringError> {
        Self::new(text, TextSource::Documents)
    }

    pub fn from_direct(text: impl Into<String>) -> Result<Self, ScoringError> {
        Self::new(text, TextSource::Direct)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn preview(&self) -> String {
        preview(&self.0)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// First 100 characters of `text`, with "..." appended when anything was cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_per_source() {
        let text = "x".repeat(60);
        assert!(PitchText::from_direct(text.clone()).is_ok());

        match PitchText::from_documents(text) {
            Err(ScoringError::InsufficientText { len, min }) => {
                assert_eq!(len, 60);
                assert_eq!(min, MIN_DOCUMENT_CHARS);
            }
            other => panic!("expected InsufficientText, got {:?}", other),
        }
    }

    #[test]
    fn test_threshold_ignores_surrounding_whitespace() {
        let padded = format!("   {}\n\n\n", "y".repeat(49));
        assert!(PitchText::from_direct(padded).is_err());
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let text = "a".repeat(150);
        let preview = preview(&text);
        assert_eq!(preview, format!("{}...", "a".repeat(100)));
    }

    #[test]
    fn test_preview_keeps_short_text() {
        let exact = "b".repeat(100);
        assert_eq!(preview(&exact), exact);
        assert_eq!(preview("short pitch"), "short pitch");
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let text = "é".repeat(101);
        assert_eq!(preview(&text), format!("{}...", "é".repeat(100)));
    }
}
