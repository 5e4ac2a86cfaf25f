use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// Pitch text is below the minimum length for its source.
    #[error("Text too short for scoring: {len} characters, at least {min} required")]
    InsufficientText { len: usize, min: usize },

    /// The LLM call failed or timed out.
    #[error("LLM provider error: {0}")]
    Upstream(String),

    /// Caller-supplied scores could not be serialized into the prompt.
    #[error("Invalid scores: {0}")]
    InvalidScores(String),

    /// No JSON object could be recovered from the LLM response.
    #[error("Unparsable LLM response: {reason}")]
    UnparsableResponse { reason: String, raw: String },
}

impl ScoringError {
    pub(crate) fn upstream(err: anyhow::Error) -> Self {
        ScoringError::Upstream(format!("{:#}", err))
    }

    pub(crate) fn unparsable(reason: impl Into<String>, raw: &str) -> Self {
        ScoringError::UnparsableResponse {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    /// Raw LLM content attached for diagnostics, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ScoringError::UnparsableResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
