pub mod error;
pub mod llm;
pub mod normalizer;
pub mod pitch;
pub mod prompt;
pub mod repair;
pub mod report;
pub mod schema;

pub use error::ScoringError;
pub use llm::{CompletionClient, CompletionParams, OpenAiClient};
pub use normalizer::FactorNormalizer;
pub use pitch::{PitchText, TextSource, preview};
pub use report::{ReportGenerator, final_weighted_score};
pub use schema::{FactorScore, RatingColor, RubricFactor, ScoreEntry, ScoreSet};

use serde_json::Value;
use std::sync::Arc;

/// Scores pitch text against the fixed investment rubric.
#[derive(Clone)]
pub struct Scorer {
    llm: Arc<dyn CompletionClient>,
    normalizer: Arc<FactorNormalizer>,
}

impl Scorer {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self {
            llm,
            normalizer: Arc::new(FactorNormalizer::new()),
        }
    }

    /// Validate `text` against the threshold for `source`, then score it.
    /// Text below the threshold never reaches the LLM.
    pub async fn score_text(&self, text: &str, source: TextSource) -> Result<ScoreSet, ScoringError> {
        let pitch = PitchText::new(text, source)?;
        self.score(&pitch).await
    }

    pub async fn score(&self, pitch: &PitchText) -> Result<ScoreSet, ScoringError> {
        let prompt = prompt::build_scoring_prompt(pitch.as_str());

        let content = self.llm
            .complete(&prompt, CompletionParams::SCORING)
            .await
            .map_err(ScoringError::upstream)?;

        tracing::debug!(raw = %content, "LLM scoring response");

        let value = repair::parse_with_repair(&content)?;
        let scores = self.to_score_set(value, &content)?;

        tracing::info!(
            factors = scores.len(),
            average = scores.average_score().unwrap_or_default(),
            "Scored pitch"
        );

        Ok(scores)
    }

    fn to_score_set(&self, value: Value, raw: &str) -> Result<ScoreSet, ScoringError> {
        let Value::Object(entries) = value else {
            return Err(ScoringError::unparsable("response is not a JSON object", raw));
        };

        if entries.is_empty() {
            return Err(ScoringError::unparsable("response contains no factor scores", raw));
        }

        let mut scores = ScoreSet::new();
        for (key, entry) in entries {
            let entry = ScoreEntry::from(entry);
            if let ScoreEntry::Other(value) = &entry {
                tracing::debug!(factor = %key, value = %value, "Passing through unscored entry");
            }
            scores.insert(self.normalizer.canonicalize(&key), entry);
        }
        Ok(scores)
    }
}
