pub mod prompt;
pub mod store;

pub use prompt::MAX_MACRO_ROWS;
pub use store::{MacroDataSource, MacroIndicatorRow, PgMacroStore};

use scoring::{CompletionClient, CompletionParams};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Macro data source error: {0}")]
    DataSource(String),

    #[error("LLM provider error: {0}")]
    Upstream(String),
}

/// Blends recent macro indicators with a startup description into a
/// narrative risk analysis. The LLM's prose is returned unmodified.
#[derive(Clone)]
pub struct MacroRiskAnalyzer {
    llm: Arc<dyn CompletionClient>,
    source: Option<Arc<dyn MacroDataSource>>,
}

impl MacroRiskAnalyzer {
    pub fn new(llm: Arc<dyn CompletionClient>, source: Option<Arc<dyn MacroDataSource>>) -> Self {
        Self { llm, source }
    }

    /// Fetch the latest indicators from the configured store, then analyze.
    pub async fn analyze_latest(&self, startup_text: &str) -> Result<String, RiskError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| RiskError::DataSource("macro data store is not configured".to_string()))?;

        let rows = source
            .recent_indicators(MAX_MACRO_ROWS)
            .await
            .map_err(|e| RiskError::DataSource(format!("{:#}", e)))?;

        self.analyze(startup_text, &rows).await
    }

    pub async fn analyze(&self, startup_text: &str, rows: &[MacroIndicatorRow]) -> Result<String, RiskError> {
        let table = prompt::indicator_table(rows);
        let prompt = prompt::build_macro_prompt(startup_text, &table);

        let analysis = self.llm
            .complete(&prompt, CompletionParams::MACRO_RISK)
            .await
            .map_err(|e| RiskError::Upstream(format!("{:#}", e)))?;

        tracing::info!(
            indicators = rows.len().min(MAX_MACRO_ROWS),
            analysis_chars = analysis.len(),
            "Generated macro risk analysis"
        );

        Ok(analysis)
    }

    /// Readiness of the backing store; `None` when no store is configured.
    pub async fn check_store(&self) -> Option<Result<(), RiskError>> {
        let source = self.source.as_ref()?;
        Some(
            source
                .ping()
                .await
                .map_err(|e| RiskError::DataSource(format!("{:#}", e))),
        )
    }
}
