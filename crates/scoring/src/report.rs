use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ScoringError;
use crate::llm::{CompletionClient, CompletionParams};
use crate::prompt;

/// Expands factor scores into a long-form investment report.
///
/// Unlike [`crate::Scorer`], the reply is parsed as-is: the prompt forbids
/// commentary, so a malformed reply is reported rather than repaired. The
/// report is returned exactly as the model wrote it, including fields the
/// schema does not name.
#[derive(Clone)]
pub struct ReportGenerator {
    llm: Arc<dyn CompletionClient>,
}

impl ReportGenerator {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    pub async fn expand<S>(&self, scores: &S, project_text: &str) -> Result<Value, ScoringError>
    where
        S: Serialize + ?Sized,
    {
        let scores_json = serde_json::to_string(scores)
            .map_err(|e| ScoringError::InvalidScores(e.to_string()))?;

        let prompt = prompt::build_report_prompt(&scores_json, project_text);

        let content = self.llm
            .complete(&prompt, CompletionParams::REPORT)
            .await
            .map_err(ScoringError::upstream)?;

        let report: Value = serde_json::from_str(&content).map_err(|e| {
            tracing::debug!(raw = %content, "Report response was not valid JSON");
            ScoringError::unparsable(format!("report is not valid JSON: {}", e), &content)
        })?;

        if !report.is_object() {
            return Err(ScoringError::unparsable("report is not a JSON object", &content));
        }

        tracing::info!(
            categories = report["categories"].as_array().map_or(0, Vec::len),
            final_weighted_score = final_weighted_score(&report),
            "Generated analysis report"
        );

        Ok(report)
    }
}

/// Sum of `categories[].weightedScore` on a 0-10 scale. Weighted scores may
/// be numbers or numeric strings; anything else is skipped.
pub fn final_weighted_score(report: &Value) -> f64 {
    let Some(categories) = report["categories"].as_array() else {
        return 0.0;
    };

    let total: f64 = categories
        .iter()
        .filter_map(|category| match &category["weightedScore"] {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        })
        .sum();

    total / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::fake::FakeClient;
    use serde_json::json;

    const REPORT_JSON: &str = r#"{
        "summary": {"companyName": "Acme Robotics", "ceo": "Dana Reyes"},
        "categories": [{"category": "Leadership", "score": 8, "weight": "20%", "weightedScore": 16}],
        "totalWeightedScore": 1.6,
        "riskNote": "Hardware margins are thin.",
        "keyQuestions": {"financials": ["What is the gross margin per unit?"]},
        "conclusion": "Promising team.",
        "recommendation": "Invest"
    }"#;

    #[tokio::test]
    async fn test_expand_parses_report() {
        let fake = Arc::new(FakeClient::replying(REPORT_JSON));
        let generator = ReportGenerator::new(fake.clone());

        let scores = json!({"Leadership": {"Score": 8, "Color": "Green", "Justification": "Serial founder"}});
        let report = generator.expand(&scores, "Acme builds warehouse robots.").await.unwrap();

        assert_eq!(report["summary"]["companyName"], "Acme Robotics");
        assert_eq!(report["keyQuestions"]["financials"].as_array().unwrap().len(), 1);
        assert_eq!(report["recommendation"], "Invest");

        let prompts = fake.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].1, CompletionParams::REPORT);
        assert!(prompts[0].0.contains("Serial founder"));
        assert!(prompts[0].0.contains("Acme builds warehouse robots."));
    }

    #[tokio::test]
    async fn test_malformed_report_is_not_repaired() {
        let fake = Arc::new(FakeClient::replying(r#"{'summary': {'companyName': 'Acme'},}"#));
        let generator = ReportGenerator::new(fake.clone());

        let err = generator.expand(&json!({}), "text").await.unwrap_err();

        assert!(matches!(err, ScoringError::UnparsableResponse { .. }));
        assert_eq!(err.raw_response(), Some(r#"{'summary': {'companyName': 'Acme'},}"#));
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_report_is_returned_verbatim() {
        let reply = r#"{
            "summary": {"companyName": "Acme Robotics", "founded": 2019},
            "categories": [
                {"category": "Leadership", "strengths": ["Serial founder", "Strong CTO"], "score": "6", "weightedScore": 12},
                {"category": "Financials", "score": 5, "weightedScore": "15"}
            ],
            "recommendations": [{"title": "Next steps", "items": "Run customer calls"}],
            "investmentThesis": "Strong team in a growing market"
        }"#;
        let generator = ReportGenerator::new(Arc::new(FakeClient::replying(reply)));

        let report = generator.expand(&json!({}), "text").await.unwrap();

        assert_eq!(report, serde_json::from_str::<Value>(reply).unwrap());
        assert_eq!(report["investmentThesis"], "Strong team in a growing market");
        assert_eq!(report["categories"][0]["strengths"], json!(["Serial founder", "Strong CTO"]));
        assert_eq!(report["categories"][0]["score"], "6");
        assert_eq!(report["summary"]["founded"], 2019);
        assert!(report.get("conclusion").is_none());
        assert!((final_weighted_score(&report) - 2.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_report_must_be_an_object() {
        let generator = ReportGenerator::new(Arc::new(FakeClient::replying(r#"["Invest"]"#)));

        let err = generator.expand(&json!({}), "text").await.unwrap_err();

        match err {
            ScoringError::UnparsableResponse { reason, .. } => {
                assert_eq!(reason, "report is not a JSON object")
            }
            other => panic!("expected UnparsableResponse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let generator = ReportGenerator::new(Arc::new(FakeClient::failing("connection reset")));

        let err = generator.expand(&json!({}), "text").await.unwrap_err();

        match err {
            ScoringError::Upstream(message) => assert!(message.contains("connection reset")),
            other => panic!("expected Upstream, got {:?}", other),
        }
    }
}
