const SCORING_RUBRIC: &str = r#"Scoring guide:
- 1-2: Very Bad
- 3-4: Bad
- 5-6: OK
- 7-8: Good
- 9-10: Very Good

Rubric:

Leadership (Founder and team experience, CEO):
- 1-2: Founders lack relevant experience or leadership skills.
- 3-4: Minimal experience, no proven track record.
- 5-6: Some relevant experience; moderate track record; coachable.
- 7-8: Substantial relevant experience; strong CEO; prior successes.
- 9-10: Recognized experts; visionary CEO; proven significant achievements.

Financials (Revenue model, projections, unit economics):
- 1-2: No credible revenue plan or unrealistic projections.
- 3-4: Revenue model unclear; projections lack data.
- 5-6: Model is reasonable, but scalability/profitability unclear.
- 7-8: Achievable projections with scalable, profitable model.
- 9-10: Robust, validated projections; excellent unit economics.

MarketSize (Addressable market, growth potential, product-market fit):
- 1-2: Market is too small or demand is unproven.
- 3-4: Small/niche market, limited growth.
- 5-6: Moderate market size, some growth potential.
- 7-8: Large, growing market; strong demand.
- 9-10: Massive market; growth and demand highly evident.

Traction (Customer adoption, revenue growth, partnerships):
- 1-2: No traction; no evidence of demand.
- 3-4: Minimal adoption; weak evidence of product-market fit.
- 5-6: Some early traction; moderate adoption.
- 7-8: Good customer adoption; strong product-market fit.
- 9-10: Excellent traction; rapid and growing adoption.

GTMStrategy (Go-to-market plan, sales channels, customer acquisition):
- 1-2: No go-to-market plan.
- 3-4: Vague plan; channels and acquisition costs unknown.
- 5-6: Plausible plan with some validated channels.
- 7-8: Clear, tested channels with sensible acquisition costs.
- 9-10: Proven, repeatable acquisition engine.

TechnologyIP (Technology maturity, defensibility, intellectual property):
- 1-2: No working product; trivially copied.
- 3-4: Early prototype; little defensibility.
- 5-6: Working product; some proprietary elements.
- 7-8: Mature technology; meaningful IP or know-how.
- 9-10: Breakthrough technology; strong patents or hard-to-replicate assets.

ExitPotential (Acquirers, IPO prospects, return multiple):
- 1-2: No plausible exit path.
- 3-4: Exit path unclear or far off.
- 5-6: Potential acquirers exist but exit is uncertain.
- 7-8: Clear strategic acquirers or comparable exits.
- 9-10: Multiple credible exit routes with strong return potential.

Competition (Competitive landscape, differentiation):
- 1-2: Crowded market with no differentiation.
- 3-4: Strong incumbents; weak differentiation.
- 5-6: Some differentiation against established players.
- 7-8: Clear differentiation and competitive advantage.
- 9-10: Category leader or uncontested space with durable advantage.

Risk (Execution, regulatory, technical and financial risk):
- 1-2: Severe unmitigated risks.
- 3-4: Significant risks with little mitigation.
- 5-6: Moderate risks, partially mitigated.
- 7-8: Low risks, well understood and mitigated.
- 9-10: Minimal risk exposure.

DealTerms (Valuation, structure, investor protections):
- 1-2: Unreasonable valuation or terms.
- 3-4: Terms unfavorable to investors.
- 5-6: Acceptable terms with some concerns.
- 7-8: Fair valuation and standard protections.
- 9-10: Highly attractive terms.

Macro-Level Risk (Political, economic, environmental and ESG exposure):
- 1-2: Highly exposed to adverse macro conditions.
- 3-4: Significant macro exposure.
- 5-6: Moderate exposure.
- 7-8: Limited exposure, some resilience.
- 9-10: Resilient or positioned to benefit from macro trends.

Color: use "Red" for scores 1-4, "Yellow" for 5-6 and "Green" for 7-10."#;

pub fn build_scoring_prompt(pitch_text: &str) -> String {
    format!(
        r#"You are an expert investment analyst. Evaluate the following criteria using a scale from 1 (worst) to 10 (best).

Only score based on the following text content. If text is insufficient, give zero or lowest score.

{}

Startup Info:
{}

Output ONLY a JSON object, no markdown, no explanations. Use the rubric keys exactly as written above.

JSON output format example:
{{
  "Leadership": {{"Score": 7, "Color": "Green", "Justification": "Experienced founder with strong vision but limited team."}},
  "MarketSize": {{"Score": 8, "Color": "Green", "Justification": "Large growing market with clear demand."}},
  ...
  "ExitPotential": {{"Score": 6, "Color": "Yellow", "Justification": "Potential acquirers identified but revenue still low."}}
}}"#,
        SCORING_RUBRIC, pitch_text
    )
}

pub fn build_report_prompt(scores_json: &str, project_text: &str) -> String {
    format!(
        r#"You are a professional VC investment analyst. Based on the following project description and factor scoring, generate a detailed investment analysis report in JSON format strictly following this schema:

{{
  "summary": {{
    "companyName": "string",
    "website": "string",
    "ceo": "string",
    "founded": "string",
    "businessModel": "string",
    "dealStructure": "string",
    "askValuation": "string",
    "revenueStreams": "string"
  }},
  "categories": [
    {{
      "category": "string",
      "description": "string",
      "strengths": "string",
      "concerns": "string",
      "score": 0,
      "weight": "string",
      "weightedScore": 0.0
    }}
  ],
  "totalWeightedScore": 0.0,
  "competitiveLandscape": [
    {{
      "competitor": "string",
      "description": "string",
      "differentiator": "string"
    }}
  ],
  "riskNote": "string",
  "recommendations": [
    {{
      "title": "string",
      "items": ["string"]
    }}
  ],
  "keyQuestions": {{
    "marketStrategy": ["string"],
    "defensibility": ["string"],
    "financials": ["string"],
    "productDevelopment": ["string"],
    "exitStrategy": ["string"]
  }},
  "conclusion": "string",
  "recommendation": "string"
}}

Fill out all fields based on the following project description and scoring data:

Project Description:
{}

Factor Scoring:
{}

Return only JSON content without any explanation or comments."#,
        project_text, scores_json
    )
}
