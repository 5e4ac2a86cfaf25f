use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The fixed set of rubric categories the scoring prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RubricFactor {
    Leadership,
    Financials,
    MarketSize,
    Traction,
    GtmStrategy,
    TechnologyIp,
    ExitPotential,
    Competition,
    Risk,
    DealTerms,
    MacroLevelRisk,
}

impl RubricFactor {
    pub const ALL: [RubricFactor; 11] = [
        RubricFactor::Leadership,
        RubricFactor::Financials,
        RubricFactor::MarketSize,
        RubricFactor::Traction,
        RubricFactor::GtmStrategy,
        RubricFactor::TechnologyIp,
        RubricFactor::ExitPotential,
        RubricFactor::Competition,
        RubricFactor::Risk,
        RubricFactor::DealTerms,
        RubricFactor::MacroLevelRisk,
    ];

    /// Key the LLM is asked to use in its JSON output.
    pub fn short_key(self) -> &'static str {
        match self {
            RubricFactor::Leadership => "Leadership",
            RubricFactor::Financials => "Financials",
            RubricFactor::MarketSize => "MarketSize",
            RubricFactor::Traction => "Traction",
            RubricFactor::GtmStrategy => "GTMStrategy",
            RubricFactor::TechnologyIp => "TechnologyIP",
            RubricFactor::ExitPotential => "ExitPotential",
            RubricFactor::Competition => "Competition",
            RubricFactor::Risk => "Risk",
            RubricFactor::DealTerms => "DealTerms",
            RubricFactor::MacroLevelRisk => "Macro-Level Risk",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RubricFactor::Leadership => "Leadership",
            RubricFactor::Financials => "Financials",
            RubricFactor::MarketSize => "Market Size & Product-Market Fit",
            RubricFactor::Traction => "Traction",
            RubricFactor::GtmStrategy => "GTM Strategy",
            RubricFactor::TechnologyIp => "Technology/IP",
            RubricFactor::ExitPotential => "Exit Potential",
            RubricFactor::Competition => "Competition",
            RubricFactor::Risk => "Risk",
            RubricFactor::DealTerms => "Deal Terms",
            RubricFactor::MacroLevelRisk => "Macro-Level Risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RatingColor {
    Red,
    Yellow,
    Green,
}

impl RatingColor {
    /// Color implied by a score band: 0-4 Red, 5-6 Yellow, 7-10 Green.
    pub fn for_score(score: u8) -> Self {
        match score {
            0..=4 => RatingColor::Red,
            5..=6 => RatingColor::Yellow,
            _ => RatingColor::Green,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Some(RatingColor::Red),
            "yellow" | "amber" => Some(RatingColor::Yellow),
            "green" => Some(RatingColor::Green),
            _ => None,
        }
    }
}

/// One factor's score as returned by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFactorScore")]
pub struct FactorScore {
    #[serde(rename = "Score")]
    pub score: u8,
    #[serde(rename = "Color")]
    pub color: RatingColor,
    #[serde(rename = "Justification")]
    pub justification: String,
}

#[derive(Deserialize)]
struct RawFactorScore {
    #[serde(rename = "Score", alias = "score", default, deserialize_with = "clamped_score")]
    score: u8,
    #[serde(rename = "Color", alias = "color", default)]
    color: Option<Value>,
    #[serde(rename = "Justification", alias = "justification", default)]
    justification: Option<Value>,
}

impl From<RawFactorScore> for FactorScore {
    fn from(raw: RawFactorScore) -> Self {
        let color = raw
            .color
            .as_ref()
            .and_then(Value::as_str)
            .and_then(RatingColor::parse)
            .unwrap_or_else(|| RatingColor::for_score(raw.score));

        let justification = match raw.justification {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Self {
            score: raw.score,
            color,
            justification,
        }
    }
}

/// Accepts integers, floats and numeric strings; rounds and clamps to 0-10.
/// Anything else ("N/A", null, objects) scores 0.
fn clamped_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number
        .filter(|n| n.is_finite())
        .map_or(0, |n| n.round().clamp(0.0, 10.0) as u8))
}

/// A value in a [`ScoreSet`]: a rubric-shaped score, or whatever else the
/// model put under that key, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScoreEntry {
    Factor(FactorScore),
    Other(Value),
}

impl From<Value> for ScoreEntry {
    fn from(value: Value) -> Self {
        if !value.is_object() {
            return ScoreEntry::Other(value);
        }
        match FactorScore::deserialize(&value) {
            Ok(score) => ScoreEntry::Factor(score),
            Err(_) => ScoreEntry::Other(value),
        }
    }
}

/// Canonical factor name -> score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoreSet(BTreeMap<String, ScoreEntry>);

impl ScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, factor: String, entry: ScoreEntry) -> Option<ScoreEntry> {
        self.0.insert(factor, entry)
    }

    /// The rubric-shaped score under `factor`, if any.
    pub fn get(&self, factor: &str) -> Option<&FactorScore> {
        match self.0.get(factor)? {
            ScoreEntry::Factor(score) => Some(score),
            ScoreEntry::Other(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All keys, including ones that were passed through unscored.
    pub fn factors(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn scored(&self) -> impl Iterator<Item = &FactorScore> {
        self.0.values().filter_map(|entry| match entry {
            ScoreEntry::Factor(score) => Some(score),
            ScoreEntry::Other(_) => None,
        })
    }

    /// Mean factor score, the headline "total score" shown next to a run.
    /// Passed-through entries do not count.
    pub fn average_score(&self) -> Option<f64> {
        let (total, count) = self
            .scored()
            .fold((0.0, 0usize), |(total, count), s| (total + f64::from(s.score), count + 1));
        (count > 0).then(|| total / count as f64)
    }
}
