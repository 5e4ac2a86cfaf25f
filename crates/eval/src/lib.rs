pub mod consistency;
pub mod subjectivity;

pub use consistency::{ConsistencyFlag, Flag, RunScore, ScoreRun, consistency_flag};
pub use subjectivity::{
    CategoryTable, EvaluationRecord, RubricDrift, SubjectivityReport, rubric_drift, subjectivity,
};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Largest magnitude at which every integral f64 is exact.
const MAX_EXACT_FLOAT_ID: f64 = 9_007_199_254_740_992.0;

/// Evaluator and startup ids arrive as strings or numbers depending on the caller.
/// Integral floats collapse to the integer form, so `1` and `1.0` are one id.
pub(crate) fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT_ID => {
                (f as i64).to_string()
            }
            _ => n.to_string(),
        }),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}
