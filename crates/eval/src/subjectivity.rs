//! Inter-evaluator subjectivity over historical rubric scores.
//!
//! All functions are pure: they take a slice of records and build new tables.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::id_string;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    #[serde(deserialize_with = "id_string")]
    pub evaluator_id: String,
    #[serde(deserialize_with = "id_string")]
    pub startup_id: String,
    pub category: String,
    pub score: f64,
}

/// evaluator -> category -> statistic
pub type CategoryTable = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubjectivityReport {
    /// Sample standard deviation of each evaluator's scores per category.
    /// Every evaluator gets every category; fewer than two scores reads as 0.
    pub category_std_dev: CategoryTable,
    /// Mean of |score - consensus| over each evaluator's records.
    pub mean_abs_deviation: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RubricDrift {
    /// Evaluator's category mean minus the cross-evaluator mean for that
    /// category. Only categories the evaluator scored appear.
    pub drift: CategoryTable,
    pub mean_abs_drift: BTreeMap<String, f64>,
}

pub fn subjectivity(records: &[EvaluationRecord]) -> SubjectivityReport {
    SubjectivityReport {
        category_std_dev: category_std_dev(records),
        mean_abs_deviation: mean_abs_deviation(records),
    }
}

fn category_std_dev(records: &[EvaluationRecord]) -> CategoryTable {
    let categories: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();

    let mut groups: HashMap<(&str, &str), Vec<f64>> = HashMap::new();
    for record in records {
        groups
            .entry((record.evaluator_id.as_str(), record.category.as_str()))
            .or_insert_with(Vec::new)
            .push(record.score);
    }

    let evaluators: BTreeSet<&str> = records.iter().map(|r| r.evaluator_id.as_str()).collect();

    evaluators
        .into_iter()
        .map(|evaluator| {
            let row = categories
                .iter()
                .map(|&category| {
                    let std_dev = groups
                        .get(&(evaluator, category))
                        .map(|scores| sample_std_dev(scores))
                        .unwrap_or(0.0);
                    (category.to_string(), std_dev)
                })
                .collect();
            (evaluator.to_string(), row)
        })
        .collect()
}

// Undefined for a single observation; reported as 0 so callers always get a number.
fn sample_std_dev(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    statistical::standard_deviation(scores, None)
}

fn mean_abs_deviation(records: &[EvaluationRecord]) -> BTreeMap<String, f64> {
    let mut consensus_groups: HashMap<(&str, &str), Vec<f64>> = HashMap::new();
    for record in records {
        consensus_groups
            .entry((record.startup_id.as_str(), record.category.as_str()))
            .or_insert_with(Vec::new)
            .push(record.score);
    }

    let consensus: HashMap<(&str, &str), f64> = consensus_groups
        .into_iter()
        .map(|(key, scores)| (key, statistical::mean(&scores)))
        .collect();

    let mut deviations: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        let group_mean = consensus[&(record.startup_id.as_str(), record.category.as_str())];
        deviations
            .entry(record.evaluator_id.as_str())
            .or_insert_with(Vec::new)
            .push((record.score - group_mean).abs());
    }

    deviations
        .into_iter()
        .map(|(evaluator, devs)| (evaluator.to_string(), statistical::mean(&devs)))
        .collect()
}

pub fn rubric_drift(records: &[EvaluationRecord]) -> RubricDrift {
    let mut cells: BTreeMap<&str, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();
    for record in records {
        cells
            .entry(record.evaluator_id.as_str())
            .or_default()
            .entry(record.category.as_str())
            .or_insert_with(Vec::new)
            .push(record.score);
    }

    // evaluator x category pivot of mean scores
    let pivot: BTreeMap<&str, BTreeMap<&str, f64>> = cells
        .into_iter()
        .map(|(evaluator, row)| {
            let means = row
                .into_iter()
                .map(|(category, scores)| (category, statistical::mean(&scores)))
                .collect();
            (evaluator, means)
        })
        .collect();

    let mut columns: HashMap<&str, Vec<f64>> = HashMap::new();
    for row in pivot.values() {
        for (&category, &mean) in row {
            columns.entry(category).or_insert_with(Vec::new).push(mean);
        }
    }
    let column_means: HashMap<&str, f64> = columns
        .into_iter()
        .map(|(category, means)| (category, statistical::mean(&means)))
        .collect();

    let mut drift = CategoryTable::new();
    let mut mean_abs_drift = BTreeMap::new();

    for (evaluator, row) in pivot {
        let centered: BTreeMap<String, f64> = row
            .into_iter()
            .map(|(category, mean)| (category.to_string(), mean - column_means[category]))
            .collect();

        let abs: Vec<f64> = centered.values().map(|d| d.abs()).collect();
        mean_abs_drift.insert(evaluator.to_string(), statistical::mean(&abs));
        drift.insert(evaluator.to_string(), centered);
    }

    tracing::debug!(evaluators = drift.len(), "Computed rubric drift");

    RubricDrift { drift, mean_abs_drift }
}
