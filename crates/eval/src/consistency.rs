use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::id_string;

/// A single category score inside a run. Non-numeric scores arrive as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunScore {
    #[serde(rename = "Score", alias = "score", default)]
    pub score: Option<f64>,
}

/// One evaluator's complete score set for one startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRun {
    #[serde(deserialize_with = "id_string", default)]
    pub startup_id: String,
    #[serde(deserialize_with = "id_string", default)]
    pub evaluator_id: String,
    #[serde(default)]
    pub scores: BTreeMap<String, RunScore>,
    #[serde(rename = "totalScore", alias = "total_score", default)]
    pub total_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Flag {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyFlag {
    pub flag: Flag,
    pub reason: String,
    pub std_dev: f64,
}

impl ConsistencyFlag {
    fn new(flag: Flag, reason: &str, std_dev: f64) -> Self {
        Self { flag, reason: reason.to_string(), std_dev }
    }
}

/// Classify a history of runs. Returns `None` when there is nothing to judge.
pub fn consistency_flag(runs: &[ScoreRun]) -> Option<ConsistencyFlag> {
    if runs.is_empty() {
        return None;
    }

    let totals: Vec<f64> = runs.iter().filter_map(|run| run.total_score).collect();
    let std_dev = population_std_dev(&totals);

    let flag = if let [run] = runs {
        // Missing scores count against the single run.
        let domains: Vec<f64> = run.scores.values().map(|s| s.score.unwrap_or(0.0)).collect();

        if domains.iter().all(|&v| v >= 8.0) {
            ConsistencyFlag::new(Flag::Green, "Only one score, all domains >= 8", std_dev)
        } else if domains.iter().any(|&v| v < 5.0) {
            ConsistencyFlag::new(Flag::Yellow, "Only one score, at least one domain < 5", std_dev)
        } else {
            ConsistencyFlag::new(Flag::Green, "Only one score, standard deviation = 0", std_dev)
        }
    } else {
        let domain_scores = || runs.iter().flat_map(|run| run.scores.values().filter_map(|s| s.score));
        let low5 = domain_scores().filter(|&v| v < 5.0).count();
        let low7 = domain_scores().filter(|&v| v < 7.0).count();

        if std_dev > 2.5 || low5 >= 2 {
            ConsistencyFlag::new(Flag::Red, "Score std. deviation > 2.5 or 2+ domains < 5", std_dev)
        } else if std_dev > 1.5 || low7 >= 1 {
            ConsistencyFlag::new(Flag::Yellow, "Std. deviation > 1.5 or a domain < 7", std_dev)
        } else if totals.iter().all(|&v| v >= 8.0) {
            ConsistencyFlag::new(Flag::Green, "Balanced scores, std. deviation <= 1.5 and all totals >= 8", std_dev)
        } else {
            ConsistencyFlag::new(Flag::Green, "Balanced scores, std. deviation <= 1.5", std_dev)
        }
    };

    tracing::debug!(runs = runs.len(), flag = ?flag.flag, std_dev, "Computed consistency flag");

    Some(flag)
}

fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    statistical::population_standard_deviation(values, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(total: Option<f64>, scores: &[(&str, Option<f64>)]) -> ScoreRun {
        ScoreRun {
            startup_id: "1".to_string(),
            evaluator_id: "7".to_string(),
            scores: scores
                .iter()
                .map(|(k, v)| (k.to_string(), RunScore { score: *v }))
                .collect(),
            total_score: total,
        }
    }

    #[test]
    fn test_no_runs() {
        assert_eq!(consistency_flag(&[]), None);
    }

    #[test]
    fn test_single_run_rules() {
        let strong = run(Some(9.0), &[("Team", Some(9.0)), ("Traction", Some(8.0))]);
        let flag = consistency_flag(&[strong]).unwrap();
        assert_eq!(flag.flag, Flag::Green);
        assert_eq!(flag.std_dev, 0.0);

        let weak = run(Some(6.0), &[("Team", Some(9.0)), ("Traction", Some(4.0))]);
        assert_eq!(consistency_flag(&[weak]).unwrap().flag, Flag::Yellow);

        let middling = run(Some(6.0), &[("Team", Some(6.0)), ("Traction", Some(7.0))]);
        let flag = consistency_flag(&[middling]).unwrap();
        assert_eq!(flag.flag, Flag::Green);
        assert!(flag.reason.contains("standard deviation = 0"));
    }

    #[test]
    fn test_single_run_missing_score_counts_as_zero() {
        let partial = run(None, &[("Team", Some(9.0)), ("Traction", None)]);
        assert_eq!(consistency_flag(&[partial]).unwrap().flag, Flag::Yellow);
    }

    #[test]
    fn test_spread_totals_are_red() {
        // totals 4 and 10: population std = 3
        let runs = vec![
            run(Some(4.0), &[("Team", Some(8.0))]),
            run(Some(10.0), &[("Team", Some(8.0))]),
        ];

        let flag = consistency_flag(&runs).unwrap();

        assert_eq!(flag.flag, Flag::Red);
        assert!((flag.std_dev - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_low_domains_are_red() {
        let runs = vec![
            run(Some(7.0), &[("Team", Some(4.0)), ("Risk", Some(9.0))]),
            run(Some(7.0), &[("Team", Some(3.0)), ("Risk", Some(9.0))]),
        ];
        assert_eq!(consistency_flag(&runs).unwrap().flag, Flag::Red);
    }

    #[test]
    fn test_moderate_spread_is_yellow() {
        // totals 6 and 10: population std = 2
        let runs = vec![
            run(Some(6.0), &[("Team", Some(8.0))]),
            run(Some(10.0), &[("Team", Some(9.0))]),
        ];
        assert_eq!(consistency_flag(&runs).unwrap().flag, Flag::Yellow);

        let one_below_seven = vec![
            run(Some(8.0), &[("Team", Some(6.0))]),
            run(Some(8.0), &[("Team", Some(9.0))]),
        ];
        assert_eq!(consistency_flag(&one_below_seven).unwrap().flag, Flag::Yellow);
    }

    #[test]
    fn test_balanced_runs_are_green() {
        let runs = vec![
            run(Some(8.0), &[("Team", Some(8.0)), ("Risk", None)]),
            run(Some(9.0), &[("Team", Some(9.0))]),
            run(None, &[("Team", Some(8.0))]),
        ];

        let flag = consistency_flag(&runs).unwrap();

        assert_eq!(flag.flag, Flag::Green);
        assert!(flag.reason.contains("all totals >= 8"));
        assert!((flag.std_dev - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_deserializes_frontend_shape() {
        let runs: Vec<ScoreRun> = serde_json::from_str(
            r#"[{"startup_id": 3, "evaluator_id": 11,
                 "scores": {"Team": {"Score": 8}, "Risk": {"Score": null}},
                 "totalScore": 7.5}]"#,
        )
        .unwrap();

        assert_eq!(runs[0].startup_id, "3");
        assert_eq!(runs[0].scores["Team"].score, Some(8.0));
        assert_eq!(runs[0].scores["Risk"].score, None);
        assert_eq!(runs[0].total_score, Some(7.5));
    }
}
