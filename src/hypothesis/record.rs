//! Hypothesis record and quality thresholds

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Weights of the combined score (novelty, impact, feasibility).
/// A ranking policy favouring novel, high-impact ideas.
pub const NOVELTY_WEIGHT: f64 = 0.4;
pub const IMPACT_WEIGHT: f64 = 0.4;
pub const FEASIBILITY_WEIGHT: f64 = 0.2;

/// A generated research hypothesis. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisRecord {
    pub title: String,
    pub rationale: String,
    pub research_direction: String,
    pub mechanism: String,
    /// Ordered list of concrete follow-up steps
    pub next_steps: Vec<String>,
    pub novelty_score: f64,
    pub feasibility_score: f64,
    pub impact_score: f64,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

impl HypothesisRecord {
    /// `0.4 * novelty + 0.4 * impact + 0.2 * feasibility`
    pub fn combined_score(&self) -> f64 {
        NOVELTY_WEIGHT * self.novelty_score
            + IMPACT_WEIGHT * self.impact_score
            + FEASIBILITY_WEIGHT * self.feasibility_score
    }
}

/// Minimum scores a hypothesis must reach to be kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub min_novelty: f64,
    pub min_feasibility: f64,
    pub min_impact: f64,
}

impl QualityThresholds {
    pub fn accepts(&self, record: &HypothesisRecord) -> bool {
        record.novelty_score >= self.min_novelty
            && record.feasibility_score >= self.min_feasibility
            && record.impact_score >= self.min_impact
    }

    pub fn is_active(&self) -> bool {
        self.min_novelty > 0.0 || self.min_feasibility > 0.0 || self.min_impact > 0.0
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("min_novelty", self.min_novelty),
            ("min_feasibility", self.min_feasibility),
            ("min_impact", self.min_impact),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("threshold {} = {} is outside [0, 1]", name, value));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(title: &str, novelty: f64, feasibility: f64, impact: f64) -> HypothesisRecord {
        HypothesisRecord {
            title: title.to_string(),
            rationale: "shared neighbors suggest a mechanism".to_string(),
            research_direction: "run a pilot study".to_string(),
            mechanism: "transfer of structure".to_string(),
            next_steps: vec!["survey".to_string(), "prototype".to_string()],
            novelty_score: novelty,
            feasibility_score: feasibility,
            impact_score: impact,
            keywords: BTreeSet::new(),
        }
    }

    #[test]
    fn test_combined_score_weights() {
        let r = record("t", 1.0, 0.0, 0.0);
        assert!((r.combined_score() - 0.4).abs() < 1e-12);
        let r = record("t", 0.5, 1.0, 0.25);
        assert!((r.combined_score() - (0.2 + 0.1 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_thresholds() {
        let thresholds = QualityThresholds {
            min_novelty: 0.5,
            min_feasibility: 0.0,
            min_impact: 0.3,
        };
        assert!(thresholds.accepts(&record("ok", 0.5, 0.0, 0.3)));
        assert!(!thresholds.accepts(&record("low impact", 0.9, 0.9, 0.29)));
        assert!(thresholds.is_active());
        assert!(!QualityThresholds::default().is_active());

        let bad = QualityThresholds { min_impact: -0.1, ..Default::default() };
        assert!(bad.validate().is_err());
    }
}
