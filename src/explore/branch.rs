//! Branch partitioning
//!
//! Splits a layer's hypotheses into at most `k` groups. Members are indices
//! into the layer's hypothesis list; every hypothesis lands in exactly one
//! group and groups are never empty.

use super::layer::LayerHypothesis;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BranchingError {
    #[error("Unknown branching criterion: {0} (expected diversity, impact, novelty or feasibility)")]
    UnknownCriterion(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchingCriterion {
    /// Group by the concept-type pair of the originating candidate
    Diversity,
    Impact,
    Novelty,
    Feasibility,
}

impl BranchingCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchingCriterion::Diversity => "diversity",
            BranchingCriterion::Impact => "impact",
            BranchingCriterion::Novelty => "novelty",
            BranchingCriterion::Feasibility => "feasibility",
        }
    }

    fn score(&self, hypothesis: &LayerHypothesis) -> f64 {
        let record = &hypothesis.hypothesis;
        match self {
            BranchingCriterion::Impact => record.impact_score,
            BranchingCriterion::Novelty => record.novelty_score,
            BranchingCriterion::Feasibility => record.feasibility_score,
            BranchingCriterion::Diversity => hypothesis.combined_score,
        }
    }
}

impl fmt::Display for BranchingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchingCriterion {
    type Err = BranchingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diversity" => Ok(BranchingCriterion::Diversity),
            "impact" => Ok(BranchingCriterion::Impact),
            "novelty" => Ok(BranchingCriterion::Novelty),
            "feasibility" => Ok(BranchingCriterion::Feasibility),
            _ => Err(BranchingError::UnknownCriterion(s.to_string())),
        }
    }
}

/// A named group of hypothesis indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    /// Ascending indices into the parent layer's hypotheses
    pub members: Vec<usize>,
}

impl Branch {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition `hypotheses` into at most `k` non-empty branches
pub fn partition(hypotheses: &[LayerHypothesis], criterion: BranchingCriterion, k: usize) -> Vec<Branch> {
    if hypotheses.is_empty() || k == 0 {
        return Vec::new();
    }
    match criterion {
        BranchingCriterion::Diversity => by_type_pair(hypotheses, k),
        _ => by_score_buckets(hypotheses, criterion, k),
    }
}

fn by_type_pair(hypotheses: &[LayerHypothesis], k: usize) -> Vec<Branch> {
    let mut groups: Vec<((String, String), Vec<usize>)> = Vec::new();
    for (idx, h) in hypotheses.iter().enumerate() {
        let a = h.link.source_type.as_str().to_string();
        let b = h.link.target_type.as_str().to_string();
        let key = if a <= b { (a, b) } else { (b, a) };
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(idx),
            None => groups.push((key, vec![idx])),
        }
    }

    let mut branches: Vec<Branch> = groups
        .into_iter()
        .map(|((a, b), members)| Branch {
            name: format!("Branch-{}x{}", a, b),
            members,
        })
        .collect();

    while branches.len() > k {
        merge_two_smallest(&mut branches);
    }
    branches
}

/// Merge the two smallest branches into the position of the earlier one.
/// On equal sizes later branches are merged first.
fn merge_two_smallest(branches: &mut Vec<Branch>) {
    let mut order: Vec<usize> = (0..branches.len()).collect();
    order.sort_by_key(|&i| (branches[i].len(), Reverse(i)));
    let (first, second) = if order[0] < order[1] {
        (order[0], order[1])
    } else {
        (order[1], order[0])
    };

    let absorbed = branches.remove(second);
    let target = &mut branches[first];
    target.name = format!("{}+{}", target.name, absorbed.name.trim_start_matches("Branch-"));
    target.members.extend(absorbed.members);
    target.members.sort_unstable();
}

fn by_score_buckets(hypotheses: &[LayerHypothesis], criterion: BranchingCriterion, k: usize) -> Vec<Branch> {
    let n = hypotheses.len();
    let mut order: Vec<usize> = (0..n).collect();
    // Stable: equal scores keep layer order
    order.sort_by(|&a, &b| {
        criterion
            .score(&hypotheses[b])
            .partial_cmp(&criterion.score(&hypotheses[a]))
            .unwrap_or(Ordering::Equal)
    });

    let buckets = k.min(3).min(n);
    let labels: &[&str] = match buckets {
        1 => &["high"],
        2 => &["high", "low"],
        _ => &["high", "medium", "low"],
    };

    let mut branches = Vec::with_capacity(buckets);
    let mut start = 0;
    for (b, label) in labels.iter().enumerate().take(buckets) {
        let size = n / buckets + usize::from(b < n % buckets);
        let mut members = order[start..start + size].to_vec();
        members.sort_unstable();
        start += size;
        branches.push(Branch {
            name: format!("Branch-{}-{}", criterion, label),
            members,
        });
    }
    branches
}
