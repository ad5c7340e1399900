//! Core type definitions for the concept graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable, unique identifier for a concept
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ConceptId(String);

impl ConceptId {
    pub fn new(id: impl Into<String>) -> Self {
        ConceptId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ConceptId {
    fn from(s: String) -> Self {
        ConceptId(s)
    }
}

impl From<&str> for ConceptId {
    fn from(s: &str) -> Self {
        ConceptId(s.to_string())
    }
}

/// Closed set of concept kinds.
///
/// `Hypothesis` marks synthetic concepts produced by tree expansion.
/// Unrecognised labels deserialize to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ConceptType {
    Method,
    Material,
    Phenomenon,
    Theory,
    Measurement,
    Application,
    Hypothesis,
    Unknown,
}

impl ConceptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConceptType::Method => "method",
            ConceptType::Material => "material",
            ConceptType::Phenomenon => "phenomenon",
            ConceptType::Theory => "theory",
            ConceptType::Measurement => "measurement",
            ConceptType::Application => "application",
            ConceptType::Hypothesis => "hypothesis",
            ConceptType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConceptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConceptType {
    type Err = std::convert::Infallible;

    /// Lenient: anything outside the closed set maps to `Unknown`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "method" => ConceptType::Method,
            "material" => ConceptType::Material,
            "phenomenon" => ConceptType::Phenomenon,
            "theory" => ConceptType::Theory,
            "measurement" => ConceptType::Measurement,
            "application" => ConceptType::Application,
            "hypothesis" => ConceptType::Hypothesis,
            _ => ConceptType::Unknown,
        })
    }
}

impl<'de> Deserialize<'de> for ConceptType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(ConceptType::Unknown))
    }
}

/// Relationship type (open-ended, e.g. "is_a", "uses", "causal")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RelationType(String);

impl RelationType {
    /// Edge linking a synthetic hypothesis concept to one of its source concepts
    pub const HYPOTHESIZED_CONNECTION: &'static str = "hypothesized_connection";

    pub fn new(rel_type: impl Into<String>) -> Self {
        RelationType(rel_type.into())
    }

    pub fn hypothesized_connection() -> Self {
        RelationType::new(Self::HYPOTHESIZED_CONNECTION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RelationType {
    fn from(s: String) -> Self {
        RelationType(s)
    }
}

impl From<&str> for RelationType {
    fn from(s: &str) -> Self {
        RelationType(s.to_string())
    }
}
