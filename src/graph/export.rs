//! Graph export format
//!
//! JSON document produced by the ingestion pipeline:
//! `{ "entities": [...], "relationships": [...] }`. Entity ids default to
//! the entity name. Loading is best-effort: malformed records are skipped
//! and counted instead of failing the whole import.

use super::concept::Concept;
use super::relationship::Relationship;
use super::store::{ConceptGraph, GraphError};
use super::types::{ConceptId, ConceptType, RelationType};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type ExportResult<T> = Result<T, ExportError>;

fn default_confidence() -> f64 {
    1.0
}

/// One exported concept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default = "unknown_type")]
    pub concept_type: ConceptType,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn unknown_type() -> ConceptType {
    ConceptType::Unknown
}

/// One exported relationship (endpoints are entity ids)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Serialisable graph document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphExport {
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

/// Outcome of a best-effort import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub concepts_added: usize,
    pub concepts_skipped: usize,
    pub relationships_added: usize,
    pub relationships_skipped: usize,
}

impl GraphExport {
    /// Capture a graph in export form
    pub fn from_graph(graph: &ConceptGraph) -> Self {
        let entities = graph
            .concepts()
            .map(|c| EntityRecord {
                id: (c.id.as_str() != c.name).then(|| c.id.to_string()),
                name: c.name.clone(),
                concept_type: c.concept_type,
                description: c.description.clone(),
                confidence: c.confidence,
            })
            .collect();
        let relationships = graph
            .relationships()
            .iter()
            .map(|r| RelationshipRecord {
                source: r.source.to_string(),
                target: r.target.to_string(),
                rel_type: r.rel_type.to_string(),
                confidence: r.confidence,
                context: r.context.clone(),
            })
            .collect();
        GraphExport {
            entities,
            relationships,
        }
    }

    /// Build a graph, skipping records the graph rejects
    pub fn into_graph(self) -> (ConceptGraph, LoadReport) {
        let mut graph = ConceptGraph::new();
        let mut report = LoadReport::default();

        for entity in self.entities {
            let id = entity.id.unwrap_or_else(|| entity.name.clone());
            let concept = Concept {
                id: ConceptId::new(id),
                name: entity.name,
                concept_type: entity.concept_type,
                description: entity.description,
                confidence: entity.confidence,
            };
            match graph.add_concept(concept) {
                Ok(()) => report.concepts_added += 1,
                Err(e) => {
                    warn!("Skipping entity: {}", e);
                    report.concepts_skipped += 1;
                }
            }
        }

        for record in self.relationships {
            let relationship = Relationship {
                source: ConceptId::new(record.source),
                target: ConceptId::new(record.target),
                rel_type: RelationType::new(record.rel_type),
                confidence: record.confidence,
                context: record.context.filter(|c| !c.is_empty()),
            };
            match graph.add_relationship(relationship) {
                Ok(()) => report.relationships_added += 1,
                Err(e) => {
                    warn!("Skipping relationship: {}", e);
                    report.relationships_skipped += 1;
                }
            }
        }

        (graph, report)
    }

    pub fn from_json(json: &str) -> ExportResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load a graph export from disk
pub fn load_graph(path: impl AsRef<Path>) -> ExportResult<(ConceptGraph, LoadReport)> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let (graph, report) = GraphExport::from_json(&json)?.into_graph();
    info!(
        "Loaded graph from {:?}: {} concepts, {} relationships ({} records skipped)",
        path,
        report.concepts_added,
        report.relationships_added,
        report.concepts_skipped + report.relationships_skipped
    );
    Ok((graph, report))
}

/// Write a graph export to disk, creating parent directories
pub fn save_graph(graph: &ConceptGraph, path: impl AsRef<Path>) -> ExportResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, GraphExport::from_graph(graph).to_json_pretty()?)?;
    info!("Graph saved to {:?}", path);
    Ok(())
}
