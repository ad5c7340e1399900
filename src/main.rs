use anyhow::Context;
use noesis::analytics::{CentralityMetric, GraphAnalytics};
use noesis::graph::{Concept, ConceptGraph, ConceptType, Relationship};
use noesis::predict::{LinkPredictor, PredictionOptions};
use noesis::{ExplorationConfig, LLMClient, RecursiveAlchemist};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Noesis v{}", noesis::version());
    println!("==========================================");
    println!();

    // Demo 1: Concept graph
    let graph = demo_concept_graph()?;

    // Demo 2: Analytics
    demo_analytics(&graph);

    // Demo 3: Link prediction
    demo_link_prediction(&graph);

    // Demo 4: Recursive exploration (needs a reachable generation service)
    match std::env::args().nth(1) {
        Some(config_path) => demo_exploration(&graph, &config_path).await?,
        None => {
            println!("\n=== Demo 4: Recursive Exploration ===");
            println!("Pass a config file to run it against a generation service:");
            println!("  noesis config.yaml");
        }
    }

    Ok(())
}

fn demo_concept_graph() -> anyhow::Result<ConceptGraph> {
    println!("=== Demo 1: Concept Graph ===");
    let mut graph = ConceptGraph::new();

    let concepts = [
        ("gnn", "Graph Neural Network", ConceptType::Method, "Message passing over graph structure"),
        ("diffusion", "Diffusion Model", ConceptType::Method, "Generative model by iterative denoising"),
        ("percolation", "Percolation Theory", ConceptType::Theory, "Connectivity of random media"),
        ("porous", "Porous Media", ConceptType::Material, "Solids permeated by pores"),
        ("protein", "Protein Folding", ConceptType::Phenomenon, "Chain to native structure"),
        ("cryoem", "Cryo-EM", ConceptType::Measurement, "Electron microscopy at cryogenic temperature"),
        ("drug", "Drug Discovery", ConceptType::Application, "Finding new therapeutic compounds"),
    ];
    for (id, name, concept_type, description) in concepts {
        graph.add_concept(Concept::new(id, name, concept_type).with_description(description))?;
        println!("✓ Added {} ({})", name, concept_type);
    }

    let relationships = [
        ("gnn", "porous", "applied_to"),
        ("percolation", "porous", "describes"),
        ("gnn", "protein", "predicts"),
        ("diffusion", "protein", "generates"),
        ("cryoem", "protein", "measures"),
        ("diffusion", "drug", "used_in"),
        ("protein", "drug", "informs"),
    ];
    for (source, target, rel_type) in relationships {
        graph
            .add_relationship(Relationship::new(source, target, rel_type))
            .with_context(|| format!("adding {} -> {}", source, target))?;
    }

    // Integrity violations reject the single operation
    if let Err(e) = graph.add_concept(Concept::new("gnn", "Duplicate", ConceptType::Method)) {
        println!("✓ Rejected: {}", e);
    }

    println!("\nGraph Statistics:");
    println!("  Total concepts: {}", graph.concept_count());
    println!("  Total relationships: {}", graph.relationship_count());
    Ok(graph)
}

fn demo_analytics(graph: &ConceptGraph) {
    println!("\n=== Demo 2: Graph Analytics ===");
    let analytics = GraphAnalytics::new(graph);

    let stats = analytics.statistics();
    println!("  Density: {:.4}", stats.density);
    println!("  Connected: {}", stats.is_connected);
    println!("  Average clustering: {:.4}", stats.average_clustering);

    println!("\nTop concepts by PageRank:");
    for ranked in analytics.top_concepts(CentralityMetric::PageRank, 3) {
        println!("  {:<12} {:.4}", ranked.id.as_str(), ranked.score);
    }

    let communities = analytics.detect_communities();
    println!(
        "\n{} communities (modularity {:.4})",
        communities.count(),
        communities.modularity
    );
}

fn demo_link_prediction(graph: &ConceptGraph) {
    println!("\n=== Demo 3: Link Prediction ===");
    let predictor = LinkPredictor::new(graph);
    let options = PredictionOptions {
        top_n: 5,
        cross_domain_only: true,
        ..Default::default()
    };

    for link in predictor.predict(&options) {
        println!(
            "  {} <-> {}  {:.4}  ({} x {}, {} shared)",
            link.source_name,
            link.target_name,
            link.score,
            link.source_type,
            link.target_type,
            link.common_neighbors.len()
        );
    }
}

async fn demo_exploration(graph: &ConceptGraph, config_path: &str) -> anyhow::Result<()> {
    println!("\n=== Demo 4: Recursive Exploration ===");
    let mut config = ExplorationConfig::from_file(config_path)
        .with_context(|| format!("loading {}", config_path))?;
    config.apply_env();

    let client = LLMClient::new(&config.llm)?;
    println!("Using {:?} model {}", client.provider(), client.model());

    let alchemist = RecursiveAlchemist::with_generator(Arc::new(client), config)?;
    let tree = alchemist.explore(graph).await;

    for layer in &tree.layers {
        println!(
            "  Layer {} [{}] depth {} parent {:?}: {} hypotheses",
            layer.layer_id,
            layer.branch_name,
            layer.depth,
            layer.parent_layer_id,
            layer.hypotheses.len()
        );
        for h in layer.hypotheses.iter().take(3) {
            println!("    {:.3}  {}", h.combined_score, h.hypothesis.title);
        }
    }
    println!(
        "\n{} layers, {} hypotheses, {} generation calls",
        tree.len(),
        tree.total_hypotheses(),
        tree.metadata.generation_calls
    );
    Ok(())
}
