//! Noesis CLI: command-line interface for concept-graph exploration
//!
//! Loads a graph export, then analyzes it, predicts candidate links, or runs
//! a full recursive exploration against the configured generation service.

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use noesis::analytics::{CentralityMetric, GraphAnalytics};
use noesis::graph::{load_graph, ConceptGraph};
use noesis::predict::{parse_method, LinkPredictor, PredictionOptions};
use noesis::{ExplorationConfig, ExplorationTree, LLMClient, RecursiveAlchemist};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "noesis", version, about = "Recursive hypothesis exploration over concept graphs")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Graph statistics and most central concepts
    Analyze {
        /// Graph export (JSON)
        #[arg(long)]
        graph: PathBuf,

        /// Centrality metric: degree, pagerank, betweenness, eigenvector
        #[arg(long, default_value = "pagerank")]
        metric: String,

        /// Number of concepts to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Rank unconnected concept pairs by structural similarity
    Predict {
        /// Graph export (JSON)
        #[arg(long)]
        graph: PathBuf,

        /// Similarity method
        #[arg(long, default_value = "jaccard")]
        method: String,

        #[arg(long, default_value_t = 30)]
        top_n: usize,

        #[arg(long, default_value_t = 0.0)]
        min_similarity: f64,

        /// Only pairs of different concept types
        #[arg(long)]
        cross_domain: bool,
    },
    /// Grow a tree of hypothesis layers
    Explore {
        /// Graph export (JSON)
        #[arg(long)]
        graph: PathBuf,

        /// Configuration file (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        max_depth: Option<usize>,

        /// Branches per layer
        #[arg(long)]
        branches: Option<usize>,

        /// Branching criterion: diversity, impact, novelty, feasibility
        #[arg(long)]
        criteria: Option<String>,

        /// Write the full tree as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze { graph, metric, top } => run_analyze(&graph, &metric, top, &cli.format),
        Commands::Predict {
            graph,
            method,
            top_n,
            min_similarity,
            cross_domain,
        } => run_predict(&graph, &method, top_n, min_similarity, cross_domain, &cli.format),
        Commands::Explore {
            graph,
            config,
            max_depth,
            branches,
            criteria,
            output,
        } => {
            run_explore(
                &graph,
                config.as_deref(),
                max_depth,
                branches,
                criteria,
                output.as_deref(),
                &cli.format,
            )
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn read_graph(path: &Path) -> Result<ConceptGraph, Box<dyn std::error::Error>> {
    let (graph, report) = load_graph(path)?;
    if report.concepts_skipped + report.relationships_skipped > 0 {
        eprintln!(
            "Skipped {} concept(s) and {} relationship(s) while loading {}",
            report.concepts_skipped,
            report.relationships_skipped,
            path.display()
        );
    }
    Ok(graph)
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn run_analyze(
    path: &Path,
    metric: &str,
    top: usize,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let metric: CentralityMetric = metric.parse()?;
    let graph = read_graph(path)?;
    let analytics = GraphAnalytics::new(&graph);
    let stats = analytics.statistics();
    let ranked = analytics.top_concepts(metric, top);

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "statistics": stats,
                "metric": metric,
                "top_concepts": ranked,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            println!("Concepts:      {}", stats.num_nodes);
            println!("Relationships: {}", stats.num_edges);
            println!("Density:       {:.4}", stats.density);
            println!("Components:    {}", stats.num_connected_components);
            println!("Clustering:    {:.4}", stats.average_clustering);

            let mut table = new_table(&["#", "concept", "name", "type", metric.as_str()]);
            for (rank, r) in ranked.iter().enumerate() {
                let (name, concept_type) = graph
                    .concept(&r.id)
                    .map(|c| (c.name.clone(), c.concept_type.to_string()))
                    .unwrap_or_default();
                table.add_row(vec![
                    (rank + 1).to_string(),
                    r.id.to_string(),
                    name,
                    concept_type,
                    format!("{:.4}", r.score),
                ]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}

fn run_predict(
    path: &Path,
    method: &str,
    top_n: usize,
    min_similarity: f64,
    cross_domain: bool,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = PredictionOptions {
        method: parse_method(method)?,
        top_n,
        min_similarity,
        cross_domain_only: cross_domain,
        ..Default::default()
    };
    let graph = read_graph(path)?;
    let links = LinkPredictor::new(&graph).predict(&options);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&links)?);
        }
        OutputFormat::Table => {
            if links.is_empty() {
                println!("(no candidate links)");
                return Ok(());
            }
            let mut table = new_table(&["source", "target", "types", "score", "shared"]);
            for link in &links {
                table.add_row(vec![
                    link.source_name.clone(),
                    link.target_name.clone(),
                    format!("{} x {}", link.source_type, link.target_type),
                    format!("{:.4}", link.score),
                    link.common_neighbors.len().to_string(),
                ]);
            }
            println!("{}", table);
            println!("{} candidate link(s)", links.len());
        }
    }
    Ok(())
}

async fn run_explore(
    path: &Path,
    config_path: Option<&Path>,
    max_depth: Option<usize>,
    branches: Option<usize>,
    criteria: Option<String>,
    output: Option<&Path>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(p) => ExplorationConfig::from_file(p)?,
        None => ExplorationConfig::default(),
    };
    config.apply_env();
    if let Some(depth) = max_depth {
        config.recursion.max_depth = depth;
    }
    if let Some(b) = branches {
        config.recursion.branches_per_layer = b;
    }
    if let Some(c) = criteria {
        config.recursion.branching_criteria = c;
    }

    let graph = read_graph(path)?;
    let client = LLMClient::new(&config.llm)?;
    let alchemist = RecursiveAlchemist::with_generator(Arc::new(client), config)?;
    let tree = alchemist.explore(&graph).await;

    if let Some(out) = output {
        tree.save(out)?;
        eprintln!("Tree written to {}", out.display());
    }

    match format {
        OutputFormat::Json => println!("{}", tree.to_json_pretty()?),
        OutputFormat::Table => print_tree(&tree),
    }
    Ok(())
}

fn print_tree(tree: &ExplorationTree) {
    let mut table = new_table(&["layer", "parent", "branch", "depth", "state", "hypotheses", "best"]);
    for layer in &tree.layers {
        let state = match layer.termination {
            Some(reason) => format!("{:?} ({:?})", layer.state, reason),
            None => format!("{:?}", layer.state),
        };
        let best = layer
            .hypotheses
            .first()
            .map(|h| format!("{:.3} {}", h.combined_score, h.hypothesis.title))
            .unwrap_or_default();
        table.add_row(vec![
            layer.layer_id.to_string(),
            layer
                .parent_layer_id
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            layer.branch_name.clone(),
            layer.depth.to_string(),
            state,
            layer.hypotheses.len().to_string(),
            best,
        ]);
    }
    println!("{}", table);
    println!(
        "{} layer(s), {} hypotheses, {} generation call(s), {} failure(s)",
        tree.len(),
        tree.total_hypotheses(),
        tree.metadata.generation_calls,
        tree.metadata.generation_failures
    );
}
