//! Basic Federex usage
//!
//! Builds a three-shard index on disk, each shard a `docs.txt` of
//! `docid<TAB>text` lines, and searches it with a term-overlap scorer.
//!
//! Run with `RUST_LOG=federex=debug cargo run --example basic_usage` to see
//! the coordinator's shard dispatch.

use federex::{
    CoordinatorConfig, CoordinatorRegistry, FederexError, IndexDefaults, IndexName, LocalShardProvisioner,
    ScoredCandidate, SearchOptions, ShardSearchArgs, ShardSearcher, ShardSearcherFactory, StaticIndexCatalog,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

const SHARDS: [&[(&str, &str)]; 3] = [
    &[
        ("tide-01", "tides are caused by the gravity of the moon"),
        ("rust-01", "rust is a systems programming language"),
    ],
    &[
        ("tide-02", "spring tides happen when sun and moon align"),
        ("bake-01", "bread rises because yeast produces gas"),
    ],
    &[
        ("moon-01", "the moon orbits the earth every 27 days"),
        ("rust-02", "iron rust forms through oxidation"),
    ],
];

/// Scores documents by the fraction of query terms they contain
struct TermOverlapFactory;

struct TermOverlapSearcher {
    docs: Vec<(String, String)>,
}

impl ShardSearcherFactory for TermOverlapFactory {
    fn open(&self, args: &ShardSearchArgs) -> Result<Box<dyn ShardSearcher>, FederexError> {
        let body = std::fs::read_to_string(args.index_path.join("docs.txt"))?;
        let docs = body
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(id, text)| (id.to_string(), text.to_lowercase()))
            .collect();
        Ok(Box::new(TermOverlapSearcher { docs }))
    }
}

impl ShardSearcher for TermOverlapSearcher {
    fn search(&mut self, query: &str, hits: usize) -> Result<Vec<ScoredCandidate>, FederexError> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<ScoredCandidate> = self
            .docs
            .iter()
            .filter_map(|(id, text)| {
                let matched = terms.iter().filter(|t| text.split_whitespace().any(|w| w == t.as_str())).count();
                (matched > 0).then(|| ScoredCandidate::new(id.as_str(), matched as f32 / terms.len() as f32))
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(hits);
        Ok(scored)
    }
}

fn write_shards(root: &Path, index: &IndexName) -> std::io::Result<()> {
    for (ordinal, docs) in SHARDS.iter().enumerate() {
        let dir = root.join(format!("{}-shard{:02}", index, ordinal));
        std::fs::create_dir_all(&dir)?;
        let body: String = docs.iter().map(|(id, text)| format!("{}\t{}\n", id, text)).collect();
        std::fs::write(dir.join("docs.txt"), body)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("Federex Basic Usage Example");
    println!("===========================");

    let temp_dir = TempDir::new()?;
    let index = IndexName::new("demo")?;
    write_shards(temp_dir.path(), &index)?;

    let catalog = StaticIndexCatalog::new().with_index(index.clone(), IndexDefaults::new().ef_search(64));
    let registry = CoordinatorRegistry::new(
        CoordinatorConfig::new().shard_count(SHARDS.len()),
        Arc::new(catalog),
        Arc::new(LocalShardProvisioner::new(temp_dir.path())),
        Arc::new(TermOverlapFactory),
    );

    let coordinator = registry.get_or_create(&index).await?;
    println!(
        "Coordinator ready: {} shards, {} workers",
        coordinator.shard_count(),
        coordinator.pool_size()
    );

    for query in ["moon tides", "rust", "quantum"] {
        let report = coordinator.search_detailed(query, 3, &SearchOptions::default()).await?;
        println!("\nQuery {:?} ({:?}):", query, report.elapsed);
        if report.candidates.is_empty() {
            println!("  no matches");
        }
        for candidate in &report.candidates {
            println!("  {:<8} {:.2}", candidate.docid, candidate.score);
        }
    }

    match registry.get_or_create(&IndexName::new("unknown")?).await {
        Err(e) => println!("\nUnknown index: {}", e),
        Ok(_) => println!("\nUnexpectedly found an unknown index"),
    }

    coordinator.set_threads_per_shard(2)?;
    println!("\nSettings: {}", serde_json::to_string(&coordinator.settings())?);
    println!("Metrics: {:?}", coordinator.metrics());

    Ok(())
}
