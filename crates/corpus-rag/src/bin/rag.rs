//! Command-line driver for the corpus RAG pipeline

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use corpus_rag::indexing::IndexingPipeline;
use corpus_rag::ingestion::{load_chunks, save_chunks, DocumentPipeline};
use corpus_rag::providers::{InMemoryVectorStore, OpenAiCompatEmbedder};
use corpus_rag::quality::QualityAnalyzer;
use corpus_rag::RagConfig;

#[derive(Parser)]
#[command(name = "rag", about = "Multi-document RAG ingestion and retrieval")]
struct Cli {
    /// Path to the TOML configuration file; defaults to the bundled corpus
    /// registry rooted at --data-dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Corpus directory used when no config file is given
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load, chunk and save the processed chunk artifact
    Ingest {
        /// Output path for the chunk artifact
        #[arg(long, default_value = "processed_chunks.json")]
        output: PathBuf,
    },
    /// Run quality diagnostics over a chunk artifact
    Analyze {
        /// Chunk artifact to analyze
        #[arg(long, default_value = "processed_chunks.json")]
        input: PathBuf,
    },
    /// Ingest, embed, index and answer one retrieval query
    Query {
        /// The question to retrieve context for
        question: String,
        /// Number of chunks to retrieve
        #[arg(long)]
        top_k: Option<usize>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<RagConfig> {
    match &cli.config {
        Some(path) => RagConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(RagConfig::with_default_corpus(&cli.data_dir)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Ingest { output } => {
            let pipeline = DocumentPipeline::new(config)?;
            let corpus = pipeline.process_documents();
            save_chunks(&corpus.chunks, &output)?;
            println!("{}", corpus.stats.render());
            println!("Saved {} chunks to {}", corpus.chunks.len(), output.display());
        }
        Command::Analyze { input } => {
            let chunks = load_chunks(&input)
                .with_context(|| format!("failed to load chunks from {}", input.display()))?;
            let report = QualityAnalyzer::new(&chunks).analyze();
            println!("{}", report.render());
        }
        Command::Query { question, top_k } => {
            let top_k = top_k.unwrap_or(config.retrieval.top_k);
            let threshold = config.retrieval.similarity_threshold;

            let embedder = OpenAiCompatEmbedder::from_config(&config.embedding)?;
            let store = InMemoryVectorStore::new();

            let pipeline = DocumentPipeline::new(config)?;
            let corpus = pipeline.process_documents();

            let indexer = IndexingPipeline::new(&embedder, &store);
            let summary = indexer.index_chunks(&corpus.chunks).await?;
            println!("Indexed {} chunks", summary.total_in_index);

            let results = indexer.retrieve(&question, top_k, None).await?;
            if results.is_empty() {
                println!("No matching chunks found.");
            }
            for (rank, result) in results.iter().enumerate() {
                if result.similarity < threshold {
                    continue;
                }
                println!(
                    "\n{}. {} (relevance: {:.3})",
                    rank + 1,
                    result.citation(),
                    result.similarity
                );
                let preview: String = result.chunk.text.chars().take(300).collect();
                println!("   {preview}");
            }
        }
    }

    Ok(())
}
