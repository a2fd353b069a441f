// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use askem::utils::logging::{format_error, format_heading, format_success, format_warning};
use askem::{
    BatchImporter, Config, DocumentQuery, JsonExporter, RagPipeline, SchemaManager, Validator,
    WeaviateClient,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "askem")]
#[command(version)]
#[command(about = "Retrieval-augmented generation over a Weaviate passage store", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = askem::config::DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct QueryArgs {
    /// Question used as the nearText concept
    question: String,

    /// Number of passages to return [default: retriever.top_k]
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Maximum vector distance of returned passages
    #[arg(long)]
    distance: Option<f64>,

    #[arg(long)]
    topic: Option<String>,

    #[arg(long)]
    doc_type: Option<String>,

    #[arg(long)]
    preprocessor_id: Option<String>,

    /// Restrict to these papers (repeatable)
    #[arg(long = "paper-id", value_name = "ID")]
    paper_ids: Vec<String>,

    #[arg(long)]
    move_to: Option<String>,

    #[arg(long, default_value_t = 1.0)]
    move_to_weight: f64,

    #[arg(long)]
    move_away_from: Option<String>,

    #[arg(long, default_value_t = 1.0)]
    move_away_from_weight: f64,
}

impl QueryArgs {
    fn into_query(self) -> DocumentQuery {
        DocumentQuery {
            question: self.question,
            top_k: self.top_k,
            distance: self.distance,
            topic: self.topic,
            doc_type: self.doc_type,
            preprocessor_id: self.preprocessor_id,
            paper_ids: (!self.paper_ids.is_empty()).then_some(self.paper_ids),
            move_to: self.move_to,
            move_to_weight: self.move_to_weight,
            move_away_from: self.move_away_from,
            move_away_from_weight: self.move_away_from_weight,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the passage class in Weaviate
    Init {
        /// Drop and recreate the class if it exists
        #[arg(long)]
        force: bool,
    },

    /// Count stored passages
    Stats,

    /// Check upstream services
    Health,

    /// Retrieve relevant passages
    Search {
        #[command(flatten)]
        query: QueryArgs,

        /// Write results.json and manifest.json to this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long)]
        pretty: bool,
    },

    /// Retrieve passages and answer the question over them
    Answer {
        #[command(flatten)]
        query: QueryArgs,

        /// Compress each passage before answering
        #[arg(long)]
        compress: bool,
    },

    /// Compress text files into key points
    Compress {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Summarize a text file, one sentence per line
    Summarize {
        file: PathBuf,

        #[arg(short, long)]
        question: Option<String>,
    },

    /// Rank sentences by embedding similarity to a query
    Similarity {
        query: String,

        #[arg(required = true)]
        sentences: Vec<String>,
    },

    /// Import passages from a JSONL file
    Import {
        file: PathBuf,

        #[arg(long, value_name = "NUM")]
        batch_size: Option<usize>,
    },

    /// Start the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    askem::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());
    if !cli.config.exists() {
        warn!(
            "Config file {} not found, using defaults and environment",
            cli.config.display()
        );
    }

    let mut config =
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?;

    match cli.command {
        Commands::Init { force } => cmd_init(&config, force).await?,
        Commands::Stats => cmd_stats(&config).await?,
        Commands::Health => cmd_health(&config).await?,
        Commands::Search {
            query,
            output,
            pretty,
        } => cmd_search(&config, query.into_query(), output, pretty).await?,
        Commands::Answer { query, compress } => {
            cmd_answer(&config, query.into_query(), compress).await?
        }
        Commands::Compress { files } => cmd_compress(&config, &files).await?,
        Commands::Summarize { file, question } => {
            cmd_summarize(&config, &file, question.as_deref()).await?
        }
        Commands::Similarity { query, sentences } => {
            cmd_similarity(&config, &query, &sentences).await?
        }
        Commands::Import { file, batch_size } => {
            if let Some(batch_size) = batch_size {
                Validator::validate_batch_size(batch_size)?;
                config.weaviate.batch_size = batch_size;
            }
            cmd_import(&config, &file, cli.color).await?
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_serve(&config).await?
        }
    }

    Ok(())
}

fn connect(config: &Config) -> Result<WeaviateClient> {
    WeaviateClient::new(&config.weaviate).context("Failed to create Weaviate client")
}

fn pipeline(config: &Config) -> Result<RagPipeline> {
    RagPipeline::from_config(config).context("Failed to initialize pipeline")
}

async fn cmd_init(config: &Config, force: bool) -> Result<()> {
    let client = connect(config)?;
    let schema = SchemaManager::new(&client, &config.weaviate.class_name);

    if schema.ensure(force).await.context("Failed to create schema")? {
        println!("{}", format_success("Passage class created"));
    } else {
        println!(
            "{}",
            format_warning("Passage class already exists (use --force to recreate)")
        );
    }

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    let client = connect(config)?;
    let count = client
        .count_objects(&config.weaviate.class_name)
        .await
        .context("Failed to count passages")?;

    println!("Total passages in {}: {}", config.weaviate.class_name, count);
    Ok(())
}

async fn cmd_health(config: &Config) -> Result<()> {
    let report = pipeline(config)?.health().await;
    println!("{}", report.format());
    Ok(())
}

async fn cmd_search(
    config: &Config,
    query: DocumentQuery,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<()> {
    info!("Searching for: {}", query.question);

    let documents = pipeline(config)?
        .search(&query)
        .await
        .context("Retrieval failed")?;

    println!(
        "\n{}\n",
        format_heading(&format!("Search Results for: \"{}\"", query.question))
    );
    println!("Found {} result(s)\n", documents.len());
    println!("{}", "=".repeat(80));

    for (idx, document) in documents.iter().enumerate() {
        print!("\n{}. {}", idx + 1, document.format_summary(300));
    }

    println!("\n{}", "=".repeat(80));

    if let Some(output) = output {
        let manifest = JsonExporter::new(output)?.export_results(&query, &documents, pretty)?;
        println!(
            "{}",
            format_success(&format!("Exported {} documents", manifest.total_documents))
        );
    }

    Ok(())
}

async fn cmd_answer(config: &Config, query: DocumentQuery, compress: bool) -> Result<()> {
    let answer = pipeline(config)?
        .answer(&query, compress)
        .await
        .context("Answering failed")?;

    println!("\n{}\n", format_heading("Answer"));
    println!("{}\n", answer.answer);
    println!("{}", format_heading("Sources"));
    for document in &answer.documents {
        println!(
            "  - {} ({}, distance {:.4})",
            document.paper_id, document.cosmos_object_id, document.distance
        );
    }

    Ok(())
}

fn read_text(path: &PathBuf) -> Result<String> {
    Validator::validate_file_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Validator::validate_content_not_empty(&content)?;
    Ok(content)
}

async fn cmd_compress(config: &Config, files: &[PathBuf]) -> Result<()> {
    let chunks = files.iter().map(read_text).collect::<Result<Vec<_>>>()?;

    let compressed = pipeline(config)?
        .compress(&chunks)
        .await
        .context("Compression failed")?;

    for (file, summary) in files.iter().zip(&compressed) {
        println!("\n{}\n{}", format_heading(&file.display().to_string()), summary);
    }

    Ok(())
}

async fn cmd_summarize(config: &Config, file: &PathBuf, question: Option<&str>) -> Result<()> {
    let sentences: Vec<String> = read_text(file)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let summary = pipeline(config)?
        .summarize(&sentences, question)
        .await
        .context("Summarization failed")?;

    println!("{}", summary);
    Ok(())
}

async fn cmd_similarity(config: &Config, query: &str, sentences: &[String]) -> Result<()> {
    let scores = pipeline(config)?
        .similarity(query, sentences)
        .await
        .context("Embedding failed")?;

    let mut ranked: Vec<(&String, f32)> = sentences.iter().zip(scores).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (sentence, score) in ranked {
        println!("{:.4}  {}", score, sentence);
    }

    Ok(())
}

async fn cmd_import(config: &Config, file: &PathBuf, color: bool) -> Result<()> {
    Validator::validate_file_path(file)?;

    let client = connect(config)?;
    SchemaManager::new(&client, &config.weaviate.class_name)
        .ensure(false)
        .await
        .context("Failed to prepare schema")?;

    let stats = BatchImporter::new(&client, &config.weaviate.class_name, config.weaviate.batch_size)
        .with_progress(color)
        .import_file(file)
        .await
        .context("Import failed")?;

    let summary = format!(
        "Imported {} of {} passages ({:.1}% success, {} unreadable lines)",
        stats.inserted,
        stats.passages_read,
        stats.success_rate(),
        stats.skipped_lines
    );

    if stats.failed > 0 {
        println!("{}", format_error(&summary));
    } else {
        println!("{}", format_success(&summary));
    }

    Ok(())
}

async fn cmd_serve(config: &Config) -> Result<()> {
    let pipeline = Arc::new(pipeline(config)?);
    askem::server::serve(&config.server, pipeline)
        .await
        .context("HTTP server failed")?;
    Ok(())
}
