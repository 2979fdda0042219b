use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use var_annot::config::Config;
use var_annot::logging;
use var_annot::lookup::ExacClient;
use var_annot::Pipeline;

#[derive(Parser)]
#[command(name = "var_annot")]
#[command(about = "Annotate VCF variants with INFO statistics and ExAC allele frequencies")]
#[command(version = "0.1.0")]
struct Cli {
    /// VCF file to annotate
    input: PathBuf,

    /// Number of lines before the #CHROM header line; detected from `##` lines when omitted
    header_rows: Option<usize>,

    /// Directory for the annotated file
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// TOML configuration file (defaults to ./var_annot.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bulk variant endpoint of the allele-frequency service
    #[arg(long)]
    lookup_url: Option<String>,

    /// Keys per lookup request, 0 for a single request
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Lookup request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(url) = &self.lookup_url {
            config.lookup.url = url.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.lookup.chunk_size = chunk_size;
        }
        if let Some(timeout) = self.timeout_secs {
            config.lookup.timeout_seconds = timeout;
        }
        config.validate()?;
        Ok(config)
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config().context("loading configuration")?;
    info!("Using allele-frequency service at {}", config.lookup.url);

    let client = ExacClient::from_config(&config.lookup)?;
    let pipeline = Pipeline::new(Arc::new(client), config.output.clone());

    println!("🔄 Annotating {}...", cli.input.display());
    let result = pipeline
        .run(&cli.input, cli.header_rows)
        .await
        .with_context(|| format!("annotating {}", cli.input.display()))?;

    println!("\n📊 Annotation results:");
    println!("   Variant lines: {}", result.source_rows);
    println!("   Alleles: {}", result.expanded_rows);
    println!("   With ExAC frequency: {}", result.frequencies_found);
    println!("   Without ExAC frequency: {}", result.frequencies_missing);
    if result.duplicate_keys > 0 {
        println!("   Duplicate variants: {}", result.duplicate_keys);
    }
    println!("   Output file: {}", result.output_file.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging();

    let cli = Cli::parse();
    let result = run(cli).await;
    if let Err(e) = &result {
        error!("Annotation failed: {:#}", e);
    }
    result
}
