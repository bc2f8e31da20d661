use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};

use ruby_astgen::{AstGenerator, AstgenRequest, LookupConfig};

#[derive(Parser)]
#[command(name = "astgen")]
#[command(about = "Extract API declaration references from Ruby sources")]
struct Cli {
    #[arg(short, long, help = "Path to the input directory or file")]
    inpath: PathBuf,
    #[arg(short, long, help = "Path to the output file")]
    outfile: PathBuf,
    #[arg(short, long, help = "Optional lookup config (TOML, or JSON by extension) filtering the references")]
    config: Option<PathBuf>,
    #[arg(short = 'b', long, help = "Path to the root of the source")]
    root: Option<PathBuf>,
    #[arg(short = 'n', long, help = "Package name of the specified input")]
    package_name: Option<String>,
    #[arg(short = 'v', long, help = "Package version of the specified input")]
    package_version: Option<String>,
    #[arg(long, help = "Also write a per-file composition summary to this path")]
    composition: Option<PathBuf>,
    #[arg(long, help = "Log at debug level")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Some(LookupConfig::from_file(path)?),
        None => None,
    };

    let request = AstgenRequest {
        inpath: cli.inpath.clone(),
        root: cli.root.clone(),
        pkg_name: cli.package_name.clone(),
        pkg_version: cli.package_version.clone(),
    };

    let mut generator = AstGenerator::new(config).context("Failed to initialize Ruby parser")?;
    let outcome = generator
        .run(&request, &cli.outfile, cli.composition.as_deref())
        .with_context(|| format!("astgen failed for {}", cli.inpath.display()))?;

    let records = outcome.package().map(|p| p.api_results.len()).unwrap_or(0);
    info!(
        "{} references from {} files, {} files skipped",
        records,
        outcome.files_analyzed,
        outcome.diagnostics.len()
    );

    Ok(())
}
