//! Schema Documentation CLI
//!
//! Generates reStructuredText pages from a directory of Avro protocol files.

use std::path::PathBuf;

use anyhow::Context;
use avro_schema_docs::{
    load_protocols, write_document, DocBuilder, DocsConfig, RstRenderer,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-to-rst")]
#[command(about = "Generates schema docs from avro protocol files")]
struct Cli {
    /// Path to folder containing AVPR files
    #[arg(short, long)]
    protocol_path: PathBuf,

    /// Output path
    #[arg(short, long)]
    output_path: PathBuf,

    /// Configuration file (defaults to schema-docs.toml lookup)
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DocsConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    let corpus = load_protocols(&cli.protocol_path, &config.load_config())?;

    let renderer = match &config.render.templates_dir {
        Some(dir) => RstRenderer::with_overrides(dir)?,
        None => RstRenderer::new()?,
    };
    let builder = DocBuilder::new(&renderer, config.build_settings());

    let mut written = 0usize;
    for document in builder.build_docs(&corpus.protocols)? {
        let document = document?;
        write_document(&cli.output_path, &document)
            .with_context(|| format!("writing {}", document.path.display()))?;
        written += 1;
    }

    println!(
        "Wrote {} documents for {} protocols to {}",
        written,
        corpus.protocols.len(),
        cli.output_path.display()
    );
    Ok(())
}
