//! Field Lineage CLI
//!
//! Prints the origin chain of one field.

use std::path::PathBuf;

use avro_schema_docs::{
    load_protocols, lineage::extract_origins_with_limit, Corpus, DocsConfig, FieldId, FieldMap,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-lineage")]
#[command(about = "Show where a field's data comes from")]
struct Cli {
    /// Path to folder containing AVPR files
    #[arg(short, long)]
    protocol_path: PathBuf,

    /// Field to trace, e.g. com.x.User#email
    field: String,

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
    let config = DocsConfig::load_from(cli.config.as_deref())?;
    let loaded = load_protocols(&cli.protocol_path, &config.load_config())?;
    let corpus = Corpus::new(&loaded.protocols);

    let field = corpus.find_field(&cli.field)?;
    let field_id = FieldId::try_from(cli.field.as_str())?;
    let field_map = FieldMap::from_protocols(&loaded.protocols)?;
    let chain = extract_origins_with_limit(&field_map, &field_id, config.lineage.max_depth)?;

    println!("{}", field_id);
    println!("  {}", field.doc.as_deref().unwrap_or(&config.render.missing_doc));

    if chain.is_empty() {
        println!("  (no origin)");
    }
    for ancestor in &chain {
        let doc = corpus.find_field(&ancestor.to_string())?.doc.as_deref();
        println!("<- {}", ancestor);
        println!("  {}", doc.unwrap_or(&config.render.missing_doc));
    }

    let usages = field_map.usages(&field_id);
    if !usages.is_empty() {
        println!();
        println!("Derived fields:");
        for usage in usages {
            println!("  {}", usage);
        }
    }

    Ok(())
}
