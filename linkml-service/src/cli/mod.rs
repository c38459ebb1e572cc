//! Command-line interface for `LinkML` schema flattening.
//!
//! `gen-linkml` loads a schema with its import closure, optionally folds the
//! imports into the primary document and writes every class's induced slots
//! out as attributes, then prints the primary document as JSON or YAML.

use clap::{Parser, ValueEnum};
use linkml_core::{config::LinkMLConfig, error::Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::schema_view::SchemaView;

/// Flatten a `LinkML` schema and print it
#[derive(Parser, Debug, Clone)]
#[command(name = "gen-linkml", author, version, about, long_about = None)]
pub struct Args {
    /// YAML or JSON schema file
    pub schema: PathBuf,

    /// Do not merge imports into the source schema
    #[arg(long)]
    pub no_merge_imports: bool,

    /// Do not materialize induced slots as attributes
    #[arg(long)]
    pub no_materialize_attributes: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Path of file to write to (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (TOML or YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed `JSON`
    Json,
    /// `YAML`
    Yaml,
}

/// Install a stderr subscriber; `RUST_LOG` wins over `verbose`
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // A subscriber may already be installed when embedded in another binary.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load, transform and serialize the schema named by `args`
/// Returns an error if the operation fails
///
/// # Errors
///
/// Returns configuration, load, resolution or serialization errors.
pub async fn render(args: &Args) -> Result<String> {
    let config = match &args.config {
        Some(path) => LinkMLConfig::from_file(path)?,
        None => LinkMLConfig::default(),
    };

    let mut view = SchemaView::load_with_config(&args.schema, config).await?;
    view.load_prefix_maps().await?;
    view.load_imports_closure().await?;

    if !args.no_merge_imports {
        view.merge_imports().await?;
    }
    if !args.no_materialize_attributes {
        view.materialize_induced_attributes()?;
    }

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(view.schema())?,
        OutputFormat::Yaml => serde_yaml::to_string(view.schema())?,
    };
    info!(schema = %args.schema.display(), format = ?args.format, "rendered schema");
    Ok(rendered)
}

/// Run the CLI: render and write to `--output` or stdout
///
/// # Errors
///
/// Returns any rendering error, or an I/O error writing the output.
pub async fn run(args: Args) -> anyhow::Result<()> {
    init_tracing(args.verbose);

    let rendered = render(&args).await?;
    match &args.output {
        Some(path) => tokio::fs::write(path, rendered).await?,
        None => println!("{rendered}"),
    }
    Ok(())
}
