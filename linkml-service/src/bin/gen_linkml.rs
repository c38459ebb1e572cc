//! `gen-linkml`: flatten a `LinkML` schema
//!
//! Loads a schema and its imports, merges them and materializes induced
//! attributes, then prints the result as JSON or YAML.

use clap::Parser;
use linkml_service::cli::{self, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run(Args::parse()).await
}
