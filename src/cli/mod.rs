//! CLI module for the RAG gateway
//!
//! - `serve`: run the HTTP API
//! - `ingest`: index local PDF/DOCX files
//! - `query`: ask a question against the index

pub mod ingest;
pub mod query;
pub mod serve;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, Secrets};
use crate::infrastructure::logging;

/// PMP RAG Gateway - document ingestion and question answering
#[derive(Parser)]
#[command(name = "pmp-rag-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Ingest local documents into the vector index
    Ingest(ingest::IngestArgs),

    /// Answer a question from the indexed documents
    Query(QueryArgs),
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// The question to answer
    pub query: String,

    /// Number of passages to retrieve
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Print the retrieved passages as well as the answer
    #[arg(long)]
    pub show_passages: bool,
}

/// Load `.env`, layered config and secrets, start logging, then validate
pub(crate) fn bootstrap() -> anyhow::Result<(AppConfig, Secrets)> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    let secrets = Secrets::from_env();
    config
        .validate(&secrets)
        .context("Invalid configuration")?;

    Ok((config, secrets))
}
