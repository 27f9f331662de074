//! CLI module for Minne.

pub mod commands;
pub(crate) mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Minne - Transcript Ingestion and RAG
///
/// A CLI tool for building a searchable knowledge base from spoken-word
/// transcripts and asking it questions. The name "Minne" comes from the
/// Norwegian word for "memory."
#[derive(Parser, Debug)]
#[command(name = "minne")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Minne and verify configuration
    Init,

    /// Check configuration and knowledge-base status
    Doctor,

    /// Ingest every document in the links manifest
    Ingest {
        /// Manifest CSV to ingest (defaults to the configured path)
        #[arg(short, long)]
        manifest: Option<String>,
    },

    /// Ask a question and get a grounded answer
    Ask {
        /// The question to ask
        question: String,

        /// Number of context chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,

        /// Also synthesize the answer to an audio file
        #[arg(long)]
        speak: bool,
    },

    /// Inspect the stored chunk collection
    Inspect {
        /// Show the first chunk with this ordinal (across all documents)
        #[arg(long)]
        chunk: Option<usize>,
    },
}
