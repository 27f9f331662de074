//! Minne - Transcript Ingestion and RAG
//!
//! A CLI tool for turning a corpus of long-form spoken transcripts into a
//! searchable knowledge base you can ask questions of.
//!
//! The name "Minne" comes from the Norwegian word for "memory."
//!
//! # Overview
//!
//! Minne allows you to:
//! - Ingest transcripts listed in a CSV manifest, resumably and idempotently
//! - Chunk and embed them into an on-disk vector store
//! - Ask questions and get grounded, retrieval-augmented answers
//! - Optionally hear the answer spoken aloud
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `transcript` - Transcript source abstraction (YouTube captions)
//! - `chunking` - Word-window text chunking
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `ingest` - Manifest parsing, progress ledger, and the ingestion pipeline
//! - `rag` - Retrieval-augmented answering
//! - `speech` - Text-to-speech synthesis of answers
//!
//! # Example
//!
//! ```rust,no_run
//! use minne::config::Settings;
//! use minne::ingest::IngestPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = IngestPipeline::new(&settings)?;
//!
//!     // Process every document in the manifest, skipping ones already done
//!     let report = pipeline.run().await?;
//!     println!("Ingested {} documents", report.succeeded.len());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod openai;
pub mod rag;
pub mod speech;
pub mod transcript;
pub mod vector_store;

pub use error::{MinneError, Result};
