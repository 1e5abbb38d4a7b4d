//! RAG (Retrieval-Augmented Generation) module
//!
//! This module provides end-to-end question answering over one PDF:
//! - In-memory vector index over embedded passages
//! - Nearest-neighbour retrieval
//! - Context assembly from retrieved passages
//! - LLM-based answer generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use chatpdf::config::AppConfig;
//! use chatpdf::rag::RagPipeline;
//! use chatpdf::rag::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let pipeline = RagPipeline::new(&config)?;
//!     let mut session = Session::new();
//!
//!     pipeline.ingest(&mut session, Path::new("report.pdf")).await?;
//!     let result = pipeline.ask(&session, "What is the main finding?").await?;
//!     println!("Answer: {}", result.answer);
//!     println!("Sources: {} passages", result.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod index;
pub mod pipeline;
pub mod session;

pub use context::ContextAssembler;
pub use index::DistanceMetric;
pub use index::SearchResult;
pub use index::VectorIndex;
pub use pipeline::RagPipeline;
pub use session::Session;
