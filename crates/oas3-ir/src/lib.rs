//! Resolution engine that turns an OpenAPI 3.x document tree into a typed
//! intermediate representation of an HTTP client.
//!
//! The input is an already-parsed JSON-like tree (`serde_json::Value`); loading
//! and parsing bytes is the caller's concern. The output is an [`IrForest`]:
//! endpoints grouped by tag, plus deduplicated model and enum tables, with
//! collision-free identifiers already assigned. Code emitters consume the
//! forest through the [`CodeEmitter`] contract and never look at raw schema
//! syntax again.
//!
//! ```no_run
//! use oas3_ir::{BuildConfig, DocumentBuilder};
//!
//! # fn example() -> anyhow::Result<()> {
//! let text = std::fs::read_to_string("openapi.json")?;
//! let document: serde_json::Value = serde_json::from_str(&text)?;
//!
//! let build = DocumentBuilder::new(BuildConfig::default()).build(&document)?;
//! println!(
//!   "resolved {} models across {} tags",
//!   build.forest.arena.models().count(),
//!   build.forest.endpoints.len()
//! );
//! # Ok(())
//! # }
//! ```

mod assembler;
mod builder;
mod diagnostics;
mod document;
mod emit;
mod endpoint;
mod graph;
pub mod ir;
mod naming;
mod resolver;

pub use builder::{BuildConfig, BuildError, DocumentBuilder, IrBuild, SpecVersion};
pub use diagnostics::{BuildStats, Diagnostic, DiagnosticKind};
pub use emit::CodeEmitter;
pub use graph::{ComponentSection, Reference};
pub use ir::IrForest;
