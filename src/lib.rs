//! declscan - grammar-free declaration scanning.
//!
//! declscan extracts a normalized inventory of declarations (functions,
//! types, modules, constants, imports) with line ranges, nesting, modifiers
//! and documentation from source files, without a grammar per language.
//! Extraction is best-effort and bounded: malformed input degrades the
//! result instead of failing the batch.
//!
//! # Architecture
//!
//! - `parser`: lexer, block resolver, doc/modifier collector, the pattern
//!   engine and one configuration per language
//! - `orchestrator`: parallel batch scanning with per-file error isolation
//! - `merge`: reconciling two declaration trees for the same file
//! - `config`: scan limits and settings, loadable from YAML
//! - `report`: output formatting (pretty, JSON)
//!
//! # Adding a New Language
//!
//! See `src/parser/languages/` for examples. Describe the language's syntax
//! and declaration patterns in a `ScannerConfig` and register it in
//! `languages/mod.rs`.

pub mod cli;
pub mod config;
pub mod error;
pub mod lang;
pub mod merge;
pub mod model;
pub mod orchestrator;
pub mod parser;
pub mod report;

pub use config::{Limits, ScanConfig};
pub use error::{Result, ScanError};
pub use lang::Language;
pub use merge::merge_declarations;
pub use model::{Declaration, DeclarationKind, ParsedFile};
pub use orchestrator::{BatchResult, Orchestrator, SourceFile};
pub use parser::{Registry, ScanOutput, Scanner};
