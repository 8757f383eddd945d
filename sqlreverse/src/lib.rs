//! sqlreverse - Reverse-engineer database schemas into source code
//!
//! This crate turns a metadata snapshot of a relational database into
//! strongly typed data-access code through a template-driven pipeline.
//!
//! # Features
//!
//! - **Table filtering** with include/exclude shell globs
//! - **SQL type mapping** to target-language types and column tags
//! - **Pluggable languages** (Rust and Go built in) with their own
//!   templates, formatters, import and namespace resolvers
//! - **Single-file or per-table output**, plus connection/cache bootstrap
//!   files and an aggregate init file for multi-source projects
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlreverse::{LanguageRegistry, Reverser, Settings, SnapshotSource};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> sqlreverse::Result<()> {
//! let settings = Settings::from_file(Path::new("settings.yml"))?;
//! let registry = Arc::new(LanguageRegistry::with_builtins());
//!
//! let mut reverser = Reverser::new(registry).with_source(Box::new(SnapshotSource));
//! let report = reverser.exec_settings(&settings, &[] as &[&str]).await?;
//! for path in &report.written {
//!     println!("wrote {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use thiserror::Error;

pub mod codegen;
pub mod filter;
pub mod lang;
pub mod mapping;
pub mod mixin;
pub mod naming;
pub mod reverse;
pub mod settings;
pub mod source;
pub mod types;

pub use codegen::TemplateEngine;
pub use filter::{filter_tables, Globs};
pub use lang::{Formatter, Importer, LanguageRegistry, LanguageSupport, TemplateKind};
pub use mapping::{column_type_string, map_type, tag_tokens, TargetType};
pub use mixin::MixinApplier;
pub use naming::NameMapper;
pub use reverse::{ReverseReport, Reverser};
pub use settings::{ConnConfig, ConnParams, ConnectionSpec, Driver, ReverseTarget, Settings};
pub use source::{MetadataSource, SnapshotSource, StaticSource};
pub use types::*;

/// Reverse pipeline errors
#[derive(Error, Debug)]
pub enum ReverseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No usable connection found: {0}")]
    NoConnection(String),

    #[error("Metadata fetch failed for '{source_name}': {message}")]
    Metadata { source_name: String, message: String },

    #[error("Template '{name}' failed to compile: {message}")]
    TemplateCompile { name: String, message: String },

    #[error("Template '{template}' failed to render: {message}")]
    Render { template: String, message: String },

    #[error("Formatting '{}' failed: {message}", .file.display())]
    Format { file: PathBuf, message: String },

    #[error("Invalid field name '{field}' for column {table}.{column}")]
    InvalidIdentifier {
        table: String,
        column: String,
        field: String,
    },

    #[error("Mixin merge failed for '{}': {message}", .file.display())]
    Mixin { file: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ReverseError {
    /// Whether the error aborts the pass it was raised in.
    ///
    /// Mixin merge failures are reported after the fact and never undo the
    /// files that were already generated.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ReverseError::Mixin { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReverseError>;
