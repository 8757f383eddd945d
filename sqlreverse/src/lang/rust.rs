//! Rust language plugin

use super::{Formatter, ImportMap, LanguageSupport, TableMap, TemplateKind};
use crate::codegen::templates;
use crate::mapping::{map_type, TargetType};
use crate::naming::is_identifier;
use crate::settings::Driver;
use crate::types::SchemaColumn;
use crate::{Result, ReverseError};
use std::path::Path;

const RUST_KEYWORDS: &[&str] = &[
    "type", "match", "if", "else", "while", "for", "loop", "fn", "let", "mut", "const",
    "static", "struct", "enum", "trait", "impl", "mod", "use", "pub", "return", "break",
    "continue", "true", "false", "self", "Self", "super", "crate", "in", "as", "where",
    "async", "await", "dyn", "move", "ref", "macro", "union", "unsafe", "extern", "yield",
    "try", "catch", "typeof",
];

/// Keywords that cannot be written as raw identifiers
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/// Generates serde-ready structs with `#[orm(...)]` field attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct RustLanguage;

impl LanguageSupport for RustLanguage {
    fn name(&self) -> &str {
        "rust"
    }

    fn extension(&self) -> &str {
        ".rs"
    }

    fn template(&self, kind: TemplateKind) -> Option<&'static str> {
        Some(match kind {
            TemplateKind::Model => templates::RUST_MODEL_TEMPLATE,
            TemplateKind::Query => templates::RUST_QUERY_TEMPLATE,
            TemplateKind::Conn => templates::RUST_CONN_TEMPLATE,
            TemplateKind::Cache => templates::RUST_CACHE_TEMPLATE,
            TemplateKind::Init => templates::RUST_INIT_TEMPLATE,
        })
    }

    fn type_name(&self, target: TargetType) -> &'static str {
        match target {
            TargetType::Bool => "bool",
            TargetType::SmallInt => "i16",
            TargetType::Int32 => "i32",
            TargetType::Int64 => "i64",
            TargetType::Float32 => "f32",
            TargetType::Float64 => "f64",
            TargetType::Timestamp => "NaiveDateTime",
            TargetType::Bytes => "Vec<u8>",
            TargetType::String => "String",
            TargetType::NullableString => "Option<String>",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        RUST_KEYWORDS
    }

    /// Keywords are fine, the model template escapes them through `ident`
    fn is_field_name(&self, name: &str) -> bool {
        is_identifier(name) && name != "_"
    }

    fn escape_ident(&self, name: &str) -> String {
        if NON_RAW_KEYWORDS.contains(&name) {
            format!("{}_", name)
        } else if RUST_KEYWORDS.contains(&name) {
            format!("r#{}", name)
        } else {
            name.to_string()
        }
    }

    fn annotate(&self, tokens: &[String]) -> String {
        format!("#[orm({:?})]", tokens.join(" "))
    }

    fn json_tag(&self, column: &SchemaColumn) -> String {
        format!("#[serde(rename = {:?})]", column.name)
    }

    fn join_tags(&self, tags: &[String]) -> String {
        tags.join("\n    ")
    }

    fn format(&self, file: &Path, source: &str) -> Result<String> {
        RustFormatter.format(file, source)
    }

    fn resolve_imports(&self, tables: &TableMap) -> ImportMap {
        let mut imports = ImportMap::new();
        let has_time = tables
            .values()
            .flat_map(|t| t.columns.iter())
            .any(|c| map_type(&c.sql_type) == TargetType::Timestamp);
        if has_time {
            imports.insert("chrono::NaiveDateTime".to_string(), String::new());
        }
        imports
    }

    fn driver_import_path(&self, driver: &Driver) -> String {
        match driver {
            Driver::MySql => "sqlx::MySqlPool",
            Driver::Postgres => "sqlx::PgPool",
            Driver::Sqlite => "sqlx::SqlitePool",
            Driver::Redis => "redis::Client",
            Driver::MsSql | Driver::Other(_) => "sqlx::AnyPool",
        }
        .to_string()
    }
}

/// Parses the source with `syn` and pretty-prints it with `prettyplease`
///
/// Only doc comments survive the round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustFormatter;

impl Formatter for RustFormatter {
    fn format(&self, file: &Path, source: &str) -> Result<String> {
        let syntax = syn::parse_file(source).map_err(|e| ReverseError::Format {
            file: file.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(prettyplease::unparse(&syntax))
    }
}
