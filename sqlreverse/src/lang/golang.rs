//! Go language plugin

use super::{
    namespace_from_dir, Formatter, ImportMap, LanguageSupport, TableMap, TemplateKind,
};
use crate::codegen::templates;
use crate::lang::format::tidy;
use crate::mapping::{created_column, map_type, TargetType};
use crate::settings::Driver;
use crate::types::SchemaColumn;
use crate::{Result, ReverseError};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Generates xorm-tagged structs
#[derive(Debug, Clone, Copy, Default)]
pub struct GolangLanguage;

impl LanguageSupport for GolangLanguage {
    fn name(&self) -> &str {
        "golang"
    }

    fn extension(&self) -> &str {
        ".go"
    }

    fn template(&self, kind: TemplateKind) -> Option<&'static str> {
        Some(match kind {
            TemplateKind::Model => templates::GOLANG_MODEL_TEMPLATE,
            TemplateKind::Query => templates::GOLANG_QUERY_TEMPLATE,
            TemplateKind::Conn => templates::GOLANG_CONN_TEMPLATE,
            TemplateKind::Cache => templates::GOLANG_CACHE_TEMPLATE,
            TemplateKind::Init => templates::GOLANG_INIT_TEMPLATE,
        })
    }

    fn type_name(&self, target: TargetType) -> &'static str {
        match target {
            TargetType::Bool => "bool",
            TargetType::SmallInt | TargetType::Int32 => "int",
            TargetType::Int64 => "int64",
            TargetType::Float32 => "float32",
            TargetType::Float64 => "float64",
            TargetType::Timestamp => "time.Time",
            TargetType::Bytes => "[]byte",
            TargetType::String => "string",
            TargetType::NullableString => "sql.NullString",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        GO_KEYWORDS
    }

    fn annotate(&self, tokens: &[String]) -> String {
        format!("xorm:\"{}\"", tokens.join(" ").replace('"', "\\\""))
    }

    fn json_tag(&self, column: &SchemaColumn) -> String {
        format!("json:\"{}\"", column.name)
    }

    fn join_tags(&self, tags: &[String]) -> String {
        format!("`{}`", tags.join(" "))
    }

    fn format(&self, file: &Path, source: &str) -> Result<String> {
        GolangFormatter.format(file, source)
    }

    fn resolve_imports(&self, tables: &TableMap) -> ImportMap {
        let mut imports = ImportMap::new();
        for column in tables.values().flat_map(|t| t.columns.iter()) {
            match map_type(&column.sql_type) {
                TargetType::Timestamp => {
                    imports.insert("time".to_string(), String::new());
                }
                TargetType::NullableString => {
                    imports.insert("database/sql".to_string(), String::new());
                }
                _ => {}
            }
        }
        imports
    }

    fn query_imports(&self, tables: &TableMap) -> ImportMap {
        let mut imports = ImportMap::new();
        imports.insert("xorm.io/xorm".to_string(), String::new());
        if tables.values().any(|t| !created_column(t).is_empty()) {
            imports.insert("time".to_string(), String::new());
        }
        imports
    }

    fn resolve_namespace(&self, output_dir: &Path) -> String {
        match declared_package(output_dir) {
            Some(package) => package,
            None => namespace_from_dir(output_dir, GO_KEYWORDS),
        }
    }

    fn driver_import_path(&self, driver: &Driver) -> String {
        match driver {
            Driver::MySql => "github.com/go-sql-driver/mysql".to_string(),
            Driver::Postgres => "github.com/lib/pq".to_string(),
            Driver::Sqlite => "github.com/mattn/go-sqlite3".to_string(),
            Driver::MsSql => "github.com/denisenkom/go-mssqldb".to_string(),
            Driver::Redis => "github.com/gomodule/redigo/redis".to_string(),
            Driver::Other(name) => name.clone(),
        }
    }
}

/// First package clause found among the non-test Go files in `dir`
fn declared_package(dir: &Path) -> Option<String> {
    let pattern = Regex::new(r"(?m)^package\s+(\w+)").ok()?;

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            name.ends_with(".go") && !name.ends_with("_test.go")
        })
        .collect();
    files.sort();

    files.iter().find_map(|file| {
        let content = std::fs::read_to_string(file).ok()?;
        let package = pattern.captures(&content)?.get(1)?.as_str().to_string();
        log::debug!("Found package '{}' in {}", package, file.display());
        Some(package)
    })
}

/// Whitespace normalizer that rejects sources with unbalanced brackets
#[derive(Debug, Clone, Copy, Default)]
pub struct GolangFormatter;

impl Formatter for GolangFormatter {
    fn format(&self, file: &Path, source: &str) -> Result<String> {
        check_balanced(source).map_err(|message| ReverseError::Format {
            file: file.to_path_buf(),
            message,
        })?;
        Ok(tidy(source))
    }
}

/// Scan brackets outside strings, runes and comments
fn check_balanced(source: &str) -> std::result::Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => line += 1,
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' | '\'' => {
                let mut escaped = false;
                for c in chars.by_ref() {
                    if c == '\n' {
                        return Err(format!("unterminated literal on line {}", line));
                    }
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == ch {
                        break;
                    }
                }
            }
            '`' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                    }
                    if c == '`' {
                        break;
                    }
                }
            }
            '(' | '[' | '{' => stack.push((ch, line)),
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, at)) => {
                        return Err(format!(
                            "'{}' on line {} closes '{}' opened on line {}",
                            ch, line, open, at
                        ))
                    }
                    None => return Err(format!("unexpected '{}' on line {}", ch, line)),
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, at)) => Err(format!("unclosed '{}' opened on line {}", open, at)),
        None => Ok(()),
    }
}
