//! Language plugins and the registry holding them
//!
//! A language plugin bundles everything the pipeline needs to emit one
//! target language: bundled templates, the type-name table, tag syntax, a
//! formatter, an import resolver and a namespace resolver. Plugins are
//! registered into a [`LanguageRegistry`] before generation starts; the
//! registry is read-only afterwards and can be shared behind an `Arc`.

use crate::mapping::TargetType;
use crate::naming::{is_identifier, sanitize_identifier};
use crate::settings::{Driver, ReverseTarget};
use crate::types::{SchemaColumn, SchemaTable};
use crate::Result;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub mod format;
pub mod golang;
pub mod rust;

pub use format::{NoImporter, PlainFormatter};
pub use golang::GolangLanguage;
pub use rust::RustLanguage;

/// Namespace used when the derived one is a reserved word
pub const FALLBACK_NAMESPACE: &str = "db";

/// Namespace used when nothing can be derived at all
pub const DEFAULT_NAMESPACE: &str = "models";

/// Tables handed to templates and resolvers, keyed by original name
pub type TableMap = BTreeMap<String, SchemaTable>;

/// Import path to alias; an empty alias means "no alias"
pub type ImportMap = BTreeMap<String, String>;

/// Kinds of template a language bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Model,
    Query,
    Conn,
    Cache,
    Init,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Model => "model",
            TemplateKind::Query => "query",
            TemplateKind::Conn => "conn",
            TemplateKind::Cache => "cache",
            TemplateKind::Init => "init",
        }
    }

    /// Stem of the file this kind is written to
    pub fn file_stem(&self) -> &'static str {
        use crate::settings::{
            CACHE_FILE_NAME, CONN_FILE_NAME, INIT_FILE_NAME, QUERY_FILE_NAME, SINGLE_FILE_NAME,
        };
        match self {
            TemplateKind::Model => SINGLE_FILE_NAME,
            TemplateKind::Query => QUERY_FILE_NAME,
            TemplateKind::Conn => CONN_FILE_NAME,
            TemplateKind::Cache => CACHE_FILE_NAME,
            TemplateKind::Init => INIT_FILE_NAME,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post-render source formatter
pub trait Formatter: Send + Sync {
    /// Reformat `source`, or reject it as invalid for `file`
    fn format(&self, file: &Path, source: &str) -> Result<String>;
}

/// Computes the imports a set of tables needs
pub trait Importer: Send + Sync {
    fn resolve_imports(&self, tables: &TableMap) -> ImportMap;
}

/// Capability interface of one target language
pub trait LanguageSupport: Send + Sync {
    fn name(&self) -> &str;

    /// File extension including the leading dot
    fn extension(&self) -> &str;

    /// Bundled template text for `kind`
    fn template(&self, kind: TemplateKind) -> Option<&'static str>;

    fn type_name(&self, target: TargetType) -> &'static str;

    /// Reserved words that cannot be used as identifiers or namespaces
    fn keywords(&self) -> &'static [&'static str];

    /// Make `name` usable as an identifier
    fn escape_ident(&self, name: &str) -> String {
        if self.keywords().contains(&name) {
            format!("{}_", name)
        } else {
            name.to_string()
        }
    }

    /// Whether the templates can emit `name` as a struct field as is
    fn is_field_name(&self, name: &str) -> bool {
        is_identifier(name) && !self.keywords().contains(&name)
    }

    /// Wrap space-joined tag tokens in the primary annotation syntax
    fn annotate(&self, tokens: &[String]) -> String;

    /// Serialization tag carrying the raw column name
    fn json_tag(&self, column: &SchemaColumn) -> String;

    /// Combine the json and primary tags of one field
    fn join_tags(&self, tags: &[String]) -> String {
        tags.join(" ")
    }

    fn format(&self, file: &Path, source: &str) -> Result<String>;

    fn resolve_imports(&self, tables: &TableMap) -> ImportMap;

    /// Imports of the query file
    fn query_imports(&self, _tables: &TableMap) -> ImportMap {
        ImportMap::new()
    }

    /// Namespace for sources written to `output_dir`
    fn resolve_namespace(&self, output_dir: &Path) -> String {
        namespace_from_dir(output_dir, self.keywords())
    }

    /// Driver module that generated bootstrap code imports
    fn driver_import_path(&self, driver: &Driver) -> String;

    /// Default the target's extension and namespace from this language
    fn fix_target(&self, target: &mut ReverseTarget) {
        if target.extension.is_empty() {
            target.extension = self.extension().to_string();
        } else if !target.extension.starts_with('.') {
            target.extension = format!(".{}", target.extension);
        }
        if target.namespace.is_empty() {
            target.namespace = self.resolve_namespace(&target.output_dir);
        }
    }
}

/// Keyword-safe, lower-cased basename of `dir`
pub fn namespace_from_dir(dir: &Path, keywords: &[&str]) -> String {
    let base = dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(sanitize_identifier)
        .unwrap_or_default();
    if base.is_empty() || base.chars().all(|c| c == '_') {
        DEFAULT_NAMESPACE.to_string()
    } else if keywords.contains(&base.as_str()) {
        FALLBACK_NAMESPACE.to_string()
    } else {
        base
    }
}

/// Adapts a language's own formatter to the [`Formatter`] seam
struct LanguageFormatter(Arc<dyn LanguageSupport>);

impl Formatter for LanguageFormatter {
    fn format(&self, file: &Path, source: &str) -> Result<String> {
        self.0.format(file, source)
    }
}

/// Adapts a language's own import resolver to the [`Importer`] seam
struct LanguageImporter(Arc<dyn LanguageSupport>);

impl Importer for LanguageImporter {
    fn resolve_imports(&self, tables: &TableMap) -> ImportMap {
        self.0.resolve_imports(tables)
    }
}

/// Registry of languages, formatters and importers keyed by name
#[derive(Clone, Default)]
pub struct LanguageRegistry {
    languages: HashMap<String, Arc<dyn LanguageSupport>>,
    formatters: HashMap<String, Arc<dyn Formatter>>,
    importers: HashMap<String, Arc<dyn Importer>>,
}

impl LanguageRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `rust` and `golang` languages, the `plain`,
    /// `rust` and `golang` formatters and the `none` importer
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_language(Arc::new(RustLanguage));
        registry.register_language(Arc::new(GolangLanguage));
        registry.register_formatter("plain", Arc::new(PlainFormatter));
        registry.register_formatter("rust", Arc::new(rust::RustFormatter));
        registry.register_formatter("golang", Arc::new(golang::GolangFormatter));
        registry.register_importer("none", Arc::new(NoImporter));
        registry
    }

    /// Insert a language; the last registration under a name wins
    pub fn register_language(&mut self, language: Arc<dyn LanguageSupport>) {
        let name = language.name().to_string();
        if self.languages.insert(name.clone(), language).is_some() {
            log::debug!("Replaced language plugin '{}'", name);
        }
    }

    pub fn register_formatter(&mut self, name: &str, formatter: Arc<dyn Formatter>) {
        self.formatters.insert(name.to_string(), formatter);
    }

    pub fn register_importer(&mut self, name: &str, importer: Arc<dyn Importer>) {
        self.importers.insert(name.to_string(), importer);
    }

    pub fn get_language(&self, name: &str) -> Option<Arc<dyn LanguageSupport>> {
        self.languages.get(name).cloned()
    }

    pub fn formatter(&self, name: &str) -> Option<Arc<dyn Formatter>> {
        self.formatters.get(name).cloned()
    }

    pub fn importer(&self, name: &str) -> Option<Arc<dyn Importer>> {
        self.importers.get(name).cloned()
    }

    /// Registered language names, sorted
    pub fn language_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.languages.keys().cloned().collect();
        names.sort();
        names
    }

    /// Apply the target language's defaults, returning the language
    pub fn fix_target(&self, target: &mut ReverseTarget) -> Option<Arc<dyn LanguageSupport>> {
        let language = self.get_language(&target.language)?;
        language.fix_target(target);
        Some(language)
    }

    /// Formatter named by the target, else the language's own, else `plain`
    pub fn resolve_formatter(
        &self,
        target: &ReverseTarget,
        language: Option<&Arc<dyn LanguageSupport>>,
    ) -> Arc<dyn Formatter> {
        if !target.formatter.is_empty() {
            match self.formatter(&target.formatter) {
                Some(formatter) => return formatter,
                None => log::warn!("Unknown formatter '{}', ignoring it", target.formatter),
            }
        }
        match language {
            Some(language) => Arc::new(LanguageFormatter(Arc::clone(language))),
            None => Arc::new(PlainFormatter),
        }
    }

    /// Importer named by the target, else the language's own, else `none`
    pub fn resolve_importer(
        &self,
        target: &ReverseTarget,
        language: Option<&Arc<dyn LanguageSupport>>,
    ) -> Arc<dyn Importer> {
        if !target.importer.is_empty() {
            match self.importer(&target.importer) {
                Some(importer) => return importer,
                None => log::warn!("Unknown importer '{}', ignoring it", target.importer),
            }
        }
        match language {
            Some(language) => Arc::new(LanguageImporter(Arc::clone(language))),
            None => Arc::new(NoImporter),
        }
    }
}

impl fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatters: Vec<&String> = self.formatters.keys().collect();
        formatters.sort();
        let mut importers: Vec<&String> = self.importers.keys().collect();
        importers.sort();
        f.debug_struct("LanguageRegistry")
            .field("languages", &self.language_names())
            .field("formatters", &formatters)
            .field("importers", &importers)
            .finish()
    }
}
