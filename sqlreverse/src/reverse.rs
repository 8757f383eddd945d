//! Generation orchestrator
//!
//! Drives one target through fetch, filter, rename, render, format and
//! write, emits the connection or cache bootstrap file, runs the optional
//! mixin pass, and fans the whole thing out over every configured data
//! source before rendering the aggregate init file.

use crate::codegen::TemplateEngine;
use crate::filter::filter_tables;
use crate::lang::{
    Formatter, ImportMap, LanguageRegistry, LanguageSupport, TableMap, TemplateKind,
    DEFAULT_NAMESPACE,
};
use crate::mixin::MixinApplier;
use crate::naming::is_identifier;
use crate::settings::{ConnectionSpec, ReverseTarget, Settings, INIT_FILE_NAME};
use crate::source::MetadataSource;
use crate::types::SchemaTable;
use crate::{Result, ReverseError};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of a generation run
#[derive(Debug, Default)]
pub struct ReverseReport {
    /// Files written, in write order
    pub written: Vec<PathBuf>,
    /// Non-fatal mixin merge failures
    pub mixin_errors: Vec<ReverseError>,
}

impl ReverseReport {
    pub fn merge(&mut self, other: ReverseReport) {
        self.written.extend(other.written);
        self.mixin_errors.extend(other.mixin_errors);
    }

    pub fn is_clean(&self) -> bool {
        self.mixin_errors.is_empty()
    }
}

/// Render data of model and query templates
#[derive(Serialize)]
struct ModelContext<'a> {
    target: &'a ReverseTarget,
    tables: &'a TableMap,
    imports: &'a ImportMap,
}

/// Render data of connection and cache bootstrap templates
#[derive(Serialize)]
struct BootstrapContext<'a> {
    target: &'a ReverseTarget,
    source: &'a ConnectionSpec,
}

/// One data source as seen by the init template
#[derive(Serialize)]
struct InitSource {
    key: String,
    namespace: String,
    bootstrap: String,
    path: String,
}

/// Render data of the init template
#[derive(Serialize)]
struct InitContext<'a> {
    target: &'a ReverseTarget,
    namespace: String,
    imports: &'a BTreeMap<String, String>,
    bootstraps: &'a BTreeMap<String, String>,
    sources: Vec<InitSource>,
}

/// Pipeline driver for one process
pub struct Reverser {
    registry: Arc<LanguageRegistry>,
    engine: TemplateEngine,
    source: Option<Box<dyn MetadataSource>>,
    mixins: Option<Box<dyn MixinApplier>>,
}

impl Reverser {
    pub fn new(registry: Arc<LanguageRegistry>) -> Self {
        let engine = TemplateEngine::new(Arc::clone(&registry));
        Self {
            registry,
            engine,
            source: None,
            mixins: None,
        }
    }

    /// Install the metadata collaborator
    pub fn with_source(mut self, source: Box<dyn MetadataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Install the mixin post-processor
    pub fn with_mixins(mut self, applier: Box<dyn MixinApplier>) -> Self {
        self.mixins = Some(applier);
        self
    }

    pub fn registry(&self) -> &Arc<LanguageRegistry> {
        &self.registry
    }

    /// Fetch and filter the tables of one connection
    pub async fn list_tables(
        &self,
        target: &ReverseTarget,
        spec: &ConnectionSpec,
    ) -> Result<Vec<SchemaTable>> {
        spec.validate()?;
        let source = self.source.as_ref().ok_or_else(|| {
            ReverseError::Config("no metadata source installed".to_string())
        })?;
        let tables = source.fetch_tables(spec).await?;
        Ok(filter_tables(
            tables,
            &target.include_tables,
            &target.exclude_tables,
        ))
    }

    /// Generate every file of one data source
    pub async fn reverse(
        &mut self,
        target: &mut ReverseTarget,
        spec: &ConnectionSpec,
    ) -> Result<ReverseReport> {
        let language = self.registry.fix_target(target);
        spec.validate()?;

        let mut report = ReverseReport::default();
        if !spec.driver.is_cache() {
            let tables = self.list_tables(target, spec).await?;
            log::info!(
                "Generating {} tables of '{}' into {}",
                tables.len(),
                spec.driver,
                target.output_dir.display()
            );
            report
                .written
                .extend(self.run_reverse(&spec.table_prefix, target, tables)?);
        }

        match &language {
            Some(language) => {
                let path = self.write_bootstrap(target, spec, language)?;
                report.written.push(path);
            }
            None => log::debug!(
                "No language '{}', skipping the bootstrap file",
                target.language
            ),
        }

        if target.apply_mixins {
            report.mixin_errors.extend(self.apply_mixins(target));
        }
        Ok(report)
    }

    /// Render, format and write the model (and query) files of `tables`
    pub fn run_reverse(
        &mut self,
        table_prefix: &str,
        target: &ReverseTarget,
        tables: Vec<SchemaTable>,
    ) -> Result<Vec<PathBuf>> {
        let language = self.registry.get_language(&target.language);
        let formatter = self.registry.resolve_formatter(target, language.as_ref());
        let importer = self.registry.resolve_importer(target, language.as_ref());

        let model_template = self
            .model_template(target, language.as_ref())?
            .ok_or_else(|| {
                ReverseError::Config(
                    "you have to indicate a template path or a language".to_string(),
                )
            })?;
        let query_template = self.query_template(target, language.as_ref())?;

        let tables = rename_tables(table_prefix, target, language.as_deref(), tables)?;
        std::fs::create_dir_all(&target.output_dir)?;

        let mut written = Vec::new();
        if !target.multiple_files {
            let imports = importer.resolve_imports(&tables);
            let source = self.engine.render(
                &model_template,
                &ModelContext {
                    target,
                    tables: &tables,
                    imports: &imports,
                },
            )?;
            let path = target.out_file(TemplateKind::Model.file_stem());
            written.push(write_formatted(&path, &source, formatter.as_ref())?);

            if let Some(query_template) = &query_template {
                let imports = query_imports(language.as_ref(), &tables);
                let source = self.engine.render(
                    query_template,
                    &ModelContext {
                        target,
                        tables: &tables,
                        imports: &imports,
                    },
                )?;
                let path = target.out_file(TemplateKind::Query.file_stem());
                written.push(write_formatted(&path, &source, formatter.as_ref())?);
            }
        } else {
            for (original, stem) in file_collisions(&tables) {
                log::warn!(
                    "Table '{}' is written to '{}{}', a file name already taken in {}",
                    original,
                    stem,
                    target.extension,
                    target.output_dir.display()
                );
            }
            for (original, table) in &tables {
                let single: TableMap = BTreeMap::from([(original.clone(), table.clone())]);
                let mut imports = importer.resolve_imports(&single);
                if query_template.is_some() {
                    imports.extend(query_imports(language.as_ref(), &single));
                }
                let mut source = self.engine.render(
                    &model_template,
                    &ModelContext {
                        target,
                        tables: &single,
                        imports: &imports,
                    },
                )?;
                if let Some(query_template) = &query_template {
                    let imports = query_imports(language.as_ref(), &single);
                    source.push_str(&self.engine.render(
                        query_template,
                        &ModelContext {
                            target,
                            tables: &single,
                            imports: &imports,
                        },
                    )?);
                }
                let path = target.out_file(&table.name);
                written.push(write_formatted(&path, &source, formatter.as_ref())?);
            }
        }
        Ok(written)
    }

    /// Generate every configured data source, then the init file
    pub async fn exec_settings<S: AsRef<str>>(
        &mut self,
        settings: &Settings,
        names: &[S],
    ) -> Result<ReverseReport> {
        let mut report = ReverseReport::default();
        let base = match settings.reverse_target("*") {
            Some(target) if !target.is_disabled() => target,
            _ => {
                log::info!("Reverse target disabled, nothing to generate");
                return Ok(report);
            }
        };

        let conns = settings.conn_configs(names);
        if conns.is_empty() {
            return Err(ReverseError::NoConnection(
                "none of the requested connections is configured".to_string(),
            ));
        }

        let mut imports = BTreeMap::new();
        let mut bootstraps = BTreeMap::new();
        let mut last_target = None;
        for (key, conf) in &conns {
            let mut target = base.merge_options(key);
            let language = self.registry.get_language(&target.language);
            let spec = ConnectionSpec::from_config(conf, language.as_deref());
            log::info!("Reversing data source '{}'", key);

            report.merge(self.reverse(&mut target, &spec).await?);

            let bootstrap = if spec.driver.is_cache() {
                TemplateKind::Cache
            } else {
                TemplateKind::Conn
            };
            imports.insert(key.clone(), target.namespace.clone());
            bootstraps.insert(key.clone(), bootstrap.file_stem().to_string());
            last_target = Some(target);
        }

        if !base.init_namespace.is_empty() {
            if let Some(target) = last_target {
                if let Some(path) = self.gen_init_file(&target, &imports, &bootstraps)? {
                    report.written.push(path);
                }
            }
        }
        Ok(report)
    }

    /// Render the init file one directory above `target.output_dir`,
    /// wiring every data source in `imports` (key to namespace)
    pub fn gen_init_file(
        &mut self,
        target: &ReverseTarget,
        imports: &BTreeMap<String, String>,
        bootstraps: &BTreeMap<String, String>,
    ) -> Result<Option<PathBuf>> {
        let mut target = target.clone();
        let language = self.registry.fix_target(&mut target);
        let target = &target;
        let template = match &target.init_template_path {
            Some(path) => Some(self.compile_file("custom-init", path)?),
            None => self.preset_template(language.as_ref(), TemplateKind::Init)?,
        };
        let template = match template {
            Some(template) => template,
            None => {
                log::warn!("No init template for language '{}'", target.language);
                return Ok(None);
            }
        };

        let path = target.parent_out_file(INIT_FILE_NAME, 1);
        let init_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let namespace = language
            .as_ref()
            .map(|l| l.resolve_namespace(init_dir))
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let sources = imports
            .iter()
            .map(|(key, ns)| InitSource {
                key: key.clone(),
                namespace: ns.clone(),
                bootstrap: bootstraps
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| TemplateKind::Conn.file_stem().to_string()),
                path: format!("{}/{}", target.init_namespace, key),
            })
            .collect();

        let source = self.engine.render(
            &template,
            &InitContext {
                target,
                namespace,
                imports,
                bootstraps,
                sources,
            },
        )?;
        let formatter = self.registry.resolve_formatter(target, language.as_ref());
        std::fs::create_dir_all(init_dir)?;
        Ok(Some(write_formatted(&path, &source, formatter.as_ref())?))
    }

    fn write_bootstrap(
        &mut self,
        target: &ReverseTarget,
        spec: &ConnectionSpec,
        language: &Arc<dyn LanguageSupport>,
    ) -> Result<PathBuf> {
        let kind = if spec.driver.is_cache() {
            TemplateKind::Cache
        } else {
            TemplateKind::Conn
        };
        let template = self
            .preset_template(Some(language), kind)?
            .ok_or_else(|| {
                ReverseError::Config(format!(
                    "language '{}' has no {} template",
                    language.name(),
                    kind
                ))
            })?;

        let mut spec = spec.clone();
        if spec.importer_path.is_empty() {
            spec.importer_path = language.driver_import_path(&spec.driver);
        }
        let source = self.engine.render(
            &template,
            &BootstrapContext {
                target,
                source: &spec,
            },
        )?;
        let formatter = self.registry.resolve_formatter(target, Some(language));
        std::fs::create_dir_all(&target.output_dir)?;
        write_formatted(&target.out_file(kind.file_stem()), &source, formatter.as_ref())
    }

    fn apply_mixins(&self, target: &ReverseTarget) -> Vec<ReverseError> {
        match &self.mixins {
            Some(applier) => {
                let errors = applier.apply(target);
                for error in &errors {
                    log::warn!("{}", error);
                }
                errors
            }
            None => {
                log::warn!("Mixins requested but no mixin applier installed, skipping");
                Vec::new()
            }
        }
    }

    fn model_template(
        &mut self,
        target: &ReverseTarget,
        language: Option<&Arc<dyn LanguageSupport>>,
    ) -> Result<Option<String>> {
        match &target.template_path {
            Some(path) => self.compile_file("custom-model", path).map(Some),
            None => self.preset_template(language, TemplateKind::Model),
        }
    }

    /// An unreadable or empty query template disables the query file
    fn query_template(
        &mut self,
        target: &ReverseTarget,
        language: Option<&Arc<dyn LanguageSupport>>,
    ) -> Result<Option<String>> {
        match &target.query_template_path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(content) if !content.trim().is_empty() => {
                    let name = format!("custom-query:{}", path.display());
                    self.engine.compile(&name, &content)?;
                    Ok(Some(name))
                }
                Ok(_) => {
                    log::warn!("Query template {} is empty, skipping queries", path.display());
                    Ok(None)
                }
                Err(e) => {
                    log::warn!(
                        "Cannot read query template {}: {}, skipping queries",
                        path.display(),
                        e
                    );
                    Ok(None)
                }
            },
            None => self.preset_template(language, TemplateKind::Query),
        }
    }

    fn preset_template(
        &mut self,
        language: Option<&Arc<dyn LanguageSupport>>,
        kind: TemplateKind,
    ) -> Result<Option<String>> {
        let Some(language) = language else {
            return Ok(None);
        };
        let Some(content) = language.template(kind) else {
            return Ok(None);
        };
        let name = format!("{}/{}", language.name(), kind);
        self.engine.compile_once(&name, content)?;
        Ok(Some(name))
    }

    fn compile_file(&mut self, prefix: &str, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReverseError::Config(format!(
                "Failed to read template '{}': {}",
                path.display(),
                e
            ))
        })?;
        let name = format!("{}:{}", prefix, path.display());
        self.engine.compile(&name, &content)?;
        Ok(name)
    }
}

/// Strip the table prefix, resolve field names and key tables by their
/// original name
fn rename_tables(
    table_prefix: &str,
    target: &ReverseTarget,
    language: Option<&dyn LanguageSupport>,
    tables: Vec<SchemaTable>,
) -> Result<TableMap> {
    let mut renamed = TableMap::new();
    for mut table in tables {
        let original = table.name.clone();
        if !table_prefix.is_empty() {
            if let Some(stripped) = table.name.strip_prefix(table_prefix) {
                table.name = stripped.to_string();
            }
        }
        for column in table.columns.iter_mut() {
            column.field_name = target.column_mapper.table_to_obj(&column.name);
            let valid = match language {
                Some(language) => language.is_field_name(&column.field_name),
                None => is_identifier(&column.field_name),
            };
            if !valid {
                return Err(ReverseError::InvalidIdentifier {
                    table: original,
                    column: column.name.clone(),
                    field: column.field_name.clone(),
                });
            }
        }
        renamed.insert(original, table);
    }
    Ok(renamed)
}

/// Tables whose per-table file name is also taken by an earlier table or
/// by a bootstrap file, as (original name, file stem)
fn file_collisions(tables: &TableMap) -> Vec<(String, String)> {
    let mut taken: HashSet<&str> = [
        TemplateKind::Conn.file_stem(),
        TemplateKind::Cache.file_stem(),
    ]
    .into_iter()
    .collect();
    let mut collisions = Vec::new();
    for (original, table) in tables {
        if !taken.insert(table.name.as_str()) {
            collisions.push((original.clone(), table.name.clone()));
        }
    }
    collisions
}

fn query_imports(language: Option<&Arc<dyn LanguageSupport>>, tables: &TableMap) -> ImportMap {
    language
        .map(|l| l.query_imports(tables))
        .unwrap_or_default()
}

fn write_formatted(path: &Path, source: &str, formatter: &dyn Formatter) -> Result<PathBuf> {
    let formatted = formatter.format(path, source)?;
    std::fs::write(path, formatted)?;
    log::debug!("Wrote {}", path.display());
    Ok(path.to_path_buf())
}
