//! Settings files, connection specs and reverse targets

use crate::lang::LanguageSupport;
use crate::naming::NameMapper;
use crate::{Result, ReverseError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

pub const INIT_FILE_NAME: &str = "init";
pub const CONN_FILE_NAME: &str = "conn";
pub const CACHE_FILE_NAME: &str = "cache";
pub const SINGLE_FILE_NAME: &str = "models";
pub const QUERY_FILE_NAME: &str = "queries";

/// Output directory that disables generation entirely
pub const NULL_OUTPUT_DIR: &str = "/dev/null";

pub const DEFAULT_LANGUAGE: &str = "rust";
pub const DEFAULT_OUTPUT_DIR: &str = "./models";

/// Default settings file candidates, in lookup order
pub const DEFAULT_SETTINGS_FILES: &[&str] = &[
    "settings.yml",
    "settings.yaml",
    "settings.json",
    "settings.toml",
];

/// Top-level settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub debug: bool,

    /// Connections by configuration key
    #[serde(default)]
    pub connections: BTreeMap<String, ConnConfig>,

    #[serde(default)]
    pub reverse_target: ReverseTarget,
}

/// One configured database or cache connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnConfig {
    pub driver_name: String,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub table_prefix: String,

    #[serde(default)]
    pub log_file: String,

    /// Explicit connection string, used as-is when present
    #[serde(default)]
    pub dsn: Option<String>,

    #[serde(default)]
    pub params: ConnParams,
}

/// Driver parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnParams {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// Supported drivers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Driver {
    MySql,
    Postgres,
    Sqlite,
    MsSql,
    Redis,
    Other(String),
}

impl Driver {
    pub fn as_str(&self) -> &str {
        match self {
            Driver::MySql => "mysql",
            Driver::Postgres => "postgres",
            Driver::Sqlite => "sqlite",
            Driver::MsSql => "mssql",
            Driver::Redis => "redis",
            Driver::Other(name) => name,
        }
    }

    /// Cache-backed drivers get a cache bootstrap instead of models
    pub fn is_cache(&self) -> bool {
        matches!(self, Driver::Redis)
    }

    fn default_port(&self) -> Option<u16> {
        match self {
            Driver::MySql => Some(3306),
            Driver::Postgres => Some(5432),
            Driver::MsSql => Some(1433),
            Driver::Redis => Some(6379),
            Driver::Sqlite | Driver::Other(_) => None,
        }
    }

    /// Build a URL connection string from parameters
    pub fn dsn(&self, params: &ConnParams) -> String {
        if self.as_str().is_empty() {
            return String::new();
        }
        if *self == Driver::Sqlite {
            return format!("sqlite://{}", params.database);
        }

        let host = params.host.as_deref().unwrap_or("localhost");
        let base = match params.port.or_else(|| self.default_port()) {
            Some(port) => format!("{}://{}:{}/{}", self.as_str(), host, port, params.database),
            None => format!("{}://{}/{}", self.as_str(), host, params.database),
        };

        let mut url = match Url::parse(&base) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Could not build a connection URL from '{}': {}", base, e);
                return base;
            }
        };
        if let Some(username) = params.username.as_deref().filter(|u| !u.is_empty()) {
            let _ = url.set_username(username);
        }
        if let Some(password) = params.password.as_deref().filter(|p| !p.is_empty()) {
            let _ = url.set_password(Some(password));
        }
        if !params.options.is_empty() {
            url.query_pairs_mut().extend_pairs(params.options.iter());
        }
        url.to_string()
    }
}

impl From<&str> for Driver {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "mysql" => Driver::MySql,
            "postgres" | "postgresql" | "pgsql" => Driver::Postgres,
            "sqlite" | "sqlite3" => Driver::Sqlite,
            "mssql" | "sqlserver" => Driver::MsSql,
            "redis" => Driver::Redis,
            other => Driver::Other(other.to_string()),
        }
    }
}

impl From<String> for Driver {
    fn from(name: String) -> Self {
        Driver::from(name.as_str())
    }
}

impl From<Driver> for String {
    fn from(driver: Driver) -> Self {
        driver.as_str().to_string()
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection as seen by the metadata source and the bootstrap templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub driver: Driver,
    pub table_prefix: String,
    /// Driver module imported by generated bootstrap code
    pub importer_path: String,
    pub conn_str: String,
    /// URL-encoded driver options
    pub opt_str: String,
    pub read_only: bool,
}

impl ConnectionSpec {
    /// Derive the spec of one configured connection
    pub fn from_config(conf: &ConnConfig, language: Option<&dyn LanguageSupport>) -> Self {
        let driver = Driver::from(conf.driver_name.as_str());
        let conn_str = match conf.dsn.as_deref().filter(|d| !d.is_empty()) {
            Some(dsn) => dsn.to_string(),
            None => driver.dsn(&conf.params),
        };
        let opt_str = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(conf.params.options.iter())
            .finish();
        let importer_path = language
            .map(|lang| lang.driver_import_path(&driver))
            .unwrap_or_default();

        Self {
            driver,
            table_prefix: conf.table_prefix.clone(),
            importer_path,
            conn_str,
            opt_str,
            read_only: conf.read_only,
        }
    }

    /// Reject specs that cannot possibly connect
    pub fn validate(&self) -> Result<()> {
        if self.driver.as_str().is_empty() || self.conn_str.is_empty() {
            return Err(ReverseError::Config(
                "the config of connection is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One configured output unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverseTarget {
    pub language: String,
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
    /// Namespace prefix the init file imports data sources from
    pub init_namespace: String,
    pub output_dir: PathBuf,
    pub template_path: Option<PathBuf>,
    pub query_template_path: Option<PathBuf>,
    pub init_template_path: Option<PathBuf>,
    pub table_mapper: NameMapper,
    pub column_mapper: NameMapper,
    /// Named formatter overriding the language's own
    pub formatter: String,
    /// Named importer overriding the language's own
    pub importer: String,
    /// File extension including the dot, defaulted by the language
    pub extension: String,
    /// Package/module name, defaulted by the language
    pub namespace: String,
    pub multiple_files: bool,
    pub apply_mixins: bool,
    pub mixin_dir_path: Option<PathBuf>,
    pub mixin_namespace: String,
}

impl Default for ReverseTarget {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            include_tables: Vec::new(),
            exclude_tables: Vec::new(),
            init_namespace: String::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            template_path: None,
            query_template_path: None,
            init_template_path: None,
            table_mapper: NameMapper::default(),
            column_mapper: NameMapper::default(),
            formatter: String::new(),
            importer: String::new(),
            extension: String::new(),
            namespace: String::new(),
            multiple_files: false,
            apply_mixins: false,
            mixin_dir_path: None,
            mixin_namespace: String::new(),
        }
    }
}

impl ReverseTarget {
    /// Default target whose init file imports from `<namespace>/models`
    pub fn default_for(namespace: &str) -> Self {
        Self {
            init_namespace: format!("{}/models", namespace),
            ..Default::default()
        }
    }

    /// Default target with the mixin pass enabled
    pub fn with_mixins(namespace: &str) -> Self {
        let mut target = Self::default_for(namespace);
        target.apply_mixins = true;
        target.mixin_dir_path = Some(target.output_dir.join("mixins"));
        target.mixin_namespace = format!("{}/mixins", target.init_namespace);
        target
    }

    /// Whether the target has been switched off
    pub fn is_disabled(&self) -> bool {
        self.output_dir == Path::new(NULL_OUTPUT_DIR)
    }

    /// Copy specialised for one data source
    pub fn merge_options(&self, key: &str) -> Self {
        let mut target = self.clone();
        if target.language.is_empty() {
            target.language = DEFAULT_LANGUAGE.to_string();
        }
        if !key.is_empty() {
            target.output_dir = target.output_dir.join(key);
        }
        target
    }

    pub fn file_name(&self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{}{}", stem, self.extension))
    }

    pub fn out_file(&self, stem: &str) -> PathBuf {
        self.file_name(&self.output_dir, stem)
    }

    /// File `backward` directories above the output directory
    pub fn parent_out_file(&self, stem: &str, backward: usize) -> PathBuf {
        let mut dir = self.output_dir.as_path();
        for _ in 0..backward {
            dir = dir.parent().unwrap_or_else(|| Path::new("."));
        }
        self.file_name(dir, stem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "yml" | "yaml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }

    fn decode<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        Ok(match self {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        })
    }
}

/// Resolve a settings path, probing known extensions when it has none
fn resolve_config_path(path: &Path) -> Option<(PathBuf, ConfigFormat)> {
    if let Some(format) = ConfigFormat::from_path(path) {
        return path.exists().then(|| (path.to_path_buf(), format));
    }
    for ext in ["yml", "yaml", "json", "toml"] {
        let candidate = PathBuf::from(format!("{}.{}", path.display(), ext));
        if candidate.is_file() {
            let format = ConfigFormat::from_path(&candidate)?;
            return Some((candidate, format));
        }
    }
    None
}

/// Read and decode any settings-like document
pub fn read_settings_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let (path, format) = resolve_config_path(path).ok_or_else(|| {
        ReverseError::Config(format!("Unknown settings file '{}'", path.display()))
    })?;
    let content = std::fs::read_to_string(&path).map_err(|e| {
        ReverseError::Config(format!(
            "Failed to read settings file '{}': {}",
            path.display(),
            e
        ))
    })?;
    let value = format.decode(&content)?;
    log::debug!("Loaded settings from: {}", path.display());
    Ok(value)
}

/// First candidate that exists on disk
pub fn find_first_file<P: AsRef<Path>>(candidates: &[P]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|p| p.as_ref())
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
}

impl Settings {
    /// Load settings, falling back to a sibling `databases` file for
    /// connections and dropping private (`_`-prefixed) connections
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut settings: Settings = read_settings_file(path)?;

        if settings.connections.is_empty() {
            let sibling = path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("databases");
            if resolve_config_path(&sibling).is_some() {
                settings.connections = read_settings_file(&sibling)?;
            }
        }

        settings.remove_privates();
        if settings.connections.is_empty() {
            return Err(ReverseError::NoConnection(format!(
                "no connections configured in '{}'",
                path.display()
            )));
        }
        Ok(settings)
    }

    pub fn remove_privates(&mut self) {
        self.connections.retain(|key, _| !key.starts_with('_'));
    }

    /// The reverse target, when `name` is `*` or its language
    pub fn reverse_target(&self, name: &str) -> Option<&ReverseTarget> {
        if name == "*" || name == self.reverse_target.language {
            Some(&self.reverse_target)
        } else {
            None
        }
    }

    /// Connections to generate for; all of them when `keys` is empty
    pub fn conn_configs<S: AsRef<str>>(&self, keys: &[S]) -> BTreeMap<String, ConnConfig> {
        if keys.is_empty() {
            return self.connections.clone();
        }
        keys.iter()
            .filter_map(|k| {
                self.connections
                    .get(k.as_ref())
                    .map(|c| (k.as_ref().to_string(), c.clone()))
            })
            .collect()
    }

    pub fn conn_config(&self, key: &str) -> Option<&ConnConfig> {
        self.connections.get(key)
    }
}
