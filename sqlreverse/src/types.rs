//! Schema metadata types consumed by the generation pipeline

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Table metadata as delivered by a metadata source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaTable {
    /// Display name. Starts as the database name and may lose its
    /// configured prefix before templating.
    pub name: String,

    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<SchemaColumn>,

    /// Primary-key column names
    #[serde(default)]
    pub primary_keys: Vec<String>,

    /// Index definitions by index name
    #[serde(default)]
    pub indexes: BTreeMap<String, IndexDef>,

    /// Columns filled on insert
    #[serde(default)]
    pub created: BTreeSet<String>,

    /// Column touched on every update
    #[serde(default)]
    pub updated: Option<String>,

    /// Soft-delete column
    #[serde(default)]
    pub deleted: Option<String>,

    #[serde(default)]
    pub comment: String,
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaColumn {
    /// Database column name
    pub name: String,

    /// Resolved identifier, filled in by the column naming mapper
    #[serde(default)]
    pub field_name: String,

    /// Normalized SQL type
    #[serde(rename = "type")]
    pub sql_type: SqlType,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub auto_increment: bool,

    /// Default literal exactly as the database reports it
    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    /// Names of the indexes this column belongs to
    #[serde(default)]
    pub indexes: BTreeSet<String>,
}

/// Normalized SQL type descriptor
///
/// Lengths of zero mean "not declared".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlType {
    pub name: String,

    #[serde(default)]
    pub length: u32,

    #[serde(default)]
    pub length2: u32,

    #[serde(default)]
    pub enum_options: Vec<String>,

    #[serde(default)]
    pub set_options: Vec<String>,
}

/// Index kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Unique,
    Index,
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: IndexKind,

    pub columns: Vec<String>,
}

impl SqlType {
    /// Create a type with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a type with a declared length or display width
    pub fn with_length(name: impl Into<String>, length: u32) -> Self {
        Self {
            name: name.into(),
            length,
            ..Default::default()
        }
    }

    /// Upper-cased type name used for all lookups
    pub fn normalized_name(&self) -> String {
        self.name.trim().to_uppercase()
    }

    /// Whether the type holds a date and/or time
    pub fn is_time(&self) -> bool {
        matches!(
            self.normalized_name().as_str(),
            "DATE" | "DATETIME" | "TIME" | "TIMESTAMP" | "TIMESTAMPZ" | "SMALLDATETIME" | "YEAR"
        )
    }
}

impl SchemaColumn {
    /// Create a nullable, unkeyed column
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            field_name: String::new(),
            sql_type,
            nullable: true,
            primary_key: false,
            auto_increment: false,
            default: None,
            comment: None,
            indexes: BTreeSet::new(),
        }
    }
}

impl SchemaTable {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            indexes: BTreeMap::new(),
            created: BTreeSet::new(),
            updated: None,
            deleted: None,
            comment: String::new(),
        }
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name, falling back to a case-insensitive match
    pub fn column(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    /// Primary-key columns in key order
    pub fn pk_columns(&self) -> Vec<&SchemaColumn> {
        self.primary_keys
            .iter()
            .filter_map(|name| self.column(name))
            .collect()
    }

    /// Append a column, keeping the key and index bookkeeping in sync
    pub fn add_column(&mut self, column: SchemaColumn) {
        if column.primary_key && !self.primary_keys.contains(&column.name) {
            self.primary_keys.push(column.name.clone());
        }
        for index_name in &column.indexes {
            if let Some(index) = self.indexes.get_mut(index_name) {
                if !index.columns.contains(&column.name) {
                    index.columns.push(column.name.clone());
                }
            }
        }
        self.columns.push(column);
    }

    /// Register an index and mark its member columns
    pub fn add_index(&mut self, index: IndexDef) {
        for column in self.columns.iter_mut() {
            if index.columns.contains(&column.name) {
                column.indexes.insert(index.name.clone());
            }
        }
        self.indexes.insert(index.name.clone(), index);
    }
}
