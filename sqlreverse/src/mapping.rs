//! SQL type mapping and column tag synthesis
//!
//! The mapping is language-neutral: it yields a [`TargetType`] which each
//! language plugin turns into a concrete type name.

use crate::types::{IndexKind, SchemaColumn, SchemaTable, SqlType};
use serde::{Deserialize, Serialize};

/// Longest text column still treated as a guaranteed-length string
pub const FIXED_STR_MAX_SIZE: u32 = 255;

pub const TAG_NOT_NULL: &str = "notnull";
pub const TAG_PRIMARY_KEY: &str = "pk";
pub const TAG_AUTO_INCR: &str = "autoincr";
pub const TAG_UNIQUE: &str = "unique";
pub const TAG_INDEX: &str = "index";

/// Language-neutral target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Bool,
    SmallInt,
    Int32,
    Int64,
    Float32,
    Float64,
    Timestamp,
    Bytes,
    String,
    /// Possibly absent long text
    NullableString,
}

impl TargetType {
    pub fn is_integer(&self) -> bool {
        matches!(self, TargetType::SmallInt | TargetType::Int32 | TargetType::Int64)
    }
}

/// Map a SQL type to its target type
pub fn map_type(sql_type: &SqlType) -> TargetType {
    match sql_type.normalized_name().as_str() {
        "BOOL" | "BOOLEAN" => TargetType::Bool,
        "BIT" | "TINYINT" => {
            if sql_type.length == 1 {
                TargetType::Bool
            } else {
                TargetType::SmallInt
            }
        }
        "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "SERIAL" => TargetType::Int32,
        "BIGINT" | "BIGSERIAL" => TargetType::Int64,
        "FLOAT" | "REAL" => TargetType::Float32,
        "DOUBLE" => TargetType::Float64,
        "DATE" | "DATETIME" | "TIME" | "TIMESTAMP" | "TIMESTAMPZ" | "SMALLDATETIME" | "YEAR" => {
            TargetType::Timestamp
        }
        "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BYTEA" | "BINARY" | "VARBINARY"
        | "UNIQUEIDENTIFIER" => TargetType::Bytes,
        "VARCHAR" | "NVARCHAR" | "TINYTEXT" | "TEXT" | "NTEXT" | "MEDIUMTEXT" | "LONGTEXT" => {
            if sql_type.length == 0 || sql_type.length > FIXED_STR_MAX_SIZE {
                TargetType::NullableString
            } else {
                TargetType::String
            }
        }
        _ => TargetType::String,
    }
}

/// Type name with its declared length, e.g. `VARCHAR(50)`, `DECIMAL(10,2)`
/// or `ENUM('a','b')`. Options are always sorted.
pub fn column_type_string(sql_type: &SqlType) -> String {
    let mut result = sql_type.name.clone();

    if sql_type.length != 0 {
        if sql_type.length2 != 0 {
            result.push_str(&format!("({},{})", sql_type.length, sql_type.length2));
        } else {
            result.push_str(&format!("({})", sql_type.length));
        }
    } else if !sql_type.enum_options.is_empty() {
        result.push_str(&quoted_options(&sql_type.enum_options));
    } else if !sql_type.set_options.is_empty() {
        result.push_str(&quoted_options(&sql_type.set_options));
    }

    result
}

fn quoted_options(options: &[String]) -> String {
    let mut sorted: Vec<&String> = options.iter().collect();
    sorted.sort();
    sorted.dedup();
    let quoted: Vec<String> = sorted.iter().map(|o| format!("'{}'", o)).collect();
    format!("({})", quoted.join(","))
}

/// Whether `column` is the table's only primary key and an integer
fn is_sole_integer_pk(table: &SchemaTable, column: &SchemaColumn) -> bool {
    table.primary_keys.len() == 1
        && table.primary_keys[0] == column.name
        && map_type(&column.sql_type).is_integer()
}

/// Ordered tag tokens for a column
///
/// Order: not-null, primary key, default, auto-increment, timestamp role,
/// comment, one token per index (sorted by index name), type with length.
pub fn tag_tokens(table: &SchemaTable, column: &SchemaColumn) -> Vec<String> {
    let mut tokens = Vec::new();

    if !column.nullable && !is_sole_integer_pk(table, column) {
        tokens.push(TAG_NOT_NULL.to_string());
    }
    if column.primary_key {
        tokens.push(TAG_PRIMARY_KEY.to_string());
    }
    if let Some(default) = column.default.as_deref().filter(|d| !d.is_empty()) {
        tokens.push(format!("default {}", default));
    }
    if column.auto_increment {
        tokens.push(TAG_AUTO_INCR.to_string());
    }

    if column.sql_type.is_time() {
        let lower = column.name.to_lowercase();
        for role in ["created", "updated", "deleted"] {
            if lower.starts_with(role) {
                tokens.push(role.to_string());
                break;
            }
        }
    }

    if let Some(comment) = column.comment.as_deref().filter(|c| !c.is_empty()) {
        tokens.push(format!("comment('{}')", comment));
    }

    // BTreeSet iteration is already sorted by index name
    for index_name in &column.indexes {
        let Some(index) = table.indexes.get(index_name) else {
            continue;
        };
        let mut token = match index.kind {
            IndexKind::Unique => TAG_UNIQUE.to_string(),
            IndexKind::Index => TAG_INDEX.to_string(),
        };
        if index.columns.len() > 1 {
            token.push_str(&format!("({})", index.name));
        }
        tokens.push(token);
    }

    tokens.push(column_type_string(&column.sql_type));
    tokens
}

/// First created-timestamp column of a table, falling back to a temporal
/// `created_at` column. Empty when there is none.
pub fn created_column(table: &SchemaTable) -> String {
    if let Some(column) = table.created.iter().find_map(|name| table.column(name)) {
        return column.name.clone();
    }
    match table.column("created_at") {
        Some(column) if column.sql_type.is_time() => "created_at".to_string(),
        _ => String::new(),
    }
}

/// Field name of the table's sole primary key. Empty for composite or
/// missing keys.
pub fn single_pkey(table: &SchemaTable) -> String {
    match table.pk_columns().as_slice() {
        [column] => column.field_name.clone(),
        _ => String::new(),
    }
}
