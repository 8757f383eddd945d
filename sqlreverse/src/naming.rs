//! Identifier naming conventions and string-case helpers
//!
//! Every function here is a pure function of its input so that generating
//! twice from the same schema gives byte-identical output.

use serde::{Deserialize, Serialize};

/// Initialisms kept fully upper-cased by the `gonic` mapper
const INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS",
    "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

/// Words whose plural is the word itself
const UNCOUNTABLES: &[&str] = &[
    "equipment", "fish", "information", "jeans", "media", "money", "news", "police", "rice",
    "series", "sheep", "species",
];

/// Irregular singular/plural pairs
const IRREGULARS: &[(&str, &str)] = &[
    ("child", "children"),
    ("man", "men"),
    ("move", "moves"),
    ("person", "people"),
    ("sex", "sexes"),
    ("woman", "women"),
];

/// Table/column naming strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NameMapper {
    /// `user_name` -> `UserName`
    #[default]
    Snake,
    /// Identity
    Same,
    /// `user_id` -> `UserID`, keeping known initialisms upper-cased
    Gonic,
}

impl NameMapper {
    /// Map a database identifier to a source identifier
    pub fn table_to_obj(&self, name: &str) -> String {
        match self {
            NameMapper::Snake => title_cased_name(name),
            NameMapper::Same => name.to_string(),
            NameMapper::Gonic => gonic_cased_name(name),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NameMapper::Snake => "snake",
            NameMapper::Same => "same",
            NameMapper::Gonic => "gonic",
        }
    }
}

impl From<&str> for NameMapper {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "gonic" => NameMapper::Gonic,
            "same" => NameMapper::Same,
            _ => NameMapper::Snake,
        }
    }
}

impl From<String> for NameMapper {
    fn from(name: String) -> Self {
        NameMapper::from(name.as_str())
    }
}

impl From<NameMapper> for String {
    fn from(mapper: NameMapper) -> Self {
        mapper.as_str().to_string()
    }
}

fn title_cased_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper_next = true;

    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }

    result
}

fn gonic_cased_name(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let upper = part.to_uppercase();
            if INITIALISMS.contains(&upper.as_str()) {
                upper
            } else {
                capitalize(part)
            }
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

// String transformation utilities

/// `UserAccount` / `XMLHttpRequest` -> `user_account` / `xml_http_request`
pub fn underscore(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '-' || ch == ' ' {
            result.push('_');
            continue;
        }
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |c| c.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.extend(ch.to_lowercase());
    }

    result
}

/// `user_account` -> `UserAccount`
pub fn camelize(input: &str) -> String {
    input
        .split(|c: char| c == '_' || c == '-' || c == ' ')
        .map(capitalize)
        .collect()
}

/// Upper-case the first letter of every space-separated word
pub fn title(input: &str) -> String {
    input
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn pluralize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let lower = input.to_lowercase();
    if UNCOUNTABLES.contains(&lower.as_str()) {
        return input.to_string();
    }
    for (singular, plural) in IRREGULARS {
        if lower == *plural {
            return input.to_string();
        }
        if lower == *singular {
            return keep_initial_case(input, plural);
        }
    }

    if lower.ends_with('y') && !ends_with_any(&lower, &["ay", "ey", "iy", "oy", "uy"]) {
        format!("{}ies", &input[..input.len() - 1])
    } else if ends_with_any(&lower, &["s", "sh", "ch", "x", "z"]) {
        format!("{}es", input)
    } else if lower.ends_with("fe") {
        format!("{}ves", &input[..input.len() - 2])
    } else if lower.ends_with('f') && !lower.ends_with("ff") {
        format!("{}ves", &input[..input.len() - 1])
    } else {
        format!("{}s", input)
    }
}

pub fn singularize(input: &str) -> String {
    let lower = input.to_lowercase();
    if UNCOUNTABLES.contains(&lower.as_str()) {
        return input.to_string();
    }
    for (singular, plural) in IRREGULARS {
        if lower == *plural {
            return keep_initial_case(input, singular);
        }
        if lower == *singular {
            return input.to_string();
        }
    }

    if lower.ends_with("ies") && lower.len() > 3 {
        format!("{}y", &input[..input.len() - 3])
    } else if lower.ends_with("ives") {
        format!("{}ife", &input[..input.len() - 3])
    } else if lower.ends_with("ves") && lower.len() > 3 {
        format!("{}f", &input[..input.len() - 3])
    } else if ends_with_any(&lower, &["sses", "shes", "ches", "xes", "zes"]) {
        input[..input.len() - 2].to_string()
    } else if lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") {
        input[..input.len() - 1].to_string()
    } else {
        input.to_string()
    }
}

/// Plural form, with `suffix` appended when the plural equals the word
pub fn diff_pluralize(word: &str, suffix: &str) -> String {
    let words = pluralize(word);
    if words == word {
        format!("{}{}", words, suffix)
    } else {
        words
    }
}

fn ends_with_any(word: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| word.ends_with(s))
}

fn keep_initial_case(original: &str, replacement: &str) -> String {
    if original.chars().next().map_or(false, char::is_uppercase) {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

/// Whether `name` is an identifier: a letter or `_`, then letters,
/// digits and `_`. Letters and digits are Unicode ones.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Lower-cased identifier built from an arbitrary name, e.g. a directory
pub fn sanitize_identifier(name: &str) -> String {
    let mut result: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if result.chars().next().map_or(false, |c| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}
