//! Include/exclude glob filtering of table lists

use crate::types::SchemaTable;
use glob::Pattern;

/// A compiled list of shell-style glob patterns
///
/// Patterns that fail to compile are dropped with a warning.
#[derive(Debug, Clone, Default)]
pub struct Globs {
    patterns: Vec<Pattern>,
}

impl Globs {
    pub fn new<S: AsRef<str>>(wildcards: &[S]) -> Self {
        let patterns = wildcards
            .iter()
            .filter_map(|w| match Pattern::new(w.as_ref()) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    log::warn!("Ignoring invalid table pattern '{}': {}", w.as_ref(), e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when any pattern matches, or `for_empty` when there are none
    pub fn match_any(&self, word: &str, for_empty: bool) -> bool {
        if self.patterns.is_empty() {
            return for_empty;
        }
        self.patterns.iter().any(|p| p.matches(word))
    }

    /// True when every pattern matches, or `for_empty` when there are none
    pub fn match_all(&self, word: &str, for_empty: bool) -> bool {
        if self.patterns.is_empty() {
            return for_empty;
        }
        self.patterns.iter().all(|p| p.matches(word))
    }
}

/// Keep the tables that match no exclude pattern and at least one include
/// pattern. An empty include list lets everything through. Source order is
/// preserved.
pub fn filter_tables<S: AsRef<str>>(
    tables: Vec<SchemaTable>,
    includes: &[S],
    excludes: &[S],
) -> Vec<SchemaTable> {
    let include = Globs::new(includes);
    let exclude = Globs::new(excludes);

    tables
        .into_iter()
        .filter(|table| {
            !exclude.match_any(&table.name, false) && include.match_any(&table.name, true)
        })
        .collect()
}
