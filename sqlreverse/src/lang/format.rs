//! Language-neutral formatter and importer

use super::{Formatter, ImportMap, Importer, TableMap};
use crate::Result;
use std::path::Path;

/// Trims trailing whitespace, collapses runs of blank lines and ends the
/// text with exactly one newline. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn format(&self, _file: &Path, source: &str) -> Result<String> {
        Ok(tidy(source))
    }
}

pub(crate) fn tidy(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = 0;

    for line in source.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    if out.is_empty() {
        return String::new();
    }
    out
}

/// Resolves no imports at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImporter;

impl Importer for NoImporter {
    fn resolve_imports(&self, _tables: &TableMap) -> ImportMap {
        ImportMap::new()
    }
}
