use anyhow::{Context, Result};
use sqlreverse::settings::{find_first_file, DEFAULT_SETTINGS_FILES};
use sqlreverse::{LanguageRegistry, Reverser, Settings, SnapshotSource};
use std::path::Path;
use std::sync::Arc;

pub mod languages;
pub mod reverse;
pub mod tables;

/// Load the given settings file, or the first default one that exists
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => find_first_file(DEFAULT_SETTINGS_FILES).with_context(|| {
            format!(
                "No settings file found, looked for {}",
                DEFAULT_SETTINGS_FILES.join(", ")
            )
        })?,
    };
    Settings::from_file(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

/// Reverser over the built-in languages, reading metadata snapshots
pub fn reverser() -> Reverser {
    Reverser::new(Arc::new(LanguageRegistry::with_builtins())).with_source(Box::new(SnapshotSource))
}
