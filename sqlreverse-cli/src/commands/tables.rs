use anyhow::{Context, Result};
use sqlreverse::{ConnectionSpec, Settings};

pub async fn run(settings: &Settings, name: &str) -> Result<()> {
    let conf = settings
        .conn_config(name)
        .with_context(|| format!("Connection '{}' is not configured", name))?;
    let target = settings.reverse_target.merge_options(name);

    let reverser = super::reverser();
    let language = reverser.registry().get_language(&target.language);
    let spec = ConnectionSpec::from_config(conf, language.as_deref());
    if spec.driver.is_cache() {
        println!("'{}' is a {} cache, it has no tables", name, spec.driver);
        return Ok(());
    }

    let tables = reverser.list_tables(&target, &spec).await?;
    println!("=== Tables of '{}' ({}) ===\n", name, spec.driver);
    for table in &tables {
        println!("  {} ({} columns)", table.name, table.columns.len());
    }
    println!("\n{} tables", tables.len());
    Ok(())
}
