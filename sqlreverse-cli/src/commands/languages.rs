use anyhow::Result;
use sqlreverse::LanguageRegistry;

pub fn run() -> Result<()> {
    let registry = LanguageRegistry::with_builtins();
    for name in registry.language_names() {
        if let Some(language) = registry.get_language(&name) {
            println!("{:<10} {}", name, language.extension());
        }
    }
    Ok(())
}
