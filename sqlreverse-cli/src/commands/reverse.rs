use anyhow::Result;
use sqlreverse::Settings;

pub async fn run(settings: &Settings, names: &[String]) -> Result<()> {
    let mut reverser = super::reverser();
    let report = reverser.exec_settings(settings, names).await?;

    for path in &report.written {
        println!("📄 {}", path.display());
    }
    for error in &report.mixin_errors {
        println!("⚠️  {}", error);
    }
    println!(
        "\n✅ Generated {} files ({} mixin warnings)",
        report.written.len(),
        report.mixin_errors.len()
    );
    Ok(())
}
