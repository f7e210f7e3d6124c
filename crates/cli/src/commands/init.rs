//! `finsight init` — first-time setup.

use std::path::Path;

use finsight_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("📈 FinSight — First-Time Setup");
    println!("==============================\n");

    let path = Path::new("finsight.toml");
    if path.exists() {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete and re-run init.\n");
        return Ok(());
    }

    std::fs::write(path, AppConfig::default_toml())?;
    println!("✅ Created finsight.toml");
    println!("\n📝 Next steps:");
    println!("   1. Edit finsight.toml: service URLs and data file paths");
    println!("   2. Export FINSIGHT_API_KEY");
    println!("   3. Run: finsight ask \"What was NVIDIA revenue in 2021?\"\n");

    Ok(())
}
