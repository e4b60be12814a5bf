//! `companion onboard` — First-time setup.

use companion_config::AppConfig;
use companion_persona::{PersonaTemplate, TemplateSource};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let data_dir = config.data_dir();
    let memory_dir = config.memory_dir();
    let config_path = config.config_path();

    println!("Companion — First-Time Setup");
    println!("============================\n");

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        println!("✅ Created data directory: {}", data_dir.display());
    } else {
        println!("  Data directory exists: {}", data_dir.display());
    }

    if !memory_dir.exists() {
        std::fs::create_dir_all(&memory_dir)?;
        println!("✅ Created memory directory: {}", memory_dir.display());
    }

    let persona_path = config.persona_path();
    let template = PersonaTemplate::load_or_create_default(&persona_path);
    match template.source() {
        TemplateSource::CreatedDefault(path) => {
            println!("✅ Created persona template: {}", path.display())
        }
        TemplateSource::File(path) => println!("  Persona template exists: {}", path.display()),
        TemplateSource::BuiltIn => println!(
            "⚠️  Could not write {}; the built-in persona will be used",
            persona_path.display()
        ),
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Edit {} to pick a model", config_path.display());
        println!("   2. Edit {} to shape the persona", persona_path.display());
        println!("   3. Run: companion persona render <name> <message>\n");
    }

    println!("🎉 Setup complete!\n");

    Ok(())
}
