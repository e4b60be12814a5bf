//! `companion status` — Show resolved configuration.

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    let on_off = |flag: bool| if flag { "enabled" } else { "disabled" };

    println!("Companion Status");
    println!("================");
    println!("  Data dir:     {}", config.data_dir().display());
    println!("  Model:        {}", config.model);
    println!("  Temperature:  {}", config.temperature);
    println!("  Memory:       {}", on_off(config.memory.enabled));
    println!("  Memory dir:   {}", config.memory_dir().display());
    println!("  Memory cap:   {} per user", config.memory.cap);
    println!("  Recall:       {} per prompt", config.memory.recall_limit);
    println!("  History cap:  {} turns per user", config.conversation.history_cap);
    println!("  History:      {} turns per prompt", config.conversation.max_history_messages);
    println!("  Persona:      {}", config.persona_path().display());
    println!("  Emotions:     {}", on_off(config.persona.enable_emotions));

    if config.config_path().exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `companion onboard` first");
    }

    Ok(())
}
