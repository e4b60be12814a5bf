//! `companion memory` — Memory management commands.

pub async fn users() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = super::open_memory(&config)?;

    let owners = store.owners();
    if owners.is_empty() {
        println!("   No memories stored yet.");
        return Ok(());
    }

    println!("🧠 Users with memories");
    for owner in owners {
        println!("  {owner:<20} {:>4}/{}", store.count(&owner), store.cap());
    }

    Ok(())
}

pub async fn list(owner: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = super::open_memory(&config)?;

    let memories = store.relevant_memories(owner, limit);
    if memories.is_empty() {
        println!("   No memories for {owner}.");
        return Ok(());
    }

    println!("🔍 Most relevant memories for {owner}");
    for (i, entry) in memories.iter().enumerate() {
        println!(
            "  {:>2}. [{:.2}] {}",
            i + 1,
            entry.importance,
            entry.render_line()
        );
    }

    Ok(())
}

pub async fn add(
    owner: &str,
    content: &str,
    importance: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = super::open_memory(&config)?;

    store.add_memory(owner, content, importance);
    store.close();

    println!(
        "✅ Remembered for {owner} ({} of {} slots used)",
        store.count(owner),
        store.cap()
    );

    Ok(())
}

pub async fn export(owner: &str, output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = super::open_memory(&config)?;

    let memories = store.all_memories(owner);
    let json = serde_json::to_string_pretty(&memories)?;
    std::fs::write(output, &json)?;
    println!("📤 Exported {} memories for {owner} to {output}", memories.len());

    Ok(())
}
