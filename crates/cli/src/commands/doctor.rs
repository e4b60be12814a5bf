//! `companion doctor` — Diagnose setup problems.

use companion_config::AppConfig;
use companion_memory::{JsonDirStore, MemoryFileStore};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Companion Doctor");
    println!("===================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            if config.config_path().exists() {
                println!("  ✅ Config file valid");
            } else {
                println!("  ⚠️  No config file — run `companion onboard` (defaults in use)");
                issues += 1;
            }
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    let memory_dir = config.memory_dir();
    if !memory_dir.is_dir() {
        println!("  ⚠️  No memory directory — run `companion onboard`");
        issues += 1;
    } else {
        match JsonDirStore::open(&memory_dir) {
            Ok(files) => {
                let owners = files.list_owners()?;
                let mut unreadable = 0;
                for owner in &owners {
                    if let Err(e) = files.read(owner) {
                        println!("  ❌ {owner}: {e}");
                        unreadable += 1;
                    }
                }
                if unreadable == 0 {
                    println!("  ✅ Memory files readable ({} users)", owners.len());
                } else {
                    issues += unreadable;
                }
            }
            Err(e) => {
                println!("  ❌ Memory directory unusable: {e}");
                issues += 1;
            }
        }
    }

    let persona_path = config.persona_path();
    match std::fs::read_to_string(&persona_path) {
        Ok(text) if text.contains("{USER_MESSAGE}") => println!("  ✅ Persona template found"),
        Ok(_) => {
            println!("  ⚠️  Persona template never uses {{USER_MESSAGE}}");
            issues += 1;
        }
        Err(_) => {
            println!("  ⚠️  No persona template at {} — the default will be created on first use", persona_path.display());
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
