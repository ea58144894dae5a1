//! Effective configuration display

use std::path::Path;

use anyhow::Result;
use cofre_core::config::default_config_path;
use cofre_core::{EngineConfig, OracleClient};

/// Print the merged configuration and where it came from
pub fn cmd_config(config: &EngineConfig, explicit: Option<&Path>) -> Result<()> {
    let source = match explicit {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (missing, using defaults)", path.display()),
        None => match default_config_path() {
            Some(path) if path.exists() => path.display().to_string(),
            _ => "built-in defaults".to_string(),
        },
    };

    println!("⚙️  Configuration source: {}", source);
    println!(
        "   Override location: {}",
        default_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );

    match OracleClient::from_env() {
        Some(client) => {
            let info = client.info();
            println!(
                "   🤖 Oracle: {} ({} at {})",
                info.backend, info.model, info.host
            );
        }
        None => println!("   💡 Oracle: disabled (set OLLAMA_HOST or AI_BACKEND to enable)"),
    }

    println!();
    println!("{}", serde_json::to_string_pretty(config)?);

    Ok(())
}
