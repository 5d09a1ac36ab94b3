//! Server command implementation

use std::path::Path;

use anyhow::Result;
use ledgerlens_core::ai::{AIClient, NarrativeBackend};

use super::open_db;

/// Environment variable holding comma-separated API keys
pub const API_KEYS_ENV: &str = "LEDGERLENS_API_KEYS";

/// Build the server configuration from flags and the environment
pub fn server_config(no_auth: bool, api_keys_var: Option<&str>) -> ledgerlens_server::ServerConfig {
    ledgerlens_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys: api_keys_var
            .map(ledgerlens_server::parse_api_keys)
            .unwrap_or_default(),
    }
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting LedgerLens web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let api_keys_var = std::env::var(API_KEYS_ENV).ok();
    let config = server_config(no_auth, api_keys_var.as_deref());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if config.api_keys.is_empty() {
        println!("   🔒 Authentication: API key (none configured)");
        println!("      Set {} to allow API access", API_KEYS_ENV);
    } else {
        println!(
            "   🔑 API keys: {} configured ({})",
            config.api_keys.len(),
            API_KEYS_ENV
        );
    }
    match AIClient::from_env() {
        Some(client) => println!(
            "   🤖 Narrative backend: {} at {} ({})",
            client.backend_name(),
            client.host(),
            client.model()
        ),
        None => println!("   💡 Narrative backend: not configured (set OLLAMA_HOST)"),
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    ledgerlens_server::serve_with_config(db, host, port, config).await?;

    Ok(())
}
