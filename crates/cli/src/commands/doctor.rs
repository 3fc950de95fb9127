//! `scribbly doctor` — Diagnose configuration and provider health.

use scribbly_config::AppConfig;
use scribbly_core::message::Message;
use scribbly_core::provider::{Provider, ProviderRequest};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Scribbly Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file, using defaults (run `scribbly onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    let provider = &config.provider;
    println!("     Base URL: {}", provider.base_url);
    println!("     Model:    {}", provider.model);

    match provider.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => println!("  ✅ API key: {}", mask_key(key)),
        None => {
            println!("  ⚠️  No API key, requests will use heuristic fallback");
            issues += 1;
        }
    }

    if let Some(client) = scribbly_providers::build_from_config(provider) {
        match client.health_check().await {
            Ok(true) => println!("  ✅ Models endpoint reachable"),
            Ok(false) => {
                println!("  ⚠️  Models endpoint did not answer with success");
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Models endpoint unreachable: {e}");
                issues += 1;
            }
        }

        let mut request = ProviderRequest::new(provider.model.clone(), vec![Message::user("Hi")]);
        request.max_tokens = Some(8);
        match client.complete(request).await {
            Ok(response) => println!(
                "  ✅ Provider reachable, replied: {:?}",
                response.message.content.chars().take(40).collect::<String>()
            ),
            Err(e) => {
                println!("  ❌ Provider call failed: {e}");
                issues += 1;
            }
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

/// First 8 and last 4 characters of a credential.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_keys_show_head_and_tail() {
        assert_eq!(mask_key("sk-or-v1-abcdef0123456789"), "sk-or-v1...6789");
    }

    #[test]
    fn short_keys_are_fully_hidden() {
        assert_eq!(mask_key("abc123"), "******");
    }
}
