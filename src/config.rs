use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: char = '👋';

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord_token: String,
    pub servers_path: PathBuf,
    pub log_level: String,
    pub command_prefix: char,
}

/// Contents of the credential file
#[derive(Debug, Deserialize)]
struct KeyFile {
    token: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let servers_path = lookup("SERVERS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("servers.json"));
        let key_path = lookup("KEY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("key.json"));

        let discord_token = match lookup("DISCORD_TOKEN").filter(|t| !t.trim().is_empty()) {
            Some(token) => token,
            None => read_token(&key_path)?,
        };

        let command_prefix = match lookup("COMMAND_PREFIX") {
            Some(raw) => parse_prefix(&raw)?,
            None => DEFAULT_PREFIX,
        };

        Ok(Config {
            discord_token,
            servers_path,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            command_prefix,
        })
    }
}

fn read_token(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).with_context(|| {
        format!(
            "DISCORD_TOKEN not set and no credential file at {}",
            path.display()
        )
    })?;
    let key: KeyFile = serde_json::from_str(&text)
        .with_context(|| format!("invalid credential file {}", path.display()))?;
    if key.token.trim().is_empty() {
        bail!("credential file {} has an empty token", path.display());
    }
    Ok(key.token)
}

fn parse_prefix(raw: &str) -> Result<char> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(prefix), None) => Ok(prefix),
        _ => bail!("COMMAND_PREFIX must be exactly one character, got '{}'", raw),
    }
}
