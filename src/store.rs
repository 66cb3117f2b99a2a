//! # Guild Configuration Store
//!
//! Per-guild forwarding channel and welcome template overrides, plus the global
//! default templates, persisted as a single JSON document.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Typed `defaults`/`guilds` layout, flat legacy files migrated on load
//! - 1.0.0: Initial flat JSON store

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::template::{self, TemplateVars};

pub const DEFAULT_TITLE: &str = "Hi {member_name}";
pub const DEFAULT_MESSAGE: &str =
    "Welcome to {guild_name}! Reply to this message and the server staff will read it.";

/// Settings for one guild. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "snowflake")]
    pub channel: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    pub title: String,
    pub message: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            title: DEFAULT_TITLE.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

/// Rendered welcome title and body for one member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeText {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerDocument {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub guilds: BTreeMap<u64, GuildConfig>,
}

impl ServerDocument {
    /// Parse either the current layout or the flat legacy layout
    /// (`{"<guild>": {...}, "default_title": .., "default_message": ..}`).
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let object = value
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("expected a JSON object at the top level"))?;

        let is_current = |key: &String| key == "defaults" || key == "guilds";
        if object.keys().all(is_current) {
            return Ok(serde_json::from_str(text)?);
        }
        if object.keys().any(is_current) {
            anyhow::bail!("document mixes the `defaults`/`guilds` layout with legacy keys");
        }

        info!("Migrating legacy server document layout");
        let mut document = ServerDocument::default();
        for (key, entry) in object {
            match key.as_str() {
                "default_title" => {
                    if let Some(title) = entry.as_str() {
                        document.defaults.title = title.to_string();
                    }
                }
                "default_message" => {
                    if let Some(message) = entry.as_str() {
                        document.defaults.message = message.to_string();
                    }
                }
                _ => match key.parse::<u64>() {
                    Ok(guild_id) => {
                        let config: GuildConfig = serde_json::from_value(entry.clone())
                            .with_context(|| format!("invalid legacy entry for guild {}", guild_id))?;
                        document.guilds.insert(guild_id, config);
                    }
                    Err(_) => warn!("Skipping unknown legacy key '{}'", key),
                },
            }
        }

        Ok(document)
    }

    pub fn guild(&self, guild_id: u64) -> GuildConfig {
        self.guilds.get(&guild_id).cloned().unwrap_or_default()
    }

    fn guild_mut(&mut self, guild_id: u64) -> &mut GuildConfig {
        self.guilds.entry(guild_id).or_default()
    }

    pub fn welcome(&self, guild_id: u64, vars: &TemplateVars<'_>) -> WelcomeText {
        let guild = self.guilds.get(&guild_id);
        let title = guild
            .and_then(|g| g.title.as_deref())
            .unwrap_or(&self.defaults.title);
        let message = guild
            .and_then(|g| g.message.as_deref())
            .unwrap_or(&self.defaults.message);

        WelcomeText {
            title: template::render(title, vars),
            message: template::render(message, vars),
        }
    }
}

#[derive(Clone)]
pub struct ConfigStore {
    path: Arc<PathBuf>,
    document: Arc<Mutex<ServerDocument>>,
}

impl ConfigStore {
    /// Load the document at `path`, creating a fresh one if the file is missing.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(text) => ServerDocument::from_json(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}, creating a new one", path.display());
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                let document = ServerDocument::default();
                write_document(&path, &document).await?;
                document
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        info!(
            "Config store loaded from {} ({} guilds)",
            path.display(),
            document.guilds.len()
        );

        Ok(ConfigStore {
            path: Arc::new(path),
            document: Arc::new(Mutex::new(document)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self, guild_id: u64) -> GuildConfig {
        self.document.lock().await.guild(guild_id)
    }

    pub async fn defaults(&self) -> Defaults {
        self.document.lock().await.defaults.clone()
    }

    pub async fn set_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.mutate(|doc| doc.guild_mut(guild_id).channel = Some(channel_id))
            .await
    }

    /// Returns the channel that was configured before clearing, if any
    pub async fn clear_channel(&self, guild_id: u64) -> Result<Option<u64>> {
        self.mutate(|doc| doc.guild_mut(guild_id).channel.take())
            .await
    }

    pub async fn set_title(&self, guild_id: u64, title: &str) -> Result<()> {
        self.mutate(|doc| doc.guild_mut(guild_id).title = Some(title.to_string()))
            .await
    }

    pub async fn set_message(&self, guild_id: u64, message: &str) -> Result<()> {
        self.mutate(|doc| doc.guild_mut(guild_id).message = Some(message.to_string()))
            .await
    }

    pub async fn welcome(&self, guild_id: u64, vars: &TemplateVars<'_>) -> WelcomeText {
        self.document.lock().await.welcome(guild_id, vars)
    }

    pub async fn save(&self) -> Result<()> {
        let document = self.document.lock().await;
        write_document(&self.path, &document).await
    }

    // The lock is held through the write so concurrent mutations land in order.
    async fn mutate<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut ServerDocument) -> T,
    {
        let mut document = self.document.lock().await;
        let result = apply(&mut document);
        write_document(&self.path, &document).await?;
        Ok(result)
    }
}

async fn write_document(path: &Path, document: &ServerDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;

    info!("Config written to {}", path.display());
    Ok(())
}

/// Snowflakes are written as strings and accepted as strings or numbers.
mod snowflake {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.serialize_str(&id.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(id)) => Ok(Some(id)),
            Some(Raw::Text(text)) => text.parse().map(Some).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("data").join("servers.json")
    }

    #[tokio::test]
    async fn test_load_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let store = ConfigStore::load(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(store.get(1).await, GuildConfig::default());
        assert_eq!(store.defaults().await, Defaults::default());

        let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["defaults"]["title"], DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servers.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ConfigStore::load(&path).await.err().unwrap();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[tokio::test]
    async fn test_set_then_clear_channel_leaves_no_field() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let store = ConfigStore::load(&path).await.unwrap();

        store.set_channel(10, 20).await.unwrap();
        assert_eq!(store.get(10).await.channel, Some(20));

        assert_eq!(store.clear_channel(10).await.unwrap(), Some(20));
        assert_eq!(store.get(10).await.channel, None);

        let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(on_disk["guilds"]["10"].get("channel").is_none());
    }

    #[tokio::test]
    async fn test_mutations_survive_reload() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let store = ConfigStore::load(&path).await.unwrap();
        store.set_channel(7, 99).await.unwrap();
        store.set_title(7, "Hey {member_name}!").await.unwrap();
        store.set_message(7, "Be nice in {guild_name}").await.unwrap();
        drop(store);

        let reloaded = ConfigStore::load(&path).await.unwrap();
        let guild = reloaded.get(7).await;
        assert_eq!(guild.channel, Some(99));
        assert_eq!(guild.title.as_deref(), Some("Hey {member_name}!"));
        assert_eq!(guild.message.as_deref(), Some("Be nice in {guild_name}"));
        assert!(!PathBuf::from(format!("{}.tmp", path.display())).exists());
    }

    #[tokio::test]
    async fn test_save_rewrites_whole_document() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let store = ConfigStore::load(&path).await.unwrap();
        store.set_channel(3, 4).await.unwrap();

        std::fs::remove_file(&path).unwrap();
        store.save().await.unwrap();

        let on_disk = ServerDocument::from_json(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk.guild(3).channel, Some(4));
        assert_eq!(on_disk.defaults, Defaults::default());
    }

    #[tokio::test]
    async fn test_welcome_uses_override_then_default() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::load(store_path(&dir)).await.unwrap();
        let vars = TemplateVars::new("Alice", "Rustaceans");

        let text = store.welcome(1, &vars).await;
        assert_eq!(text.title, "Hi Alice");
        assert_eq!(
            text.message,
            "Welcome to Rustaceans! Reply to this message and the server staff will read it."
        );

        store.set_title(1, "Hey {member_name}!").await.unwrap();
        let text = store.welcome(1, &vars).await;
        assert_eq!(text.title, "Hey Alice!");
        assert!(text.message.starts_with("Welcome to Rustaceans!"));

        // Other guilds keep the default
        assert_eq!(store.welcome(2, &vars).await.title, "Hi Alice");
    }

    #[test]
    fn test_legacy_layout_is_migrated() {
        let legacy = r#"{
            "default_title": "Hi {member_name}",
            "default_message": "Welcome to {guild_name}",
            "123": {"channel": 456, "title": "Yo"},
            "789": {},
            "junk": {"channel": 1}
        }"#;

        let document = ServerDocument::from_json(legacy).unwrap();
        assert_eq!(document.defaults.title, "Hi {member_name}");
        assert_eq!(document.defaults.message, "Welcome to {guild_name}");
        assert_eq!(document.guild(123).channel, Some(456));
        assert_eq!(document.guild(123).title.as_deref(), Some("Yo"));
        assert_eq!(document.guild(789), GuildConfig::default());
        assert_eq!(document.guilds.len(), 2);
    }

    #[test]
    fn test_current_layout_round_trips_string_ids() {
        let mut document = ServerDocument::default();
        document.guilds.insert(
            42,
            GuildConfig {
                channel: Some(1_234_567_890_123_456_789),
                title: None,
                message: None,
            },
        );

        let json = serde_json::to_string(&document).unwrap();
        assert!(json.contains(r#""channel":"1234567890123456789""#));
        assert_eq!(ServerDocument::from_json(&json).unwrap(), document);
    }

    #[test]
    fn test_mixed_layout_is_rejected() {
        let mixed = r#"{
            "defaults": {"title": "Custom", "message": "Custom body"},
            "123": {"channel": "456"}
        }"#;

        let err = ServerDocument::from_json(mixed).unwrap_err();
        assert!(err.to_string().contains("mixes"));
    }

    #[test]
    fn test_empty_object_is_current_layout() {
        let document = ServerDocument::from_json("{}").unwrap();
        assert_eq!(document, ServerDocument::default());
    }
}
