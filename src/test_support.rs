//! Recording fake of [`Platform`] shared by the unit tests.

use anyhow::{anyhow, Result};
use serenity::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::embeds::Embed;
use crate::platform::{InboundMessage, Platform};
use crate::store::ConfigStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Embed(u64, Embed),
    Text(u64, String),
    Direct(u64, Embed),
}

pub struct FakePlatform {
    owner: u64,
    admins: HashSet<(u64, u64)>,
    guild_names: HashMap<u64, String>,
    unreachable: HashSet<u64>,
    sent: Mutex<Vec<Sent>>,
    owner_lookups: AtomicUsize,
}

impl FakePlatform {
    pub fn new(owner: u64) -> Self {
        FakePlatform {
            owner,
            admins: HashSet::new(),
            guild_names: HashMap::new(),
            unreachable: HashSet::new(),
            sent: Mutex::new(Vec::new()),
            owner_lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_admin(mut self, guild_id: u64, user_id: u64) -> Self {
        self.admins.insert((guild_id, user_id));
        self
    }

    pub fn with_guild_name(mut self, guild_id: u64, name: &str) -> Self {
        self.guild_names.insert(guild_id, name.to_string());
        self
    }

    /// Sends to this channel or user fail
    pub fn with_unreachable(mut self, id: u64) -> Self {
        self.unreachable.insert(id);
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn owner_lookups(&self) -> usize {
        self.owner_lookups.load(Ordering::SeqCst)
    }

    fn record(&self, id: u64, sent: Sent) -> Result<()> {
        if self.unreachable.contains(&id) {
            return Err(anyhow!("cannot send to {}", id));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn send_embed(&self, channel_id: u64, embed: &Embed) -> Result<()> {
        self.record(channel_id, Sent::Embed(channel_id, embed.clone()))
    }

    async fn send_text(&self, channel_id: u64, text: &str) -> Result<()> {
        self.record(channel_id, Sent::Text(channel_id, text.to_string()))
    }

    async fn send_direct(&self, user_id: u64, embed: &Embed) -> Result<()> {
        self.record(user_id, Sent::Direct(user_id, embed.clone()))
    }

    async fn is_guild_admin(&self, guild_id: u64, user_id: u64) -> Result<bool> {
        Ok(self.admins.contains(&(guild_id, user_id)))
    }

    async fn application_owner(&self) -> Result<u64> {
        self.owner_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.owner)
    }

    async fn guild_name(&self, guild_id: u64) -> Result<String> {
        self.guild_names
            .get(&guild_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown guild {}", guild_id))
    }
}

pub async fn temp_store() -> (TempDir, ConfigStore) {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(dir.path().join("servers.json")).await.unwrap();
    (dir, store)
}

pub fn guild_message(author_id: u64, name: &str, guild_id: u64, channel_id: u64, content: &str) -> InboundMessage {
    InboundMessage {
        author_id,
        author_tag: format!("{}#0001", name.to_lowercase()),
        author_display_name: name.to_string(),
        author_is_bot: false,
        guild_id: Some(guild_id),
        channel_id,
        content: content.to_string(),
    }
}

pub fn direct_message(author_id: u64, name: &str, channel_id: u64, content: &str) -> InboundMessage {
    InboundMessage {
        guild_id: None,
        ..guild_message(author_id, name, 0, channel_id, content)
    }
}
