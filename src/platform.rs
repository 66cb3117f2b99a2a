//! The outbound surface of the chat platform and the inbound event shapes the
//! router works with. `discord` implements this over serenity.

use anyhow::Result;
use serenity::async_trait;

use crate::embeds::Embed;

/// A message as seen by the router
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub author_id: u64,
    /// `name#discriminator`
    pub author_tag: String,
    pub author_display_name: String,
    pub author_is_bot: bool,
    /// `None` for direct messages
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct JoiningMember {
    pub user_id: u64,
    pub display_name: String,
    pub guild_id: u64,
}

#[async_trait]
pub trait Platform: Send + Sync {
    async fn send_embed(&self, channel_id: u64, embed: &Embed) -> Result<()>;

    async fn send_text(&self, channel_id: u64, text: &str) -> Result<()>;

    async fn send_direct(&self, user_id: u64, embed: &Embed) -> Result<()>;

    async fn is_guild_admin(&self, guild_id: u64, user_id: u64) -> Result<bool>;

    async fn application_owner(&self) -> Result<u64>;

    async fn guild_name(&self, guild_id: u64) -> Result<String>;
}
