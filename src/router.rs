//! Routes inbound events: direct messages are relayed to the guild the author
//! joined, prefixed guild messages go to the command dispatcher, and member
//! joins trigger the welcome DM.

use anyhow::Result;
use log::{info, warn};

use crate::commands::CommandDispatcher;
use crate::embeds;
use crate::pending::PendingForwards;
use crate::platform::{InboundMessage, JoiningMember, Platform};
use crate::store::ConfigStore;
use crate::template::TemplateVars;

/// Stands in for `{guild_name}` when the guild can't be fetched
pub const UNKNOWN_GUILD_NAME: &str = "the server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ignore,
    Direct,
    Command { guild_id: u64 },
}

/// Decide what to do with a message; the first matching rule wins
pub fn classify(msg: &InboundMessage, prefix: char) -> Route {
    if msg.author_is_bot {
        return Route::Ignore;
    }

    match msg.guild_id {
        None => Route::Direct,
        Some(guild_id) if msg.content.starts_with(prefix) => Route::Command { guild_id },
        Some(_) => Route::Ignore,
    }
}

#[derive(Clone)]
pub struct MessageRouter {
    store: ConfigStore,
    pending: PendingForwards,
    commands: CommandDispatcher,
}

impl MessageRouter {
    pub fn new(store: ConfigStore, pending: PendingForwards, prefix: char) -> Self {
        MessageRouter {
            commands: CommandDispatcher::new(store.clone(), prefix),
            store,
            pending,
        }
    }

    pub fn prefix(&self) -> char {
        self.commands.prefix()
    }

    pub async fn handle_message(&self, platform: &dyn Platform, msg: &InboundMessage) -> Result<()> {
        match classify(msg, self.prefix()) {
            Route::Ignore => Ok(()),
            Route::Direct => self.forward_direct_message(platform, msg).await,
            Route::Command { guild_id } => self.commands.dispatch(platform, msg, guild_id).await,
        }
    }

    /// Remember where the member joined and send them the welcome DM
    pub async fn handle_member_join(&self, platform: &dyn Platform, member: &JoiningMember) -> Result<()> {
        info!("New member {} joined guild {}, sending DM", member.user_id, member.guild_id);
        self.pending.record_join(member.user_id, member.guild_id);

        let guild_name = match platform.guild_name(member.guild_id).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Could not look up guild {}: {}", member.guild_id, e);
                UNKNOWN_GUILD_NAME.to_string()
            }
        };
        let vars = TemplateVars::new(&member.display_name, &guild_name);
        let welcome = self.store.welcome(member.guild_id, &vars).await;

        if let Err(e) = platform.send_direct(member.user_id, &embeds::welcome(welcome)).await {
            warn!("Could not DM new member {}: {}", member.user_id, e);
        }
        Ok(())
    }

    async fn forward_direct_message(&self, platform: &dyn Platform, msg: &InboundMessage) -> Result<()> {
        info!("Handling a DM from {}", msg.author_id);

        // The entry is consumed even if the guild has no channel yet
        let guild_id = match self.pending.consume(msg.author_id) {
            Some(guild_id) => guild_id,
            None => {
                info!("Rejected DM from {}, missing guild info", msg.author_id);
                return platform.send_embed(msg.channel_id, &embeds::lost_context()).await;
            }
        };

        let channel_id = match self.store.get(guild_id).await.channel {
            Some(channel_id) => channel_id,
            None => {
                info!("Rejected DM from {}, guild {} has no channel", msg.author_id, guild_id);
                return platform.send_embed(msg.channel_id, &embeds::no_channel()).await;
            }
        };

        let relayed = embeds::relayed(&msg.author_tag, &msg.content);
        if let Err(e) = platform.send_embed(channel_id, &relayed).await {
            warn!(
                "Failed to relay DM from {} to channel {} in guild {}: {}",
                msg.author_id, channel_id, guild_id, e
            );
            return platform.send_embed(msg.channel_id, &embeds::delivery_failed()).await;
        }

        info!("Forwarded DM from {} to channel {}", msg.author_id, channel_id);
        platform.send_embed(msg.channel_id, &embeds::forwarded()).await
    }
}
