//! Admin commands: set, unset, change title, change message, help

use anyhow::Result;
use log::{debug, info};

use super::{parse_command, AdminCommand};
use crate::embeds;
use crate::platform::{InboundMessage, Platform};
use crate::store::ConfigStore;
use crate::template::TemplateVars;

#[derive(Clone)]
pub struct CommandDispatcher {
    store: ConfigStore,
    prefix: char,
}

impl CommandDispatcher {
    pub fn new(store: ConfigStore, prefix: char) -> Self {
        CommandDispatcher { store, prefix }
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Run the command in `msg`, if the author is allowed to.
    pub async fn dispatch(
        &self,
        platform: &dyn Platform,
        msg: &InboundMessage,
        guild_id: u64,
    ) -> Result<()> {
        info!("Got a command from {} in guild {}", msg.author_id, guild_id);

        if !self.is_authorized(platform, guild_id, msg.author_id).await? {
            info!("Ignoring command from unauthorized user {}", msg.author_id);
            return Ok(());
        }

        let command = match parse_command(&msg.content, self.prefix) {
            Some(command) => command,
            None => {
                debug!("Unrecognized command: {}", msg.content);
                return Ok(());
            }
        };

        match &command {
            AdminCommand::SetChannel => self.set_channel(platform, msg, guild_id).await,
            AdminCommand::UnsetChannel => self.unset_channel(platform, msg, guild_id).await,
            AdminCommand::ChangeTitle(text) | AdminCommand::ChangeMessage(text) if text.is_empty() => {
                platform
                    .send_embed(msg.channel_id, &embeds::missing_text(self.prefix, command.phrase()))
                    .await
            }
            AdminCommand::ChangeTitle(text) if text.chars().count() > embeds::TITLE_LIMIT => {
                platform
                    .send_embed(msg.channel_id, &embeds::too_long(command.phrase(), embeds::TITLE_LIMIT))
                    .await
            }
            AdminCommand::ChangeMessage(text) if text.chars().count() > embeds::DESCRIPTION_LIMIT => {
                platform
                    .send_embed(
                        msg.channel_id,
                        &embeds::too_long(command.phrase(), embeds::DESCRIPTION_LIMIT),
                    )
                    .await
            }
            AdminCommand::ChangeTitle(text) => {
                self.store.set_title(guild_id, text).await?;
                info!("Changed title for guild {}", guild_id);
                platform.send_embed(msg.channel_id, &embeds::title_changed()).await?;
                self.send_preview(platform, msg, guild_id).await
            }
            AdminCommand::ChangeMessage(text) => {
                self.store.set_message(guild_id, text).await?;
                info!("Changed message for guild {}", guild_id);
                platform.send_embed(msg.channel_id, &embeds::message_changed()).await?;
                self.send_preview(platform, msg, guild_id).await
            }
            AdminCommand::Help => {
                platform
                    .send_embed(msg.channel_id, &embeds::help(self.prefix))
                    .await
            }
        }
    }

    // Checked on every call so a demoted admin loses access immediately.
    async fn is_authorized(&self, platform: &dyn Platform, guild_id: u64, user_id: u64) -> Result<bool> {
        if platform.is_guild_admin(guild_id, user_id).await? {
            return Ok(true);
        }
        Ok(platform.application_owner().await? == user_id)
    }

    async fn set_channel(&self, platform: &dyn Platform, msg: &InboundMessage, guild_id: u64) -> Result<()> {
        self.store.set_channel(guild_id, msg.channel_id).await?;
        info!("Set forwarding channel {} in guild {}", msg.channel_id, guild_id);
        platform.send_embed(msg.channel_id, &embeds::channel_set()).await
    }

    async fn unset_channel(&self, platform: &dyn Platform, msg: &InboundMessage, guild_id: u64) -> Result<()> {
        let previous = self.store.clear_channel(guild_id).await?;
        info!("Unset forwarding channel {:?} in guild {}", previous, guild_id);
        platform.send_embed(msg.channel_id, &embeds::channel_unset()).await
    }

    /// Show the author what a new member of this guild would now receive
    async fn send_preview(&self, platform: &dyn Platform, msg: &InboundMessage, guild_id: u64) -> Result<()> {
        platform.send_text(msg.channel_id, "Sending a test message").await?;

        let guild_name = platform.guild_name(guild_id).await?;
        let vars = TemplateVars::new(&msg.author_display_name, &guild_name);
        let welcome = self.store.welcome(guild_id, &vars).await;
        platform.send_embed(msg.channel_id, &embeds::welcome(welcome)).await
    }
}
