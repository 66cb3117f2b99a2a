use anyhow::Result;
use serenity::async_trait;
use serenity::builder::CreateEmbed;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::guild::Member;
use serenity::model::id::{ChannelId, GuildId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use std::sync::Arc;

use crate::embeds::Embed;
use crate::platform::{InboundMessage, JoiningMember, Platform};

/// [`Platform`] over serenity's REST client
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        DiscordPlatform { http }
    }
}

fn build_embed<'a>(e: &'a mut CreateEmbed, embed: &Embed) -> &'a mut CreateEmbed {
    e.title(&embed.title).description(&embed.description);
    if let Some(color) = embed.color {
        e.colour(color);
    }
    e
}

#[async_trait]
impl Platform for DiscordPlatform {
    async fn send_embed(&self, channel_id: u64, embed: &Embed) -> Result<()> {
        ChannelId(channel_id)
            .send_message(&*self.http, |m| m.embed(|e| build_embed(e, embed)))
            .await?;
        Ok(())
    }

    async fn send_text(&self, channel_id: u64, text: &str) -> Result<()> {
        ChannelId(channel_id).say(&*self.http, text).await?;
        Ok(())
    }

    async fn send_direct(&self, user_id: u64, embed: &Embed) -> Result<()> {
        let channel = UserId(user_id).create_dm_channel(&*self.http).await?;
        channel
            .id
            .send_message(&*self.http, |m| m.embed(|e| build_embed(e, embed)))
            .await?;
        Ok(())
    }

    async fn is_guild_admin(&self, guild_id: u64, user_id: u64) -> Result<bool> {
        let guild = GuildId(guild_id).to_partial_guild(&*self.http).await?;
        if guild.owner_id == UserId(user_id) {
            return Ok(true);
        }

        let member = guild.id.member(&*self.http, UserId(user_id)).await?;
        // @everyone shares the guild's id
        let everyone = guild.roles.get(&RoleId(guild.id.0));
        let is_admin = everyone
            .into_iter()
            .chain(member.roles.iter().filter_map(|role_id| guild.roles.get(role_id)))
            .any(|role| role.permissions.contains(Permissions::ADMINISTRATOR));

        Ok(is_admin)
    }

    async fn application_owner(&self) -> Result<u64> {
        let info = self.http.get_current_application_info().await?;
        Ok(info.owner.id.0)
    }

    async fn guild_name(&self, guild_id: u64) -> Result<String> {
        Ok(GuildId(guild_id).to_partial_guild(&*self.http).await?.name)
    }
}

pub fn inbound_message(msg: &Message) -> InboundMessage {
    let display_name = msg
        .member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .unwrap_or_else(|| msg.author.name.clone());

    InboundMessage {
        author_id: msg.author.id.0,
        author_tag: msg.author.tag(),
        author_display_name: display_name,
        author_is_bot: msg.author.bot,
        guild_id: msg.guild_id.map(|id| id.0),
        channel_id: msg.channel_id.0,
        content: msg.content.clone(),
    }
}

pub fn joining_member(member: &Member) -> JoiningMember {
    JoiningMember {
        user_id: member.user.id.0,
        display_name: member.display_name().into_owned(),
        guild_id: member.guild_id.0,
    }
}
