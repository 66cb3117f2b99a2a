use anyhow::Result;
use log::{error, info};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::{Activity, Ready};
use serenity::model::guild::Member;
use serenity::prelude::*;
use std::sync::Arc;

use porter::config::Config;
use porter::discord::{self, DiscordPlatform};
use porter::pending::PendingForwards;
use porter::router::MessageRouter;
use porter::store::ConfigStore;

const VERSION: &str = env!("CARGO_PKG_VERSION");

struct Handler {
    router: Arc<MessageRouter>,
}

impl Handler {
    fn new(router: MessageRouter) -> Self {
        Handler {
            router: Arc::new(router),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        let platform = DiscordPlatform::new(ctx.http.clone());
        let inbound = discord::inbound_message(&msg);

        if let Err(e) = self.router.handle_message(&platform, &inbound).await {
            error!("Error handling message {} from {}: {:#}", msg.id, msg.author.id, e);
        }
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        let platform = DiscordPlatform::new(ctx.http.clone());
        let member = discord::joining_member(&new_member);

        if let Err(e) = self.router.handle_member_join(&platform, &member).await {
            error!("Error welcoming member {}: {:#}", member.user_id, e);
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 Logged in as {} with id {}", ready.user.name, ready.user.id);
        info!("📡 Connected to {} guilds", ready.guilds.len());

        let status = format!("Admins use {}help to get help!", self.router.prefix());
        ctx.set_activity(Activity::watching(status)).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Porter v{}...", VERSION);

    let store = ConfigStore::load(&config.servers_path).await?;
    let router = MessageRouter::new(store, PendingForwards::new(), config.command_prefix);
    let handler = Handler::new(router);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {}", e);
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Connecting to Discord gateway with intents {:?}", intents);

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {:?}", why);
        return Err(anyhow::anyhow!("Failed to establish gateway connection: {}", why));
    }

    Ok(())
}
