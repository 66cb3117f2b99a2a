//! Embeds sent by the bot, independent of the Discord client types.

use crate::store::WelcomeText;

pub mod colors {
    pub const DARK_GREEN: u32 = 0x1f8b4c;
    pub const RED: u32 = 0xe74c3c;
    pub const BLURPLE: u32 = 0x5865f2;
}

/// Discord rejects embeds over these lengths, counted in characters
pub const TITLE_LIMIT: usize = 256;
pub const DESCRIPTION_LIMIT: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: Option<u32>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Embed {
            title: title.into(),
            description: description.into(),
            color: None,
        }
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }
}

/// Placeholders can push a stored template past the limits, so the rendered
/// text is cut to fit.
pub fn welcome(text: WelcomeText) -> Embed {
    Embed::new(
        truncate(&text.title, TITLE_LIMIT),
        truncate(&text.message, DESCRIPTION_LIMIT),
    )
    .color(colors::DARK_GREEN)
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// The relayed copy of a member's direct message, posted in the staff channel
pub fn relayed(author_tag: &str, content: &str) -> Embed {
    let content = if content.trim().is_empty() {
        "*(no text)*"
    } else {
        content
    };
    Embed::new(format!("Message from {}", author_tag), content)
}

pub fn forwarded() -> Embed {
    Embed::new(
        "Forwarded Message",
        "Your message has been forwarded along GLHF",
    )
    .color(colors::DARK_GREEN)
}

pub fn lost_context() -> Embed {
    Embed::new(
        "Oops",
        "I'm so sorry I lost track of what server you were in, please DM the mods of the server",
    )
    .color(colors::RED)
}

pub fn no_channel() -> Embed {
    Embed::new(
        "Oops",
        "Ok so, I kinda lied. The server admins haven't set a channel to forward to yet so they can't read this I'm so sorry.\nDM them to get in",
    )
    .color(colors::RED)
}

pub fn delivery_failed() -> Embed {
    Embed::new(
        "Oops",
        "I couldn't post your message in the server's staff channel. Please DM the mods of the server directly.",
    )
    .color(colors::RED)
}

pub fn channel_set() -> Embed {
    Embed::new(
        "Set forwarding channel",
        "DMs sent to the bot will forward here",
    )
}

pub fn channel_unset() -> Embed {
    Embed::new(
        "Unset forwarding channel",
        "DMs will no longer be forwarded",
    )
}

pub fn title_changed() -> Embed {
    Embed::new("Changed welcome title", "New members will get the title below")
}

pub fn message_changed() -> Embed {
    Embed::new("Changed welcome message", "New members will get the message below")
}

pub fn too_long(phrase: &str, limit: usize) -> Embed {
    Embed::new(
        "Too long",
        format!("The text for `{}` can be at most {} characters", phrase, limit),
    )
    .color(colors::RED)
}

pub fn missing_text(prefix: char, phrase: &str) -> Embed {
    Embed::new(
        "Nothing to change",
        format!("Usage: `{}{} <text>`", prefix, phrase),
    )
    .color(colors::RED)
}

pub fn help(prefix: char) -> Embed {
    Embed::new(
        "Porter help",
        format!(
            "New members get a welcome DM. Whatever they reply is posted in the forwarding channel.\n\n\
            `{p}set` - Forward DMs to this channel\n\
            `{p}unset` - Stop forwarding DMs\n\
            `{p}change title <text>` - Change the welcome DM title\n\
            `{p}change message <text>` - Change the welcome DM body\n\
            `{p}help` - Show this message\n\n\
            Templates can use `{{member_name}}` and `{{guild_name}}`.\n\
            Only server administrators and the bot owner can use these commands.",
            p = prefix
        ),
    )
    .color(colors::BLURPLE)
}
