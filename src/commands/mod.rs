//! # Command System
//!
//! Prefixed text commands administrators send in a guild channel.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Ordered command table with word-boundary matching
//! - 1.0.0: Initial prefix commands: set, unset, change title, change message, help

pub mod admin;

pub use admin::CommandDispatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    SetChannel,
    UnsetChannel,
    ChangeTitle,
    ChangeMessage,
    Help,
}

/// Known command phrases, longest first so no phrase is shadowed by a shorter one
pub const COMMAND_TABLE: &[(&str, CommandKind)] = &[
    ("change message", CommandKind::ChangeMessage),
    ("change title", CommandKind::ChangeTitle),
    ("unset", CommandKind::UnsetChannel),
    ("help", CommandKind::Help),
    ("set", CommandKind::SetChannel),
];

/// A parsed admin command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    SetChannel,
    UnsetChannel,
    ChangeTitle(String),
    ChangeMessage(String),
    Help,
}

impl AdminCommand {
    pub fn phrase(&self) -> &'static str {
        match self {
            AdminCommand::SetChannel => "set",
            AdminCommand::UnsetChannel => "unset",
            AdminCommand::ChangeTitle(_) => "change title",
            AdminCommand::ChangeMessage(_) => "change message",
            AdminCommand::Help => "help",
        }
    }
}

/// Parse a command from raw message content
///
/// # Arguments
/// * `content` - The full message text, prefix included
/// * `prefix` - The command prefix character
///
/// # Returns
/// `None` if the content does not start with the prefix or names no known command
///
/// # Example
/// ```
/// use porter::commands::{parse_command, AdminCommand};
///
/// let cmd = parse_command("!change title Hey {member_name}!", '!');
/// assert_eq!(cmd, Some(AdminCommand::ChangeTitle("Hey {member_name}!".to_string())));
/// ```
pub fn parse_command(content: &str, prefix: char) -> Option<AdminCommand> {
    let body = content.strip_prefix(prefix)?;

    COMMAND_TABLE.iter().find_map(|(phrase, kind)| {
        let rest = match_phrase(body, phrase)?;
        Some(match kind {
            CommandKind::SetChannel => AdminCommand::SetChannel,
            CommandKind::UnsetChannel => AdminCommand::UnsetChannel,
            CommandKind::ChangeTitle => AdminCommand::ChangeTitle(rest.to_string()),
            CommandKind::ChangeMessage => AdminCommand::ChangeMessage(rest.to_string()),
            CommandKind::Help => AdminCommand::Help,
        })
    })
}

/// Match each word of `phrase` against whole words at the start of `body`,
/// returning the remaining text with leading whitespace removed.
fn match_phrase<'a>(body: &'a str, phrase: &str) -> Option<&'a str> {
    let mut rest = body;

    for word in phrase.split_whitespace() {
        rest = rest.trim_start();
        let head = rest.get(..word.len())?;
        if !head.eq_ignore_ascii_case(word) {
            return None;
        }
        rest = &rest[word.len()..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }
    }

    Some(rest.trim_start())
}
