pub mod commands;
pub mod config;
pub mod discord;
pub mod embeds;
pub mod pending;
pub mod platform;
pub mod router;
pub mod store;
pub mod template;

#[cfg(test)]
mod test_support;
